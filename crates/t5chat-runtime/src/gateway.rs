//! The chat gateway: user text in, reply text out.
//!
//! A gateway is built fresh for every turn. It borrows the process-wide model
//! from [`ModelCache`], so constructing one is cheap, but nothing it holds
//! survives into the next turn.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use t5chat_engine::{generate, EngineError, GenerationConfig, TokenId};

use crate::device::Device;
use crate::provider::{LoadedModel, ModelCache};
use crate::telemetry::{GenerationTimer, TelemetryHook, TracingTelemetry};

/// Reply substituted whenever loading or generation fails.
pub const FALLBACK_REPLY: &str = "Sorry, I encountered an issue. Please try again later.";

/// Something that answers a user message and reports user-visible problems.
pub trait ResponseGenerator {
    /// Produce a reply. Never fails: problems become notices and a fallback reply.
    fn generate_response(&mut self, input: &str) -> String;

    /// Drain the notices raised so far.
    fn take_notices(&mut self) -> Vec<String>;
}

/// Wraps the loaded tokenizer and model behind [`ResponseGenerator`].
pub struct ChatGateway {
    model_name: String,
    loaded: Option<Arc<LoadedModel>>,
    device: Device,
    /// Initialised on first generation, never fed back into the model.
    chat_history_ids: Option<Vec<TokenId>>,
    telemetry: Arc<dyn TelemetryHook>,
    seed: Option<u64>,
    notices: Vec<String>,
}

impl ChatGateway {
    /// Build a gateway over the cached model, loading it on first use.
    ///
    /// A load failure does not fail construction: it is recorded as a notice
    /// and every call to `generate_response` falls back.
    pub fn new(models: &ModelCache, device: Device) -> Self {
        let mut notices = Vec::new();
        let loaded = match models.get() {
            Ok(loaded) => Some(loaded),
            Err(e) => {
                tracing::warn!(model = models.model_name(), error = %e, "gateway has no model");
                notices.push(format!("Failed to load model: {e}"));
                None
            }
        };

        Self {
            model_name: models.model_name().to_string(),
            loaded,
            device,
            chat_history_ids: None,
            telemetry: Arc::new(TracingTelemetry),
            seed: None,
            notices,
        }
    }

    pub fn with_telemetry(mut self, hook: Arc<dyn TelemetryHook>) -> Self {
        self.telemetry = hook;
        self
    }

    /// Fix the sampling seed. Unset, every reply draws a fresh random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    fn try_generate(&mut self, input: &str) -> Result<String, EngineError> {
        if self.chat_history_ids.is_none() {
            self.chat_history_ids = Some(Vec::new());
        }

        let loaded = self
            .loaded
            .clone()
            .ok_or_else(|| EngineError::ModelLoad(format!("{} is not loaded", self.model_name)))?;
        let tokenizer = loaded.tokenizer.as_ref();

        let prompt = format!("{input}{}", tokenizer.eos_token());
        let input_ids = tokenizer.encode(&prompt)?;

        let config = GenerationConfig::for_tokenizer(tokenizer);
        let mut sampler = config.sampler(self.seed.unwrap_or_else(rand::random));

        let timer = GenerationTimer::start(self.device, input_ids.len());
        let output = generate(loaded.model.as_ref(), &input_ids, &config, &mut sampler)?;
        timer.finish(output.len().saturating_sub(1), self.telemetry.as_ref());

        let text = tokenizer.decode(&output, true)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(EngineError::Inference("model produced an empty reply".to_string()));
        }
        Ok(text.to_string())
    }
}

impl ResponseGenerator for ChatGateway {
    fn generate_response(&mut self, input: &str) -> String {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.try_generate(input)));
        let error = match outcome {
            Ok(Ok(reply)) => return reply,
            Ok(Err(e)) => e.to_string(),
            Err(_) => "generation panicked".to_string(),
        };

        tracing::warn!(model = %self.model_name, error = %error, "generation failed");
        self.notices.push(format!("An error occurred: {error}"));
        FALLBACK_REPLY.to_string()
    }

    fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::PretrainedProvider;

    fn cache() -> ModelCache {
        ModelCache::new("t5-large", Arc::new(PretrainedProvider::builtin()))
    }

    #[test]
    fn reply_is_non_empty() {
        let models = cache();
        let mut gateway = ChatGateway::new(&models, Device::Cpu).with_seed(1);
        let reply = gateway.generate_response("Hello");
        assert!(!reply.is_empty());
        assert_ne!(reply, FALLBACK_REPLY);
        assert!(gateway.take_notices().is_empty());
    }

    #[test]
    fn reply_is_trimmed() {
        let models = cache();
        let mut gateway = ChatGateway::new(&models, Device::Cpu).with_seed(9);
        let reply = gateway.generate_response("  good morning  ");
        assert_eq!(reply, reply.trim());
    }

    #[test]
    fn empty_input_is_accepted() {
        let models = cache();
        let mut gateway = ChatGateway::new(&models, Device::Cpu).with_seed(3);
        let reply = gateway.generate_response("");
        assert!(!reply.is_empty());
        assert!(gateway.take_notices().is_empty());
    }

    #[test]
    fn history_field_initialised_but_unused() {
        let models = cache();
        let mut gateway = ChatGateway::new(&models, Device::Cpu).with_seed(4);
        assert!(gateway.chat_history_ids.is_none());
        gateway.generate_response("hi");
        gateway.generate_response("hi again");
        assert_eq!(gateway.chat_history_ids, Some(Vec::new()));
    }

    #[test]
    fn seeded_gateways_agree() {
        let models = cache();
        let a = ChatGateway::new(&models, Device::Cpu)
            .with_seed(11)
            .generate_response("tell me a story");
        let b = ChatGateway::new(&models, Device::Cpu)
            .with_seed(11)
            .generate_response("tell me a story");
        assert_eq!(a, b);
    }
}
