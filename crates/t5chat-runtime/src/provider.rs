//! Loading named models, once per process.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use t5chat_engine::{EngineError, Seq2SeqModel, TinySeq2Seq, TinySeq2SeqConfig};
use t5chat_tokenizer::{Tokenizer, VocabTokenizer};

/// A tokenizer paired with the model it feeds.
pub struct LoadedModel {
    pub name: String,
    pub tokenizer: Arc<dyn Tokenizer>,
    pub model: Arc<dyn Seq2SeqModel>,
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("name", &self.name)
            .field("vocab_size", &self.tokenizer.vocab_size())
            .finish()
    }
}

/// Source of pretrained tokenizer/model pairs, looked up by name.
pub trait ModelProvider: Send + Sync {
    fn load(&self, name: &str) -> Result<LoadedModel, EngineError>;
}

/// Provider backed by the tiny demo model.
///
/// With a model directory configured, the vocabulary is read from
/// `<model_dir>/<name>/tokenizer.json`; otherwise the built-in vocabulary is used.
/// The model is sized to whichever vocabulary was loaded.
#[derive(Debug, Clone, Default)]
pub struct PretrainedProvider {
    model_dir: Option<PathBuf>,
}

impl PretrainedProvider {
    /// Provider using the built-in vocabulary for every name.
    pub fn builtin() -> Self {
        Self { model_dir: None }
    }

    /// Provider reading vocabularies from `model_dir`.
    pub fn from_dir(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: Some(model_dir.into()),
        }
    }

    fn load_tokenizer(&self, name: &str) -> Result<VocabTokenizer, EngineError> {
        match &self.model_dir {
            Some(dir) => {
                let path = dir.join(name).join("tokenizer.json");
                VocabTokenizer::from_file(&path).map_err(|e| EngineError::ModelLoad(e.to_string()))
            }
            None => Ok(VocabTokenizer::builtin()),
        }
    }
}

impl ModelProvider for PretrainedProvider {
    fn load(&self, name: &str) -> Result<LoadedModel, EngineError> {
        if name.trim().is_empty() {
            return Err(EngineError::ModelLoad("model name is empty".to_string()));
        }

        let tokenizer = self.load_tokenizer(name)?;
        let config =
            TinySeq2SeqConfig::new(tokenizer.vocab_size(), tokenizer.special_tokens().clone());
        let model = TinySeq2Seq::new(config)?;

        Ok(LoadedModel {
            name: name.to_string(),
            tokenizer: Arc::new(tokenizer),
            model: Arc::new(model),
        })
    }
}

/// Outcome of the process-wide model load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    Ready,
    Failed(String),
}

/// Loads the configured model on first use and keeps the outcome for the
/// lifetime of the process.
///
/// A failed load is cached like a successful one: there is no reload path, so
/// every later request sees the same failure.
pub struct ModelCache {
    model_name: String,
    provider: Arc<dyn ModelProvider>,
    slot: OnceLock<Result<Arc<LoadedModel>, String>>,
}

impl ModelCache {
    pub fn new(model_name: impl Into<String>, provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            model_name: model_name.into(),
            provider,
            slot: OnceLock::new(),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// The loaded model, loading it if this is the first call.
    ///
    /// A panicking provider counts as a failed load.
    pub fn get(&self) -> Result<Arc<LoadedModel>, EngineError> {
        self.slot
            .get_or_init(|| {
                tracing::info!(model = %self.model_name, "loading model");
                let outcome =
                    panic::catch_unwind(AssertUnwindSafe(|| self.provider.load(&self.model_name)))
                        .unwrap_or_else(|_| {
                            Err(EngineError::ModelLoad("model loader panicked".to_string()))
                        });
                match outcome {
                    Ok(loaded) => {
                        tracing::info!(
                            model = %self.model_name,
                            vocab_size = loaded.tokenizer.vocab_size(),
                            "model loaded"
                        );
                        Ok(Arc::new(loaded))
                    }
                    Err(e) => {
                        tracing::error!(model = %self.model_name, error = %e, "model load failed");
                        Err(e.to_string())
                    }
                }
            })
            .clone()
            .map_err(EngineError::ModelLoad)
    }

    /// Load state without triggering a load.
    pub fn state(&self) -> LoadState {
        match self.slot.get() {
            None => LoadState::NotLoaded,
            Some(Ok(_)) => LoadState::Ready,
            Some(Err(msg)) => LoadState::Failed(msg.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    struct PanickingProvider {
        calls: AtomicUsize,
    }

    impl ModelProvider for PanickingProvider {
        fn load(&self, _name: &str) -> Result<LoadedModel, EngineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            panic!("weights corrupted");
        }
    }

    impl ModelProvider for CountingProvider {
        fn load(&self, name: &str) -> Result<LoadedModel, EngineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(EngineError::ModelLoad(format!("no such model {name}")));
            }
            PretrainedProvider::builtin().load(name)
        }
    }

    #[test]
    fn builtin_provider_loads_any_name() {
        let loaded = PretrainedProvider::builtin().load("t5-large").unwrap();
        assert_eq!(loaded.name, "t5-large");
        assert_eq!(loaded.model.vocab_size(), loaded.tokenizer.vocab_size());
    }

    #[test]
    fn empty_name_fails() {
        let err = PretrainedProvider::builtin().load("  ").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn cache_loads_once() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let cache = ModelCache::new("t5-large", provider.clone());
        assert_eq!(cache.state(), LoadState::NotLoaded);

        let a = cache.get().unwrap();
        let b = cache.get().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.state(), LoadState::Ready);
    }

    #[test]
    fn cache_keeps_failure() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let cache = ModelCache::new("t5-large", provider.clone());

        for _ in 0..3 {
            let err = cache.get().unwrap_err();
            assert!(err.to_string().contains("no such model t5-large"));
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert!(matches!(cache.state(), LoadState::Failed(_)));
    }

    #[test]
    fn cache_keeps_panicked_load_as_failure() {
        let provider = Arc::new(PanickingProvider {
            calls: AtomicUsize::new(0),
        });
        let cache = ModelCache::new("t5-large", provider.clone());

        for _ in 0..3 {
            let err = cache.get().unwrap_err();
            assert!(err.to_string().contains("model loader panicked"));
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        match cache.state() {
            LoadState::Failed(msg) => assert!(msg.contains("model loader panicked")),
            other => panic!("expected failed load, got {other:?}"),
        }
    }
}
