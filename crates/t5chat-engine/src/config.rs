//! Decoding parameters for chat replies.

use t5chat_sampling::Sampler;
use t5chat_tokenizer::{TokenId, Tokenizer};

/// Temperature used for greedy decoding when sampling is off.
const GREEDY_TEMPERATURE: f32 = 1e-4;

/// Fixed decoding options for a chat reply.
///
/// The defaults are the chat bot's parameter set: up to 1000 tokens, sampling with
/// top-k 50 and nucleus 0.95, no repeated trigrams. Token IDs come from the
/// tokenizer via [`GenerationConfig::for_tokenizer`].
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    /// Maximum decoder sequence length, start token included.
    pub max_length: usize,

    /// Sample from the filtered distribution; greedy argmax when false.
    pub do_sample: bool,

    pub top_k: usize,

    pub top_p: f32,

    pub temperature: f32,

    /// Never generate the same n-gram twice. 0 disables.
    pub no_repeat_ngram_size: usize,

    /// Padding ID. The chat bot pads with EOS.
    pub pad_token_id: TokenId,

    /// Generation stops after this token.
    pub eos_token_id: TokenId,

    /// First decoder token. The chat bot starts from the tokenizer's pad token.
    pub decoder_start_token_id: TokenId,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_length: 1000,
            do_sample: true,
            top_k: 50,
            top_p: 0.95,
            temperature: 1.0,
            no_repeat_ngram_size: 3,
            pad_token_id: 1,
            eos_token_id: 1,
            decoder_start_token_id: 0,
        }
    }
}

impl GenerationConfig {
    /// The chat parameter set with token IDs taken from `tokenizer`.
    pub fn for_tokenizer(tokenizer: &dyn Tokenizer) -> Self {
        Self {
            pad_token_id: tokenizer.eos_token_id(),
            eos_token_id: tokenizer.eos_token_id(),
            decoder_start_token_id: tokenizer.pad_token_id(),
            ..Self::default()
        }
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_sampling(mut self, do_sample: bool) -> Self {
        self.do_sample = do_sample;
        self
    }

    /// Build the sampler implementing this configuration.
    pub fn sampler(&self, seed: u64) -> Sampler {
        let sampler = if self.do_sample {
            Sampler::new()
                .with_temperature(self.temperature)
                .with_top_k(self.top_k)
                .with_top_p(self.top_p)
        } else {
            Sampler::new().with_temperature(GREEDY_TEMPERATURE)
        };

        let sampler = if self.no_repeat_ngram_size > 0 {
            sampler.with_no_repeat_ngram_size(self.no_repeat_ngram_size)
        } else {
            sampler
        };

        sampler.with_seed(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use t5chat_tokenizer::VocabTokenizer;

    #[test]
    fn defaults_match_chat_parameters() {
        let config = GenerationConfig::default();
        assert_eq!(config.max_length, 1000);
        assert!(config.do_sample);
        assert_eq!(config.top_k, 50);
        assert!((config.top_p - 0.95).abs() < f32::EPSILON);
        assert_eq!(config.no_repeat_ngram_size, 3);
    }

    #[test]
    fn token_ids_follow_tokenizer() {
        let tokenizer = VocabTokenizer::builtin();
        let config = GenerationConfig::for_tokenizer(&tokenizer);
        assert_eq!(config.pad_token_id, tokenizer.eos_token_id());
        assert_eq!(config.eos_token_id, tokenizer.eos_token_id());
        assert_eq!(config.decoder_start_token_id, tokenizer.pad_token_id());
    }

    #[test]
    fn sampler_carries_filters() {
        let sampler = GenerationConfig::default().sampler(1);
        assert_eq!(sampler.top_k, Some(50));
        assert_eq!(sampler.top_p, Some(0.95));
        assert_eq!(sampler.no_repeat_ngram_size, Some(3));
    }

    #[test]
    fn greedy_sampler_has_no_filters() {
        let sampler = GenerationConfig::default().with_sampling(false).sampler(1);
        assert_eq!(sampler.top_k, None);
        assert!(sampler.temperature < 1e-3);
        assert_eq!(sampler.no_repeat_ngram_size, Some(3));
    }
}
