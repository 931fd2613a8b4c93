//! # t5chat-tokenizer
//!
//! Tokenization for the t5chat gateway.
//!
//! This crate provides:
//! - A `Tokenizer` trait so the gateway can swap vocabularies without code changes
//! - T5-style special tokens (`<pad>`, `</s>`, `<unk>`) recognised inside raw text
//! - [`VocabTokenizer`]: a fixed-vocabulary tokenizer, built in or loaded from a
//!   HuggingFace `tokenizer.json`

mod builtin;
mod vocab;

pub use vocab::{VocabTokenizer, WORD_MARKER};

/// Token ID type (i32 to match the engine; logically non-negative).
pub type TokenId = i32;

/// Padding token text. T5 also uses it as the decoder start token.
pub const PAD_TOKEN: &str = "<pad>";
/// End-of-sequence token text.
pub const EOS_TOKEN: &str = "</s>";
/// Unknown-word token text.
pub const UNK_TOKEN: &str = "<unk>";

/// Error type for tokenization operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenizerError {
    #[error("Invalid token ID: {0}")]
    InvalidToken(TokenId),
    #[error("Encoding error: {0}")]
    EncodingError(String),
    #[error("Decoding error: {0}")]
    DecodingError(String),
    #[error("Failed to load vocabulary: {0}")]
    Load(String),
}

pub type TokenizerResult<T> = std::result::Result<T, TokenizerError>;

/// The special tokens a vocabulary must carry, with their IDs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialTokens {
    pub pad_token_id: TokenId,
    pub eos_token_id: TokenId,
    pub unk_token_id: TokenId,
}

impl SpecialTokens {
    /// Whether `id` is one of the special tokens.
    pub fn is_special(&self, id: TokenId) -> bool {
        id == self.pad_token_id || id == self.eos_token_id || id == self.unk_token_id
    }

    /// Literal text of each special token paired with its ID.
    pub fn literals(&self) -> [(&'static str, TokenId); 3] {
        [
            (PAD_TOKEN, self.pad_token_id),
            (EOS_TOKEN, self.eos_token_id),
            (UNK_TOKEN, self.unk_token_id),
        ]
    }
}

/// Core tokenizer trait. Implementations can be swapped without changing app code.
pub trait Tokenizer: Send + Sync {
    /// Encode text into a sequence of token IDs.
    ///
    /// Special-token literals appearing in `text` (e.g. a trailing `</s>`)
    /// map to their special IDs rather than being split as words.
    fn encode(&self, text: &str) -> TokenizerResult<Vec<TokenId>>;

    /// Decode a sequence of tokens into text, optionally dropping special tokens.
    fn decode(&self, tokens: &[TokenId], skip_special_tokens: bool) -> TokenizerResult<String>;

    /// Special token IDs of this vocabulary.
    fn special_tokens(&self) -> &SpecialTokens;

    /// Get vocabulary size.
    fn vocab_size(&self) -> usize;

    /// End-of-sequence marker text, appended to prompts before encoding.
    fn eos_token(&self) -> &str {
        EOS_TOKEN
    }

    fn eos_token_id(&self) -> TokenId {
        self.special_tokens().eos_token_id
    }

    fn pad_token_id(&self) -> TokenId {
        self.special_tokens().pad_token_id
    }
}
