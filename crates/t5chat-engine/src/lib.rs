//! # t5chat-engine
//!
//! The narrow waist between the chat gateway and whatever model sits behind it.
//!
//! - [`Seq2SeqModel`]: an encoder-decoder model seen as two calls, encode once and
//!   ask for next-token logits per decoder step
//! - [`GenerationConfig`]: the fixed decoding parameters of a chat reply
//! - [`generate`]: the sampling loop tying a model, a config and a sampler together
//! - [`TinySeq2Seq`]: a small deterministic model with seeded weights, used when no
//!   real model backend is wired in
//!
//! ## Design Notes
//!
//! Models take `&self` so a single loaded model can serve every session at once.
//! Per-call state (encoder output, decoder prefix) is passed in explicitly.

mod config;
mod generate;
mod model;
mod tiny;

pub use config::GenerationConfig;
pub use generate::generate;
pub use model::{EncoderOutput, Seq2SeqModel};
pub use t5chat_tokenizer::TokenId;
pub use tiny::{TinySeq2Seq, TinySeq2SeqConfig};

use t5chat_sampling::SamplingError;
use t5chat_tokenizer::TokenizerError;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Top-level error type for all engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Model loading failed: {0}")]
    ModelLoad(String),
    #[error("Tokenization failed: {0}")]
    Tokenization(#[from] TokenizerError),
    #[error("Sampling failed: {0}")]
    Sampling(#[from] SamplingError),
    #[error("Inference failed: {0}")]
    Inference(String),
}
