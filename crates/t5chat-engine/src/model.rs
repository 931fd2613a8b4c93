//! Encoder-decoder model interface.

use crate::{Result, TokenId};

/// Encoder hidden state for one input sequence.
#[derive(Debug, Clone)]
pub struct EncoderOutput {
    /// Pooled hidden state, `d_model` wide.
    pub hidden: Vec<f32>,
    /// Number of input tokens that produced it.
    pub seq_len: usize,
}

/// A sequence-to-sequence language model.
///
/// Implementations wrap a real backend or the demo [`TinySeq2Seq`](crate::TinySeq2Seq).
/// The generation loop only ever sees these three calls.
pub trait Seq2SeqModel: Send + Sync {
    /// Width of the logits returned by [`Seq2SeqModel::decode_step`].
    fn vocab_size(&self) -> usize;

    /// Run the encoder over the input token IDs.
    fn encode(&self, input_ids: &[TokenId]) -> Result<EncoderOutput>;

    /// Next-token logits given the encoder output and the decoder tokens so far.
    fn decode_step(&self, encoder: &EncoderOutput, decoder_ids: &[TokenId]) -> Result<Vec<f32>>;
}
