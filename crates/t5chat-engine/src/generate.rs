//! Encoder-decoder sampling loop.

use t5chat_sampling::Sampler;

use crate::{EngineError, GenerationConfig, Result, Seq2SeqModel, TokenId};

/// Generate a decoder sequence for `input_ids`.
///
/// The encoder runs once. Decoding starts from `config.decoder_start_token_id` and
/// appends one sampled token per step until EOS is produced or the sequence reaches
/// `config.max_length`. The returned sequence keeps the start token and the EOS;
/// detokenizing with special tokens skipped removes both.
pub fn generate(
    model: &dyn Seq2SeqModel,
    input_ids: &[TokenId],
    config: &GenerationConfig,
    sampler: &mut Sampler,
) -> Result<Vec<TokenId>> {
    if input_ids.is_empty() {
        return Err(EngineError::Inference("empty input".to_string()));
    }

    let encoder = model.encode(input_ids)?;
    let vocab_size = model.vocab_size();

    let start = config.decoder_start_token_id;
    let mut output = vec![start];
    let mut history = vec![usize::try_from(start).map_err(|_| {
        EngineError::Inference(format!("invalid decoder start token {start}"))
    })?];

    while output.len() < config.max_length {
        let logits = model.decode_step(&encoder, &output)?;
        if logits.len() != vocab_size {
            return Err(EngineError::Inference(format!(
                "model returned {} logits for a vocabulary of {vocab_size}",
                logits.len()
            )));
        }

        let next = sampler.sample_with_history(&logits, &history)?;
        let token = TokenId::try_from(next)
            .map_err(|_| EngineError::Inference(format!("token index {next} out of range")))?;

        output.push(token);
        history.push(next);

        if token == config.eos_token_id {
            break;
        }
    }

    tracing::trace!(
        input_tokens = input_ids.len(),
        output_tokens = output.len(),
        "generation finished"
    );
    Ok(output)
}
