//! Tiny deterministic sequence-to-sequence model.
//!
//! Stands in for a pretrained checkpoint so the whole chat pipeline runs without
//! downloading weights. Weights come from a fixed seed, so replies are word salad
//! drawn from the vocabulary, but every stage (encode, decode steps, sampling,
//! EOS) behaves like the real thing.

use t5chat_sampling::SeededRng;
use t5chat_tokenizer::SpecialTokens;

use crate::{EncoderOutput, EngineError, Result, Seq2SeqModel, TokenId};

/// Configuration for the tiny demo model.
#[derive(Debug, Clone)]
pub struct TinySeq2SeqConfig {
    pub d_model: usize,
    pub d_ff: usize,
    pub vocab_size: usize,
    pub special: SpecialTokens,
    /// EOS is suppressed until the decoder holds this many tokens.
    pub min_length: usize,
    /// Per-step growth of the EOS logit, so replies end in reasonable time.
    pub eos_growth: f32,
    /// Multiplier on the output projection; widens the logit spread.
    pub logit_scale: f32,
    pub norm_eps: f32,
    pub weight_seed: u64,
}

impl TinySeq2SeqConfig {
    /// Config for a vocabulary of `vocab_size` with the given special tokens.
    pub fn new(vocab_size: usize, special: SpecialTokens) -> Self {
        Self {
            d_model: 32,
            d_ff: 64,
            vocab_size,
            special,
            min_length: 4,
            eos_growth: 0.35,
            logit_scale: 8.0,
            norm_eps: 1e-5,
            weight_seed: 12345,
        }
    }
}

/// Single-block encoder-decoder with seeded weights.
///
/// Encoder: mean-pooled token embeddings through a tanh projection.
/// Decoder step: last token embedding + encoder context + position signal →
/// norm → feed-forward with residual → norm → vocabulary projection.
pub struct TinySeq2Seq {
    pub config: TinySeq2SeqConfig,
    // [vocab_size, d_model]
    embeddings: Vec<f32>,
    w_enc: Vec<f32>,
    w_up: Vec<f32>,
    w_down: Vec<f32>,
    // [d_model, vocab_size]
    lm_head: Vec<f32>,
}

fn fill(rng: &mut SeededRng, n: usize) -> Vec<f32> {
    // Small magnitude weights for stability
    (0..n).map(|_| (rng.next_f32() - 0.5) * 0.2).collect()
}

fn rms_norm(x: &[f32], eps: f32) -> Vec<f32> {
    let mean_sq = x.iter().map(|v| v * v).sum::<f32>() / x.len().max(1) as f32;
    let scale = 1.0 / (mean_sq + eps).sqrt();
    x.iter().map(|v| v * scale).collect()
}

impl TinySeq2Seq {
    /// Create a model with deterministic weights from `config.weight_seed`.
    pub fn new(config: TinySeq2SeqConfig) -> Result<Self> {
        if config.vocab_size == 0 || config.d_model == 0 {
            return Err(EngineError::ModelLoad(
                "tiny model needs a non-empty vocabulary and hidden size".to_string(),
            ));
        }
        for id in [
            config.special.pad_token_id,
            config.special.eos_token_id,
            config.special.unk_token_id,
        ] {
            if usize::try_from(id).map_or(true, |idx| idx >= config.vocab_size) {
                return Err(EngineError::ModelLoad(format!(
                    "special token {id} outside vocabulary of {}",
                    config.vocab_size
                )));
            }
        }

        let mut rng = SeededRng::new(config.weight_seed);
        let d = config.d_model;
        let ff = config.d_ff;
        let v = config.vocab_size;

        Ok(Self {
            embeddings: fill(&mut rng, v * d),
            w_enc: fill(&mut rng, d * d),
            w_up: fill(&mut rng, d * ff),
            w_down: fill(&mut rng, ff * d),
            lm_head: fill(&mut rng, d * v),
            config,
        })
    }

    fn embed(&self, token_id: TokenId) -> Result<&[f32]> {
        let d = self.config.d_model;
        let idx = usize::try_from(token_id)
            .ok()
            .filter(|&idx| idx < self.config.vocab_size)
            .ok_or_else(|| EngineError::Inference(format!("token {token_id} outside vocabulary")))?;
        Ok(&self.embeddings[idx * d..(idx + 1) * d])
    }

    /// Matrix-vector multiply: x @ W where W is [in_dim, out_dim] row-major.
    fn matvec(x: &[f32], w: &[f32], in_dim: usize, out_dim: usize) -> Vec<f32> {
        let mut out = vec![0.0; out_dim];
        for (j, &xj) in x.iter().enumerate().take(in_dim) {
            let row = &w[j * out_dim..(j + 1) * out_dim];
            for (o, &wji) in out.iter_mut().zip(row) {
                *o += xj * wji;
            }
        }
        out
    }
}

impl Seq2SeqModel for TinySeq2Seq {
    fn vocab_size(&self) -> usize {
        self.config.vocab_size
    }

    fn encode(&self, input_ids: &[TokenId]) -> Result<EncoderOutput> {
        let d = self.config.d_model;
        if input_ids.is_empty() {
            return Err(EngineError::Inference("encoder input is empty".to_string()));
        }

        let mut pooled = vec![0.0f32; d];
        for &id in input_ids {
            for (p, e) in pooled.iter_mut().zip(self.embed(id)?) {
                *p += e;
            }
        }
        let n = input_ids.len() as f32;
        for p in &mut pooled {
            *p /= n;
        }

        let hidden = Self::matvec(&rms_norm(&pooled, self.config.norm_eps), &self.w_enc, d, d)
            .into_iter()
            .map(f32::tanh)
            .collect();

        Ok(EncoderOutput {
            hidden,
            seq_len: input_ids.len(),
        })
    }

    fn decode_step(&self, encoder: &EncoderOutput, decoder_ids: &[TokenId]) -> Result<Vec<f32>> {
        let c = &self.config;
        let d = c.d_model;
        let last = *decoder_ids
            .last()
            .ok_or_else(|| EngineError::Inference("decoder input is empty".to_string()))?;
        if encoder.hidden.len() != d {
            return Err(EngineError::Inference(format!(
                "encoder state has width {}, expected {d}",
                encoder.hidden.len()
            )));
        }

        // 1. Token + context + position
        let position = decoder_ids.len() as f32;
        let x: Vec<f32> = self
            .embed(last)?
            .iter()
            .zip(&encoder.hidden)
            .enumerate()
            .map(|(i, (e, h))| e + h + (position * 0.37 * (i + 1) as f32).sin() * 0.1)
            .collect();

        // 2. Feed-forward with residual
        let x_norm = rms_norm(&x, c.norm_eps);
        let up: Vec<f32> = Self::matvec(&x_norm, &self.w_up, d, c.d_ff)
            .into_iter()
            .map(f32::tanh)
            .collect();
        let down = Self::matvec(&up, &self.w_down, c.d_ff, d);
        let hidden: Vec<f32> = x_norm.iter().zip(&down).map(|(a, b)| a + b).collect();

        // 3. Project to vocab logits
        let mut logits: Vec<f32> = Self::matvec(&rms_norm(&hidden, c.norm_eps), &self.lm_head, d, c.vocab_size)
            .into_iter()
            .map(|l| l * c.logit_scale)
            .collect();

        // 4. Special tokens: never pad/unk; EOS only after min_length, then ever likelier
        for id in [c.special.pad_token_id, c.special.unk_token_id] {
            logits[id as usize] = f32::NEG_INFINITY;
        }
        let eos = c.special.eos_token_id as usize;
        logits[eos] = if decoder_ids.len() < c.min_length {
            f32::NEG_INFINITY
        } else {
            c.eos_growth * (decoder_ids.len() - c.min_length) as f32
        };

        Ok(logits)
    }
}
