//! # t5chat-sampling
//!
//! Picks the next decoder token from a row of logits.
//!
//! A draw runs the surviving tokens through a fixed pipeline: n-gram bans,
//! top-k, temperature, softmax, nucleus (top-p) cut, then one weighted draw
//! from a [`SeededRng`]. A temperature below `1e-3` short-circuits to argmax.

mod ngram;
mod rng;

pub use ngram::banned_ngram_tokens;
pub use rng::SeededRng;

/// Below this temperature the sampler always takes the most likely token.
const GREEDY_BELOW: f32 = 1e-3;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SamplingError {
    #[error("logits row is empty")]
    InvalidLogits,
    #[error("temperature must be > 0")]
    InvalidTemperature,
    #[error("no token left to sample after filtering")]
    NoValidTokens,
}

pub type SamplingResult<T> = std::result::Result<T, SamplingError>;

/// A token still in the running, with its logit or probability.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    token: usize,
    weight: f32,
}

/// Next-token sampler with a private, seeded RNG.
#[derive(Debug, Clone)]
pub struct Sampler {
    pub temperature: f32,
    /// Keep only the `k` most likely tokens.
    pub top_k: Option<usize>,
    /// Keep the smallest set of tokens whose probability reaches `p`.
    pub top_p: Option<f32>,
    /// Never emit an n-gram that already occurs in the history.
    pub no_repeat_ngram_size: Option<usize>,
    rng: SeededRng,
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler {
    /// Full distribution at temperature 1.0, no filters.
    pub fn new() -> Self {
        Self {
            temperature: 1.0,
            top_k: None,
            top_p: None,
            no_repeat_ngram_size: None,
            rng: SeededRng::new(42),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }

    pub fn with_top_p(mut self, p: f32) -> Self {
        self.top_p = Some(p);
        self
    }

    pub fn with_no_repeat_ngram_size(mut self, n: usize) -> Self {
        self.no_repeat_ngram_size = Some(n);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SeededRng::new(seed);
        self
    }

    /// Draw a token with no history.
    pub fn sample(&mut self, logits: &[f32]) -> SamplingResult<usize> {
        self.sample_with_history(logits, &[])
    }

    /// Draw a token given the sequence produced so far.
    pub fn sample_with_history(
        &mut self,
        logits: &[f32],
        history: &[usize],
    ) -> SamplingResult<usize> {
        if logits.is_empty() {
            return Err(SamplingError::InvalidLogits);
        }
        if self.temperature <= 0.0 {
            return Err(SamplingError::InvalidTemperature);
        }

        let mut candidates = self.ranked_candidates(logits, history);
        if candidates.is_empty() {
            return Err(SamplingError::NoValidTokens);
        }

        if let Some(k) = self.top_k.filter(|&k| k > 0) {
            candidates.truncate(k);
        }

        if self.temperature < GREEDY_BELOW {
            return Ok(candidates[0].token);
        }

        softmax(&mut candidates, self.temperature);

        if let Some(p) = self.top_p {
            nucleus(&mut candidates, p);
        }

        Ok(self.draw(&candidates))
    }

    /// Finite, unbanned tokens ordered from most to least likely.
    fn ranked_candidates(&self, logits: &[f32], history: &[usize]) -> Vec<Candidate> {
        let banned = match self.no_repeat_ngram_size {
            Some(n) => banned_ngram_tokens(history, n),
            None => Vec::new(),
        };

        let mut candidates: Vec<Candidate> = logits
            .iter()
            .enumerate()
            .filter(|(token, logit)| logit.is_finite() && banned.binary_search(token).is_err())
            .map(|(token, &weight)| Candidate { token, weight })
            .collect();
        // Stable sort: equal logits keep token order.
        candidates.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        candidates
    }

    fn draw(&mut self, candidates: &[Candidate]) -> usize {
        let total: f32 = candidates.iter().map(|c| c.weight).sum();
        let mut remaining = self.rng.next_f32() * total;
        for candidate in candidates {
            if remaining < candidate.weight {
                return candidate.token;
            }
            remaining -= candidate.weight;
        }
        // Rounding can leave a sliver past the last bucket.
        candidates[candidates.len() - 1].token
    }
}

/// Turn ranked logits into probabilities at `temperature`.
fn softmax(candidates: &mut [Candidate], temperature: f32) {
    let max = candidates[0].weight;
    let mut sum = 0.0;
    for candidate in candidates.iter_mut() {
        candidate.weight = ((candidate.weight - max) / temperature).exp();
        sum += candidate.weight;
    }
    for candidate in candidates.iter_mut() {
        candidate.weight /= sum;
    }
}

/// Keep the shortest ranked prefix whose mass reaches `p` (at least one token).
fn nucleus(candidates: &mut Vec<Candidate>, p: f32) {
    let mut mass = 0.0;
    let mut keep = candidates.len();
    for (i, candidate) in candidates.iter().enumerate() {
        mass += candidate.weight;
        if mass >= p {
            keep = i + 1;
            break;
        }
    }
    candidates.truncate(keep.max(1));
}
