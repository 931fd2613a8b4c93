/// Tokens that would complete an `n`-gram already present in `history`.
///
/// The last `n - 1` tokens of `history` form the context; every token that
/// followed that same context earlier is banned. With `n == 1` every token
/// seen so far is banned. The result is sorted and deduplicated.
pub fn banned_ngram_tokens(history: &[usize], n: usize) -> Vec<usize> {
    if n == 0 || history.len() < n {
        return Vec::new();
    }

    let context = &history[history.len() + 1 - n..];
    let mut banned: Vec<usize> = history
        .windows(n)
        .filter_map(|ngram| {
            let (last, head) = ngram.split_last()?;
            (head == context).then_some(*last)
        })
        .collect();
    banned.sort_unstable();
    banned.dedup();
    banned
}
