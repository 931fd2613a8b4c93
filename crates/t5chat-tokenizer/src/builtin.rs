//! Built-in vocabulary used when no `tokenizer.json` is configured.

use crate::{SpecialTokens, EOS_TOKEN, PAD_TOKEN, UNK_TOKEN};

/// Common English words, one token each. IDs follow the three special tokens.
const WORDS: &[&str] = &[
    "the", "be", "to", "of", "and", "a", "in", "that", "have", "i", "it", "for", "not",
    "on", "with", "he", "as", "you", "do", "at", "this", "but", "his", "by", "from",
    "they", "we", "say", "her", "she", "or", "an", "will", "my", "one", "all", "would",
    "there", "their", "what", "so", "up", "out", "if", "about", "who", "get", "which",
    "go", "me", "when", "make", "can", "like", "time", "no", "just", "him", "know", "take",
    "people", "into", "year", "your", "good", "some", "could", "them", "see", "other",
    "than", "then", "now", "look", "only", "come", "its", "over", "think", "also", "back",
    "after", "use", "two", "how", "our", "work", "first", "well", "way", "even", "new",
    "want", "because", "any", "these", "give", "day", "most", "us", "is", "are", "was",
    "were", "am", "been", "has", "had", "did", "said", "hello", "hi", "hey", "thanks",
    "thank", "please", "yes", "sorry", "okay", "sure", "great", "nice", "fine", "happy",
    "glad", "help", "question", "answer", "tell", "talk", "chat", "friend", "world",
    "today", "tomorrow", "night", "morning", "weather", "music", "book", "story", "idea",
    "thing", "place", "home", "life", "love", "learn", "read", "write", "play", "game",
    "movie", "food", "coffee", "tea", "water", "city", "country", "language", "english",
    "french", "german", "computer", "program", "code", "data", "model", "machine",
    "learning", "problem", "reason", "sense", "true", "false", "maybe", "always", "never",
    "often", "sometimes", "very", "really", "much", "many", "more", "less", "little",
    "big", "small", "long", "short", "old", "young", "right", "left", "here", "where",
    "why", "what's", "it's", "i'm", "you're", "don't", "can't",
];

/// Special token layout of the built-in vocabulary (T5 order).
pub(crate) const SPECIAL: SpecialTokens = SpecialTokens {
    pad_token_id: 0,
    eos_token_id: 1,
    unk_token_id: 2,
};

/// All pieces of the built-in vocabulary, indexed by token ID.
pub(crate) fn pieces() -> Vec<String> {
    [PAD_TOKEN, EOS_TOKEN, UNK_TOKEN]
        .iter()
        .chain(WORDS.iter())
        .map(|w| w.to_string())
        .collect()
}
