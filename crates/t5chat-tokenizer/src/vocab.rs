//! Fixed-vocabulary tokenizer.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use crate::{
    builtin, SpecialTokens, TokenId, Tokenizer, TokenizerError, TokenizerResult, EOS_TOKEN,
    PAD_TOKEN, UNK_TOKEN,
};

/// SentencePiece word-start marker (U+2581).
pub const WORD_MARKER: char = '\u{2581}';

/// Tokenizer over a fixed vocabulary.
///
/// Two vocabulary styles are handled:
/// - whole-word vocabularies (the built-in one): one token per whitespace word,
///   decoded by joining words with single spaces
/// - SentencePiece vocabularies (pieces prefixed with [`WORD_MARKER`]): each word
///   is segmented greedily by longest matching piece, decoded by concatenation
///
/// Words with no match map to `<unk>`.
pub struct VocabTokenizer {
    pieces: Vec<String>,
    token_to_id: HashMap<String, TokenId>,
    special: SpecialTokens,
    word_markers: bool,
}

enum Segment<'a> {
    Text(&'a str),
    Special(TokenId),
}

impl VocabTokenizer {
    /// The built-in English vocabulary.
    pub fn builtin() -> Self {
        Self::assemble(builtin::pieces(), builtin::SPECIAL)
    }

    /// Build a tokenizer from pieces indexed by token ID.
    ///
    /// The vocabulary must contain `<pad>`, `</s>` and `<unk>`.
    pub fn from_pieces(pieces: Vec<String>) -> TokenizerResult<Self> {
        let find = |literal: &str| {
            pieces
                .iter()
                .position(|p| p == literal)
                .map(|idx| idx as TokenId)
                .ok_or_else(|| TokenizerError::Load(format!("vocabulary has no {literal} token")))
        };
        let special = SpecialTokens {
            pad_token_id: find(PAD_TOKEN)?,
            eos_token_id: find(EOS_TOKEN)?,
            unk_token_id: find(UNK_TOKEN)?,
        };
        Ok(Self::assemble(pieces, special))
    }

    /// Load a vocabulary from a HuggingFace `tokenizer.json` file.
    ///
    /// Accepts both `model.vocab` layouts: an object of `token -> id` (BPE/WordLevel)
    /// and an array of `[piece, score]` pairs (Unigram, as shipped with T5).
    /// Entries of `added_tokens` override the pieces at their IDs.
    pub fn from_file(path: &Path) -> TokenizerResult<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            TokenizerError::Load(format!("failed to read {}: {e}", path.display()))
        })?;

        let json: Value = serde_json::from_str(&data)
            .map_err(|e| TokenizerError::Load(format!("failed to parse tokenizer JSON: {e}")))?;

        let vocab = json
            .get("model")
            .and_then(|m| m.get("vocab"))
            .ok_or_else(|| TokenizerError::Load("missing model.vocab".to_string()))?;

        let mut pieces = match vocab {
            Value::Object(map) => {
                let mut pieces = vec![String::new(); map.len()];
                for (token, id) in map {
                    let id = id.as_u64().ok_or_else(|| {
                        TokenizerError::Load(format!("token {token:?} has a non-integer id"))
                    })? as usize;
                    if id >= pieces.len() {
                        pieces.resize(id + 1, String::new());
                    }
                    pieces[id] = token.clone();
                }
                pieces
            }
            Value::Array(entries) => entries
                .iter()
                .map(|entry| {
                    entry
                        .get(0)
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .ok_or_else(|| {
                            TokenizerError::Load("malformed unigram vocab entry".to_string())
                        })
                })
                .collect::<TokenizerResult<Vec<_>>>()?,
            _ => {
                return Err(TokenizerError::Load(
                    "model.vocab must be an object or an array".to_string(),
                ))
            }
        };

        if let Some(added) = json.get("added_tokens").and_then(Value::as_array) {
            for token in added {
                let id = token.get("id").and_then(Value::as_u64);
                let content = token.get("content").and_then(Value::as_str);
                if let (Some(id), Some(content)) = (id, content) {
                    let id = id as usize;
                    if id >= pieces.len() {
                        pieces.resize(id + 1, String::new());
                    }
                    pieces[id] = content.to_string();
                }
            }
        }

        let tokenizer = Self::from_pieces(pieces)?;
        tracing::debug!(
            path = %path.display(),
            vocab_size = tokenizer.vocab_size(),
            "loaded tokenizer vocabulary"
        );
        Ok(tokenizer)
    }

    fn assemble(pieces: Vec<String>, special: SpecialTokens) -> Self {
        let mut token_to_id = HashMap::with_capacity(pieces.len());
        for (idx, piece) in pieces.iter().enumerate() {
            if !piece.is_empty() {
                token_to_id.entry(piece.clone()).or_insert(idx as TokenId);
            }
        }
        let word_markers = pieces.iter().any(|p| p.starts_with(WORD_MARKER));

        Self {
            pieces,
            token_to_id,
            special,
            word_markers,
        }
    }

    /// Piece text for a token ID.
    pub fn piece(&self, id: TokenId) -> TokenizerResult<&str> {
        usize::try_from(id)
            .ok()
            .and_then(|idx| self.pieces.get(idx))
            .filter(|p| !p.is_empty())
            .map(String::as_str)
            .ok_or(TokenizerError::InvalidToken(id))
    }

    /// Split raw text around special-token literals.
    fn segments<'a>(&self, mut text: &'a str) -> Vec<Segment<'a>> {
        let literals = self.special.literals();
        let mut out = Vec::new();
        loop {
            let next = literals
                .iter()
                .filter_map(|&(lit, id)| text.find(lit).map(|pos| (pos, lit.len(), id)))
                .min_by_key(|&(pos, _, _)| pos);

            match next {
                Some((pos, len, id)) => {
                    if pos > 0 {
                        out.push(Segment::Text(&text[..pos]));
                    }
                    out.push(Segment::Special(id));
                    text = &text[pos + len..];
                }
                None => {
                    if !text.is_empty() {
                        out.push(Segment::Text(text));
                    }
                    return out;
                }
            }
        }
    }

    fn encode_word(&self, word: &str, ids: &mut Vec<TokenId>) {
        if !self.word_markers {
            let id = self
                .token_to_id
                .get(word)
                .or_else(|| self.token_to_id.get(&word.to_lowercase()))
                .copied()
                .unwrap_or(self.special.unk_token_id);
            ids.push(id);
            return;
        }

        let marked = format!("{WORD_MARKER}{word}");
        let mut rest = marked.as_str();
        while !rest.is_empty() {
            let longest = rest
                .char_indices()
                .map(|(idx, ch)| idx + ch.len_utf8())
                .rev()
                .find_map(|end| self.token_to_id.get(&rest[..end]).map(|&id| (id, end)));

            match longest {
                Some((id, end)) => {
                    ids.push(id);
                    rest = &rest[end..];
                }
                None => {
                    ids.push(self.special.unk_token_id);
                    let skip = rest.chars().next().map_or(rest.len(), char::len_utf8);
                    rest = &rest[skip..];
                }
            }
        }
    }
}

impl Default for VocabTokenizer {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Tokenizer for VocabTokenizer {
    fn encode(&self, text: &str) -> TokenizerResult<Vec<TokenId>> {
        let mut ids = Vec::new();
        for segment in self.segments(text) {
            match segment {
                Segment::Special(id) => ids.push(id),
                Segment::Text(text) => {
                    for word in text.split_whitespace() {
                        self.encode_word(word, &mut ids);
                    }
                }
            }
        }
        Ok(ids)
    }

    fn decode(&self, tokens: &[TokenId], skip_special_tokens: bool) -> TokenizerResult<String> {
        let mut pieces = Vec::with_capacity(tokens.len());
        for &id in tokens {
            if skip_special_tokens && self.special.is_special(id) {
                continue;
            }
            pieces.push(self.piece(id)?);
        }

        if self.word_markers {
            let text = pieces.concat().replace(WORD_MARKER, " ");
            Ok(text.trim_start().to_string())
        } else {
            Ok(pieces.join(" "))
        }
    }

    fn special_tokens(&self) -> &SpecialTokens {
        &self.special
    }

    fn vocab_size(&self) -> usize {
        self.pieces.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentencepiece() -> VocabTokenizer {
        let pieces = ["<pad>", "</s>", "<unk>", "▁hel", "lo", "▁hello", "▁wor", "ld", "▁"]
            .iter()
            .map(|p| p.to_string())
            .collect();
        VocabTokenizer::from_pieces(pieces).unwrap()
    }

    #[test]
    fn builtin_special_ids_follow_t5_layout() {
        let tok = VocabTokenizer::builtin();
        assert_eq!(tok.pad_token_id(), 0);
        assert_eq!(tok.eos_token_id(), 1);
        assert_eq!(tok.special_tokens().unk_token_id, 2);
        assert_eq!(tok.eos_token(), "</s>");
    }

    #[test]
    fn encode_known_words() {
        let tok = VocabTokenizer::builtin();
        let ids = tok.encode("hello world").unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids.iter().all(|&id| id > 2));
    }

    #[test]
    fn encode_is_case_insensitive_for_builtin() {
        let tok = VocabTokenizer::builtin();
        assert_eq!(tok.encode("Hello").unwrap(), tok.encode("hello").unwrap());
    }

    #[test]
    fn encode_unknown_word_maps_to_unk() {
        let tok = VocabTokenizer::builtin();
        assert_eq!(tok.encode("zyzzyva").unwrap(), vec![2]);
    }

    #[test]
    fn encode_recognises_trailing_eos_literal() {
        let tok = VocabTokenizer::builtin();
        let ids = tok.encode("hello</s>").unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(*ids.last().unwrap(), tok.eos_token_id());
    }

    #[test]
    fn encode_empty_with_eos_is_only_eos() {
        let tok = VocabTokenizer::builtin();
        assert_eq!(tok.encode("</s>").unwrap(), vec![1]);
        assert!(tok.encode("").unwrap().is_empty());
    }

    #[test]
    fn decode_skips_special_tokens() {
        let tok = VocabTokenizer::builtin();
        let mut ids = vec![tok.pad_token_id()];
        ids.extend(tok.encode("good morning").unwrap());
        ids.push(tok.eos_token_id());
        assert_eq!(tok.decode(&ids, true).unwrap(), "good morning");
        assert_eq!(tok.decode(&ids, false).unwrap(), "<pad> good morning </s>");
    }

    #[test]
    fn decode_invalid_token_errors() {
        let tok = VocabTokenizer::builtin();
        assert_eq!(
            tok.decode(&[9999], true).unwrap_err(),
            TokenizerError::InvalidToken(9999)
        );
        assert_eq!(
            tok.decode(&[-1], true).unwrap_err(),
            TokenizerError::InvalidToken(-1)
        );
    }

    #[test]
    fn sentencepiece_prefers_whole_word_piece() {
        let tok = sentencepiece();
        assert_eq!(tok.encode("hello").unwrap(), vec![5]);
    }

    #[test]
    fn sentencepiece_segments_by_longest_match() {
        let tok = sentencepiece();
        assert_eq!(tok.encode("world").unwrap(), vec![6, 7]);
        assert_eq!(tok.decode(&[5, 6, 7], true).unwrap(), "hello world");
    }

    #[test]
    fn sentencepiece_unknown_chars_become_unk() {
        let tok = sentencepiece();
        // "▁" matches, then 'x' has no piece.
        assert_eq!(tok.encode("x").unwrap(), vec![8, 2]);
    }

    #[test]
    fn from_pieces_requires_special_tokens() {
        let pieces = vec!["<pad>".to_string(), "hello".to_string()];
        let err = VocabTokenizer::from_pieces(pieces).err().unwrap();
        assert_eq!(
            err,
            TokenizerError::Load("vocabulary has no </s> token".to_string())
        );
    }
}
