//! Encoding text to token ids and back.
//!
//! Encoding always learns from its input first, then looks up each piece.
//! Pieces still unknown after learning (only possible when `min_frequency`
//! filters them out) go through [`Codec::encode_unknown`]:
//!
//! - whitespace runs and single punctuation characters become new entries
//! - words are consumed greedily by their longest known prefix, scanning from
//!   `max_token_length` characters down to 1
//! - if no prefix of any length is known, the *whole* remainder becomes one
//!   new entry rather than being split into characters
//!
//! Once the id space is exhausted nothing new can be minted; such pieces
//! encode as `<UNK>` when the vocabulary has it and are dropped otherwise.
//!
//! Decoding concatenates entry texts with no separator.

use serde::Serialize;

use crate::learner::Learner;
use crate::segment::{is_separator, prefixes, split_pieces};
use crate::vocab::{TokenId, Vocab, UNK_TOKEN};

/// One encoded token, with its position in the encode output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub id: TokenId,
    pub text: String,
    pub index: usize,
}

/// Segments text against a [`Vocab`], growing it as needed.
#[derive(Debug, Clone, Default)]
pub struct Codec {
    learner: Learner,
}

impl Codec {
    pub fn new(learner: Learner) -> Self {
        Self { learner }
    }

    pub fn learner(&self) -> &Learner {
        &self.learner
    }

    /// Encode text into token ids, learning from it first.
    pub fn encode(&self, vocab: &mut Vocab, text: &str) -> Vec<TokenId> {
        if text.is_empty() {
            return Vec::new();
        }

        self.learner.learn(vocab, text);

        let mut ids = Vec::new();
        for piece in split_pieces(text) {
            match vocab.lookup_id(piece) {
                Some(id) => ids.push(id),
                None => ids.extend(self.encode_unknown(vocab, piece)),
            }
        }
        ids
    }

    /// Encode a piece that has no entry of its own.
    pub fn encode_unknown(&self, vocab: &mut Vocab, piece: &str) -> Vec<TokenId> {
        if piece.is_empty() {
            return Vec::new();
        }
        if is_separator(piece) {
            return mint(vocab, piece).into_iter().collect();
        }

        let max_len = self.learner.config().max_token_length;
        let mut ids = Vec::new();
        let mut remaining = piece;

        while !remaining.is_empty() {
            match longest_known_prefix(vocab, remaining, max_len) {
                Some((id, end)) => {
                    ids.push(id);
                    remaining = &remaining[end..];
                }
                None => {
                    ids.extend(mint(vocab, remaining));
                    break;
                }
            }
        }

        ids
    }

    /// Decode token ids by concatenating their texts.
    ///
    /// Ids missing from the vocabulary decode as `<UNK>`.
    pub fn decode(&self, vocab: &Vocab, ids: &[TokenId]) -> String {
        ids.iter()
            .map(|&id| vocab.lookup_text(id).unwrap_or(UNK_TOKEN))
            .collect()
    }

    /// Encode text and pair each id with its text and output position.
    pub fn token_details(&self, vocab: &mut Vocab, text: &str) -> Vec<Token> {
        self.encode(vocab, text)
            .into_iter()
            .enumerate()
            .map(|(index, id)| Token {
                id,
                text: vocab.lookup_text(id).unwrap_or(UNK_TOKEN).to_string(),
                index,
            })
            .collect()
    }
}

fn mint(vocab: &mut Vocab, text: &str) -> Option<TokenId> {
    vocab
        .insert_learned(text)
        .or_else(|| vocab.lookup_id(UNK_TOKEN))
}

/// Longest prefix of `text` (at most `max_len` characters) with an entry.
/// Returns its id and byte length.
fn longest_known_prefix(vocab: &Vocab, text: &str, max_len: usize) -> Option<(TokenId, usize)> {
    let ends: Vec<usize> = prefixes(text, max_len).map(str::len).collect();
    ends.into_iter()
        .rev()
        .find_map(|end| vocab.lookup_id(&text[..end]).map(|id| (id, end)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenizerConfig;

    fn codec() -> Codec {
        Codec::default()
    }

    #[test]
    fn test_encode_fresh_vocab() {
        let codec = codec();
        let mut vocab = Vocab::new();

        let ids = codec.encode(&mut vocab, "Hi!");
        assert_eq!(ids, vec![vocab.lookup_id("Hi").unwrap(), vocab.lookup_id("!").unwrap()]);
        assert!(vocab.contains("H"));
        assert_eq!(codec.decode(&vocab, &ids), "Hi!");
    }

    #[test]
    fn test_encode_empty() {
        let mut vocab = Vocab::new();
        assert!(codec().encode(&mut vocab, "").is_empty());
        assert!(vocab.is_empty());
    }

    #[test]
    fn test_encode_preserves_whitespace_runs() {
        let codec = codec();
        let mut vocab = Vocab::new();
        let text = "a  b\n\tc";

        let ids = codec.encode(&mut vocab, text);
        assert_eq!(ids.len(), 5);
        assert_eq!(codec.decode(&vocab, &ids), text);
    }

    #[test]
    fn test_encode_repeated_pieces_share_ids() {
        let codec = codec();
        let mut vocab = Vocab::new();
        let ids = codec.encode(&mut vocab, "go go go");
        assert_eq!(ids[0], ids[2]);
        assert_eq!(ids[2], ids[4]);
        assert_eq!(ids[1], ids[3]);
    }

    #[test]
    fn test_encode_unknown_greedy_prefixes() {
        let codec = codec();
        let mut vocab = Vocab::new();
        let un = vocab.insert_learned("un").unwrap();
        let known = vocab.insert_learned("known").unwrap();

        let ids = codec.encode_unknown(&mut vocab, "unknown");
        assert_eq!(ids, vec![un, known]);
        assert_eq!(codec.decode(&vocab, &ids), "unknown");
        assert!(!vocab.contains("unknown"));
    }

    #[test]
    fn test_encode_unknown_prefers_longest() {
        let codec = codec();
        let mut vocab = Vocab::new();
        vocab.insert_learned("a");
        let abc = vocab.insert_learned("abc").unwrap();
        vocab.insert_learned("ab");
        let d = vocab.insert_learned("d").unwrap();

        assert_eq!(codec.encode_unknown(&mut vocab, "abcd"), vec![abc, d]);
    }

    #[test]
    fn test_encode_unknown_total_miss_mints_whole_remainder() {
        let codec = codec();
        let mut vocab = Vocab::new();

        let ids = codec.encode_unknown(&mut vocab, "xyz");
        assert_eq!(ids, vec![0]);
        assert_eq!(vocab.lookup_text(0), Some("xyz"));
        assert_eq!(vocab.len(), 1);
    }

    #[test]
    fn test_encode_unknown_partial_then_mint() {
        let codec = codec();
        let mut vocab = Vocab::new();
        let pre = vocab.insert_learned("pre").unwrap();

        let ids = codec.encode_unknown(&mut vocab, "prefixxy");
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0], pre);
        assert_eq!(vocab.lookup_text(ids[1]), Some("fixxy"));
    }

    #[test]
    fn test_encode_unknown_separators() {
        let codec = codec();
        let mut vocab = Vocab::new();

        let ws = codec.encode_unknown(&mut vocab, "\t\t");
        let bang = codec.encode_unknown(&mut vocab, "!");
        assert_eq!(ws, vec![0]);
        assert_eq!(bang, vec![1]);
        assert_eq!(codec.encode_unknown(&mut vocab, "!"), vec![1]);
        assert!(codec.encode_unknown(&mut vocab, "").is_empty());
    }

    #[test]
    fn test_encode_with_high_min_frequency_uses_fallback() {
        let codec = Codec::new(Learner::new(TokenizerConfig::default().with_min_frequency(5)));
        let mut vocab = Vocab::new();
        vocab.insert_learned("token");

        let ids = codec.encode(&mut vocab, "tokens!");
        assert_eq!(ids[0], 0);
        assert_eq!(codec.decode(&vocab, &ids), "tokens!");
        assert!(vocab.contains("s"));
    }

    #[test]
    fn test_exhausted_vocab_encodes_as_unk() {
        let codec = codec();
        let mut vocab = Vocab::new();
        vocab.initialize_special_tokens();
        vocab
            .restore_json(r#"{"nextTokenId": 4294967295}"#)
            .unwrap();
        let size = vocab.len();

        assert_eq!(codec.encode_unknown(&mut vocab, "zzz"), vec![1]);
        assert_eq!(codec.encode_unknown(&mut vocab, "?"), vec![1]);
        assert_eq!(codec.encode(&mut vocab, "new words"), vec![1, 1, 1]);
        assert_eq!(vocab.len(), size);
    }

    #[test]
    fn test_exhausted_vocab_without_unk_drops_piece() {
        let codec = codec();
        let mut vocab = Vocab::new();
        vocab
            .restore_json(r#"{"vocab": {"0": "ok"}, "nextTokenId": 4294967295}"#)
            .unwrap();

        assert!(codec.encode_unknown(&mut vocab, "nope").is_empty());
        assert_eq!(codec.encode(&mut vocab, "ok"), vec![0]);
    }

    #[test]
    fn test_decode_unknown_id() {
        let codec = codec();
        let mut vocab = Vocab::new();
        let ids = codec.encode(&mut vocab, "ok");
        let mut with_bad = ids.clone();
        with_bad.push(9999);
        assert_eq!(codec.decode(&vocab, &with_bad), "ok<UNK>");
        assert_eq!(codec.decode(&vocab, &[]), "");
    }

    #[test]
    fn test_token_details_indices() {
        let codec = codec();
        let mut vocab = Vocab::new();
        let tokens = codec.token_details(&mut vocab, "Hello, world");

        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Hello", ",", " ", "world"]);
        for (i, token) in tokens.iter().enumerate() {
            assert_eq!(token.index, i);
            assert_eq!(vocab.lookup_id(&token.text), Some(token.id));
        }
    }
}
