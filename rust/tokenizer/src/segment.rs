//! Text segmentation shared by the learner and the codec.
//!
//! Text is cut into *pieces*: maximal runs of word characters (`[A-Za-z0-9_]`),
//! whitespace runs, and single characters that are neither. Concatenating the
//! pieces of a string always yields the string back.

use once_cell::sync::Lazy;
use regex::Regex;

/// Separators: a whitespace run, or any single non-word, non-space character.
static SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+|[^A-Za-z0-9_\s]").expect("separator pattern is valid")
});

/// Split text into pieces, keeping order and repeats.
///
/// Word runs are the gaps between separator matches; separators are emitted
/// as pieces of their own. Zero-length pieces are dropped.
pub fn split_pieces(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut last = 0;

    for m in SEPARATOR.find_iter(text) {
        if m.start() > last {
            pieces.push(&text[last..m.start()]);
        }
        pieces.push(m.as_str());
        last = m.end();
    }
    if last < text.len() {
        pieces.push(&text[last..]);
    }

    pieces
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// True if the piece is made only of word characters.
pub fn is_word(piece: &str) -> bool {
    !piece.is_empty() && piece.chars().all(is_word_char)
}

/// True for a whitespace run or a single punctuation/symbol character.
pub fn is_separator(piece: &str) -> bool {
    if piece.is_empty() {
        return false;
    }
    if piece.chars().all(char::is_whitespace) {
        return true;
    }
    let mut chars = piece.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => !is_word_char(c) && !c.is_whitespace(),
        _ => false,
    }
}

/// Every non-empty prefix of `piece` up to `max_len` characters, shortest first.
pub fn prefixes(piece: &str, max_len: usize) -> impl Iterator<Item = &str> {
    piece
        .char_indices()
        .skip(1)
        .map(|(i, _)| i)
        .chain(std::iter::once(piece.len()))
        .take(max_len)
        .map(move |end| &piece[..end])
}

/// Two-character substrings of each whitespace-delimited, lower-cased word.
pub fn bigrams(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut out = Vec::new();

    for word in lowered.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for window in chars.windows(2) {
            out.push(window.iter().collect());
        }
    }

    out
}
