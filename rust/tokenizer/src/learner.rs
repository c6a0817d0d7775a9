//! Online vocabulary learning.
//!
//! Every string the tokenizer sees grows the vocabulary in two passes:
//! 1. Whole pieces (words, whitespace runs, punctuation) plus every prefix of
//!    each word up to `max_token_length` characters
//! 2. Two-character substrings of each lower-cased, whitespace-delimited word
//!
//! A candidate is inserted when its count within the string reaches
//! `min_frequency` and the text is not already known. Whole pieces count their
//! own occurrences; a prefix that never occurs on its own takes the count of
//! its most frequent parent word. This is a cheap stand-in
//! for merge statistics, not BPE: prefixes let greedy segmentation reuse stems
//! of novel word forms and bigrams cover short fragments.

use log::{debug, info};
use rayon::prelude::*;
use std::collections::HashMap;

use crate::config::TokenizerConfig;
use crate::segment::{bigrams, is_word, prefixes, split_pieces};
use crate::vocab::Vocab;

/// Occurrence counts that remember first-seen order.
#[derive(Debug, Clone, Default)]
struct Counts {
    order: Vec<String>,
    counts: HashMap<String, usize>,
}

impl Counts {
    fn add(&mut self, text: &str) {
        match self.counts.get_mut(text) {
            Some(count) => *count += 1,
            None => {
                self.order.push(text.to_string());
                self.counts.insert(text.to_string(), 1);
            }
        }
    }

    /// Set `text` to at least `value`, recording it if unseen.
    fn raise(&mut self, text: &str, value: usize) {
        match self.counts.get_mut(text) {
            Some(count) => *count = (*count).max(value),
            None => {
                self.order.push(text.to_string());
                self.counts.insert(text.to_string(), value);
            }
        }
    }

    fn get(&self, text: &str) -> Option<usize> {
        self.counts.get(text).copied()
    }

    fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.order
            .iter()
            .map(|text| (text.as_str(), self.counts[text]))
    }
}

/// What a single string would teach the vocabulary.
///
/// Computing candidates does not touch the vocabulary, so it can run in
/// parallel; applying them must stay in corpus order.
#[derive(Debug, Clone, Default)]
pub struct Candidates {
    pieces: Counts,
    bigrams: Counts,
}

impl Candidates {
    /// Pieces and word prefixes with their counts, in first-seen order.
    pub fn pieces(&self) -> impl Iterator<Item = (&str, usize)> {
        self.pieces.iter()
    }

    /// Lower-cased bigrams with their counts, in first-seen order.
    pub fn bigrams(&self) -> impl Iterator<Item = (&str, usize)> {
        self.bigrams.iter()
    }
}

/// Grows a [`Vocab`] from observed text.
#[derive(Debug, Clone, Default)]
pub struct Learner {
    config: TokenizerConfig,
}

impl Learner {
    /// Create a new learner with the given configuration.
    pub fn new(config: TokenizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Collect the candidates for one string.
    ///
    /// A piece's count is the number of times it occurs as a whole piece.
    /// Proper prefixes of multi-character word pieces are added after their
    /// word; a prefix that is not itself a piece counts as often as its most
    /// frequent parent.
    pub fn candidates(&self, text: &str) -> Candidates {
        let mut candidates = Candidates::default();

        let mut whole = Counts::default();
        for piece in split_pieces(text) {
            whole.add(piece);
        }

        for (piece, count) in whole.iter() {
            candidates.pieces.raise(piece, count);

            if piece.chars().nth(1).is_some() && is_word(piece) {
                for prefix in prefixes(piece, self.config.max_token_length) {
                    if prefix.len() < piece.len() {
                        let value = whole.get(prefix).unwrap_or(count);
                        candidates.pieces.raise(prefix, value);
                    }
                }
            }
        }

        for bigram in bigrams(text) {
            candidates.bigrams.add(&bigram);
        }

        candidates
    }

    /// Learn from one string. Returns the number of entries added.
    pub fn learn(&self, vocab: &mut Vocab, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        let candidates = self.candidates(text);
        self.apply(vocab, &candidates)
    }

    /// Learn from each string of a corpus, in order.
    ///
    /// Candidate collection is parallelized with rayon; insertion is
    /// sequential, so ids match a plain loop over [`Learner::learn`].
    pub fn train<S: AsRef<str> + Sync>(&self, vocab: &mut Vocab, corpus: &[S]) -> usize {
        let prepared: Vec<Candidates> = corpus
            .par_iter()
            .map(|text| self.candidates(text.as_ref()))
            .collect();

        let start_len = vocab.len();
        let mut added = 0;
        for (i, candidates) in prepared.iter().enumerate() {
            added += self.apply(vocab, candidates);

            if self.config.log_interval > 0 && (i + 1) % self.config.log_interval == 0 {
                info!(
                    "  Trained {}/{} strings: vocab size = {} (+{})",
                    i + 1,
                    corpus.len(),
                    vocab.len(),
                    vocab.len() - start_len
                );
            }
        }

        info!(
            "Training complete: {} strings, {} entries added, vocab size = {}",
            corpus.len(),
            added,
            vocab.len()
        );

        added
    }

    fn apply(&self, vocab: &mut Vocab, candidates: &Candidates) -> usize {
        let before = vocab.len();
        let min_frequency = self.config.min_frequency;

        for (text, count) in candidates.pieces().chain(candidates.bigrams()) {
            if count >= min_frequency && !vocab.contains(text) {
                vocab.insert_learned(text);
            }
        }

        let added = vocab.len() - before;
        if added > 0 {
            debug!("learned {} new entries (vocab size = {})", added, vocab.len());
        }
        added
    }
}
