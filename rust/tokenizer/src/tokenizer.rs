//! The tokenizer as seen by callers: one owned vocabulary plus the codec.
//!
//! All methods run to completion synchronously. Encoding mutates the
//! vocabulary, so a shared `Tokenizer` must be behind a single lock
//! (e.g. `Mutex<Tokenizer>`) with one lock acquisition per call.

use std::collections::BTreeMap;
use std::path::Path;

use log::info;

use crate::codec::{Codec, Token};
use crate::config::TokenizerConfig;
use crate::error::Result;
use crate::learner::Learner;
use crate::stats::TokenStats;
use crate::vocab::{RestoreReport, Snapshot, SpecialToken, TokenId, Vocab};

/// Sentences the default tokenizer is bootstrapped with.
pub const SAMPLE_TEXTS: [&str; 5] = [
    "Hello world! This is a sample text for the custom tokenizer.",
    "The quick brown fox jumps over the lazy dog.",
    "Machine learning and natural language processing are fascinating fields.",
    "Tokenization is the process of breaking text into smaller units called tokens.",
    "Our custom tokenizer learns vocabulary from the text it processes.",
];

/// Self-updating subword tokenizer.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    vocab: Vocab,
    codec: Codec,
}

impl Tokenizer {
    /// Create a tokenizer with an empty vocabulary.
    pub fn new(config: TokenizerConfig) -> Self {
        Self {
            vocab: Vocab::new(),
            codec: Codec::new(Learner::new(config)),
        }
    }

    /// Special tokens, printable ASCII, then the built-in sample sentences.
    pub fn with_defaults() -> Self {
        Self::with_defaults_config(TokenizerConfig::default())
    }

    /// Same bootstrap as [`Tokenizer::with_defaults`] under `config`.
    pub fn with_defaults_config(config: TokenizerConfig) -> Self {
        let mut tokenizer = Self::new(config);
        tokenizer.initialize_special_tokens();
        tokenizer.initialize_basic_vocab();
        tokenizer.train(&SAMPLE_TEXTS);
        tokenizer
    }

    /// Build a tokenizer around an existing vocabulary.
    pub fn from_vocab(vocab: Vocab, config: TokenizerConfig) -> Self {
        Self {
            vocab,
            codec: Codec::new(Learner::new(config)),
        }
    }

    pub fn config(&self) -> &TokenizerConfig {
        self.codec.learner().config()
    }

    pub fn vocab(&self) -> &Vocab {
        &self.vocab
    }

    pub fn initialize_special_tokens(&mut self) {
        self.vocab.initialize_special_tokens();
    }

    pub fn initialize_basic_vocab(&mut self) {
        self.vocab.initialize_basic_vocab();
    }

    /// Learn from each string in order.
    pub fn train<S: AsRef<str> + Sync>(&mut self, corpus: &[S]) -> usize {
        self.codec.learner().train(&mut self.vocab, corpus)
    }

    pub fn learn(&mut self, text: &str) -> usize {
        self.codec.learner().learn(&mut self.vocab, text)
    }

    pub fn encode(&mut self, text: &str) -> Vec<TokenId> {
        self.codec.encode(&mut self.vocab, text)
    }

    pub fn encode_unknown(&mut self, piece: &str) -> Vec<TokenId> {
        self.codec.encode_unknown(&mut self.vocab, piece)
    }

    pub fn decode(&self, ids: &[TokenId]) -> String {
        self.codec.decode(&self.vocab, ids)
    }

    pub fn token_details(&mut self, text: &str) -> Vec<Token> {
        self.codec.token_details(&mut self.vocab, text)
    }

    /// Encode `text` and summarize the resulting tokens.
    pub fn token_stats(&mut self, text: &str) -> TokenStats {
        TokenStats::from_tokens(&self.token_details(text))
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    /// Id → text for every entry, in ascending id order.
    pub fn vocabulary(&self) -> &BTreeMap<TokenId, String> {
        self.vocab.forward()
    }

    pub fn special_tokens(&self) -> &[SpecialToken] {
        self.vocab.special_tokens()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.vocab.snapshot()
    }

    pub fn restore(&mut self, snapshot: Snapshot) -> RestoreReport {
        self.vocab.restore(snapshot)
    }

    pub fn export_json(&self) -> Result<String> {
        self.vocab.to_json()
    }

    /// Replace the vocabulary from snapshot JSON, field by field.
    pub fn import_json(&mut self, json: &str) -> Result<RestoreReport> {
        self.vocab.restore_json(json)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.vocab.save(path)?;
        info!("Saved vocabulary ({} entries) to {}", self.vocab.len(), path.display());
        Ok(())
    }

    /// Load a saved vocabulary into a new tokenizer.
    pub fn load(path: &Path, config: TokenizerConfig) -> Result<Self> {
        let vocab = Vocab::load(path)?;
        info!("Loaded vocabulary ({} entries) from {}", vocab.len(), path.display());
        Ok(Self::from_vocab(vocab, config))
    }
}
