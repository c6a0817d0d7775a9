//! Lexigrow Tokenizer: a subword tokenizer that grows its own vocabulary.
//!
//! Every string the tokenizer encodes is also learned from, so the
//! vocabulary expands online instead of being fixed after training:
//!
//! - Words, whitespace runs and punctuation become entries as they are seen
//! - Word prefixes (up to 20 characters) and lower-cased bigrams are added
//!   so novel word forms can be segmented from known stems
//! - Unknown words are segmented greedily by longest known prefix
//! - Decoding concatenates entry texts, so `decode(encode(t)) == t`
//! - The vocabulary serializes to a JSON snapshot and can be restored from one
//!
//! ## Usage
//!
//! ```rust
//! use lexigrow_tokenizer::{Tokenizer, TokenizerConfig};
//!
//! let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
//! tokenizer.initialize_special_tokens();
//! tokenizer.train(&["the quick brown fox", "jumps over the lazy dog"]);
//!
//! let ids = tokenizer.encode("the quickest fox!");
//! assert_eq!(tokenizer.decode(&ids), "the quickest fox!");
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod learner;
pub mod segment;
pub mod stats;
pub mod tokenizer;
pub mod vocab;

#[cfg(feature = "python")]
pub mod python;

// Re-export main types
pub use codec::{Codec, Token};
pub use config::TokenizerConfig;
pub use error::{Result, TokenizerError};
pub use learner::Learner;
pub use stats::TokenStats;
pub use tokenizer::{Tokenizer, SAMPLE_TEXTS};
pub use vocab::{
    RestoreReport, Snapshot, SpecialToken, TokenId, Vocab, MAX_TOKEN_ID, SPECIAL_TOKENS, UNK_TOKEN,
};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python module entry point
#[cfg(feature = "python")]
#[pymodule]
fn lexigrow_tokenizer_rs(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<python::PyTokenizer>()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_pipeline() {
        // Seed → train → encode → decode → export → import
        let mut tokenizer = Tokenizer::new(TokenizerConfig::default().with_log_interval(2));
        tokenizer.initialize_special_tokens();
        tokenizer.initialize_basic_vocab();
        tokenizer.train(&[
            "the quick brown fox jumps over the lazy dog",
            "the quick brown fox jumps over the lazy dog",
            "unrelated words: subword tokenization!",
        ]);

        assert_eq!(tokenizer.special_tokens().len(), 5);
        assert_eq!(tokenizer.vocab().lookup_id("<UNK>"), Some(1));

        let text = "The  quickest fox, again\tand again.";
        let ids = tokenizer.encode(text);
        assert_eq!(tokenizer.decode(&ids), text);

        // Encoding again uses the same ids and learns nothing new
        let size = tokenizer.vocab_size();
        assert_eq!(tokenizer.encode(text), ids);
        assert_eq!(tokenizer.vocab_size(), size);

        let json = tokenizer.export_json().unwrap();
        let mut restored = Tokenizer::new(TokenizerConfig::default());
        let report = restored.import_json(&json).unwrap();
        assert!(report.skipped.is_empty());
        assert_eq!(restored.decode(&ids), text);
        assert_eq!(restored.vocab().next_id(), tokenizer.vocab().next_id());
    }

    #[test]
    fn test_stem_reuse_on_novel_form() {
        let config = TokenizerConfig::default().with_min_frequency(2);
        let mut tokenizer = Tokenizer::new(config);
        tokenizer.train(&["token token"]);

        // "tokenizer" is seen once, so it is segmented from the learned stem
        let ids = tokenizer.encode("tokenizer");
        assert_eq!(ids[0], tokenizer.vocab().lookup_id("token").unwrap());
        assert_eq!(tokenizer.decode(&ids), "tokenizer");
    }
}
