//! Tunable knobs shared by the learner and the codec.

use serde::{Deserialize, Serialize};

/// Configuration for vocabulary learning and segmentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Minimum occurrence count for a piece or bigram to enter the vocabulary
    pub min_frequency: usize,
    /// Longest prefix learned per word, and longest match tried when segmenting
    pub max_token_length: usize,
    /// Log training progress every N corpus strings (0 = silent)
    pub log_interval: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            min_frequency: 1,
            max_token_length: 20,
            log_interval: 0,
        }
    }
}

impl TokenizerConfig {
    /// Set minimum frequency
    pub fn with_min_frequency(mut self, min_frequency: usize) -> Self {
        self.min_frequency = min_frequency;
        self
    }

    /// Set maximum token length
    pub fn with_max_token_length(mut self, max_token_length: usize) -> Self {
        self.max_token_length = max_token_length;
        self
    }

    /// Set training log interval
    pub fn with_log_interval(mut self, log_interval: usize) -> Self {
        self.log_interval = log_interval;
        self
    }
}
