use pyo3::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::TokenizerConfig;
use crate::tokenizer::Tokenizer;
use crate::vocab::TokenId;

fn io_err(e: crate::TokenizerError) -> PyErr {
    pyo3::exceptions::PyIOError::new_err(e.to_string())
}

/// Python wrapper for the self-updating tokenizer
#[pyclass(name = "Tokenizer", module = "lexigrow_tokenizer_rs")]
pub struct PyTokenizer {
    pub(crate) inner: Tokenizer,
}

#[pymethods]
impl PyTokenizer {
    #[new]
    #[pyo3(signature = (min_frequency=1, max_token_length=20, defaults=true))]
    pub fn new(min_frequency: usize, max_token_length: usize, defaults: bool) -> Self {
        let config = TokenizerConfig::default()
            .with_min_frequency(min_frequency)
            .with_max_token_length(max_token_length);
        let inner = if defaults {
            Tokenizer::with_defaults_config(config)
        } else {
            Tokenizer::new(config)
        };
        Self { inner }
    }

    /// Learn from each string in order
    pub fn train(&mut self, corpus: Vec<String>) -> usize {
        self.inner.train(&corpus)
    }

    /// Encode text to a list of token IDs (grows the vocabulary)
    pub fn encode(&mut self, text: &str) -> Vec<TokenId> {
        self.inner.encode(text)
    }

    /// Decode a list of token IDs to a string
    pub fn decode(&self, ids: Vec<TokenId>) -> String {
        self.inner.decode(&ids)
    }

    /// Encode text and return (id, text, index) triples
    pub fn token_details(&mut self, text: &str) -> Vec<(TokenId, String, usize)> {
        self.inner
            .token_details(text)
            .into_iter()
            .map(|t| (t.id, t.text, t.index))
            .collect()
    }

    pub fn vocabulary(&self) -> BTreeMap<TokenId, String> {
        self.inner.vocabulary().clone()
    }

    pub fn special_tokens(&self) -> Vec<(String, TokenId)> {
        self.inner
            .special_tokens()
            .iter()
            .map(|st| (st.token.clone(), st.id))
            .collect()
    }

    /// Export the vocabulary snapshot as JSON
    pub fn export_json(&self) -> PyResult<String> {
        self.inner.export_json().map_err(io_err)
    }

    /// Replace the vocabulary from snapshot JSON; returns skipped field names
    pub fn import_json(&mut self, json: &str) -> PyResult<Vec<String>> {
        let report = self.inner.import_json(json).map_err(io_err)?;
        Ok(report.skipped.into_iter().map(String::from).collect())
    }

    /// Save vocab to a JSON file
    pub fn save(&self, path: &str) -> PyResult<()> {
        self.inner.save(Path::new(path)).map_err(io_err)
    }

    /// Load vocab from a JSON file
    #[staticmethod]
    #[pyo3(signature = (path, min_frequency=1, max_token_length=20))]
    pub fn load(path: &str, min_frequency: usize, max_token_length: usize) -> PyResult<Self> {
        let config = TokenizerConfig::default()
            .with_min_frequency(min_frequency)
            .with_max_token_length(max_token_length);
        let inner = Tokenizer::load(Path::new(path), config).map_err(io_err)?;
        Ok(Self { inner })
    }

    pub fn __len__(&self) -> usize {
        self.inner.vocab_size()
    }
}
