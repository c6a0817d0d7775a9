//! Summary statistics over one encode result.

use serde::Serialize;
use std::collections::HashSet;

use crate::codec::Token;

/// Counts and length extremes for a token sequence.
///
/// Lengths are in characters. Ties for shortest/longest keep the earliest token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenStats {
    pub total_tokens: usize,
    pub unique_tokens: usize,
    pub avg_token_length: f64,
    pub shortest_token: Option<Token>,
    pub longest_token: Option<Token>,
}

impl TokenStats {
    pub fn from_tokens(tokens: &[Token]) -> Self {
        let unique: HashSet<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        let total_len: usize = tokens.iter().map(|t| t.text.chars().count()).sum();
        let avg_token_length = if tokens.is_empty() {
            0.0
        } else {
            total_len as f64 / tokens.len() as f64
        };

        let mut shortest: Option<(&Token, usize)> = None;
        let mut longest: Option<(&Token, usize)> = None;
        for token in tokens {
            let len = token.text.chars().count();
            if shortest.map_or(true, |(_, best)| len < best) {
                shortest = Some((token, len));
            }
            if longest.map_or(true, |(_, best)| len > best) {
                longest = Some((token, len));
            }
        }

        Self {
            total_tokens: tokens.len(),
            unique_tokens: unique.len(),
            avg_token_length,
            shortest_token: shortest.map(|(t, _)| t.clone()),
            longest_token: longest.map(|(t, _)| t.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(id: u32, text: &str, index: usize) -> Token {
        Token {
            id,
            text: text.to_string(),
            index,
        }
    }

    #[test]
    fn test_stats_empty() {
        let stats = TokenStats::from_tokens(&[]);
        assert_eq!(stats.total_tokens, 0);
        assert_eq!(stats.unique_tokens, 0);
        assert_eq!(stats.avg_token_length, 0.0);
        assert!(stats.shortest_token.is_none());
        assert!(stats.longest_token.is_none());
    }

    #[test]
    fn test_stats_counts_and_extremes() {
        let tokens = vec![
            token(10, "the", 0),
            token(11, " ", 1),
            token(12, "cat", 2),
            token(11, " ", 3),
            token(13, "sat", 4),
            token(14, "!", 5),
        ];
        let stats = TokenStats::from_tokens(&tokens);

        assert_eq!(stats.total_tokens, 6);
        assert_eq!(stats.unique_tokens, 5);
        assert!((stats.avg_token_length - 12.0 / 6.0).abs() < 1e-9);
        assert_eq!(stats.shortest_token.unwrap().index, 1);
        assert_eq!(stats.longest_token.unwrap().text, "the");
    }
}
