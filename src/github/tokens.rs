// Credential pool with round-robin rotation.
// Spreads request-rate budget across several GitHub tokens.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{MinerError, Result};

/// Pick the credential for `cursor` and return it with the advanced cursor.
pub fn next_credential(pool: &[String], cursor: usize) -> Result<(&str, usize)> {
    if pool.is_empty() {
        return Err(MinerError::Configuration(
            "credential pool is empty".to_string(),
        ));
    }
    let token = &pool[cursor % pool.len()];
    Ok((token.as_str(), cursor.wrapping_add(1)))
}

/// Ordered, non-empty set of bearer tokens with a shared cursor.
#[derive(Debug)]
pub struct TokenPool {
    tokens: Vec<String>,
    cursor: AtomicUsize,
}

impl TokenPool {
    /// Build a pool, rejecting an empty or blank-only token list.
    pub fn new(tokens: Vec<String>) -> Result<Self> {
        let tokens: Vec<String> = tokens
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        if tokens.is_empty() {
            return Err(MinerError::Configuration(
                "no GitHub token supplied (use --token, GITHUB_TOKENS or GITHUB_TOKEN)"
                    .to_string(),
            ));
        }

        Ok(Self {
            tokens,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Resolve tokens from CLI flags first, then `GITHUB_TOKENS`, then `GITHUB_TOKEN`.
    pub fn resolve(
        cli_tokens: Vec<String>,
        env_tokens: Option<String>,
        env_token: Option<String>,
    ) -> Result<Self> {
        if !cli_tokens.is_empty() {
            return Self::new(cli_tokens);
        }
        if let Some(list) = env_tokens.filter(|s| !s.trim().is_empty()) {
            return Self::new(list.split(',').map(str::to_string).collect());
        }
        Self::new(env_token.into_iter().collect())
    }

    /// Create a pool from the process environment, with CLI tokens taking priority.
    pub fn from_env(cli_tokens: Vec<String>) -> Result<Self> {
        Self::resolve(
            cli_tokens,
            std::env::var("GITHUB_TOKENS").ok(),
            std::env::var("GITHUB_TOKEN").ok(),
        )
    }

    /// Number of tokens in the pool.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Take the next credential in round-robin order.
    pub fn next_credential(&self) -> &str {
        let cursor = self.cursor.fetch_add(1, Ordering::Relaxed);
        // Non-empty is enforced by `new`.
        &self.tokens[cursor % self.tokens.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("tok{}", i)).collect()
    }

    #[test]
    fn test_next_credential_wraps() {
        let tokens = tokens(3);
        let (t, c) = next_credential(&tokens, 0).unwrap();
        assert_eq!((t, c), ("tok0", 1));
        let (t, c) = next_credential(&tokens, 5).unwrap();
        assert_eq!((t, c), ("tok2", 6));
    }

    #[test]
    fn test_next_credential_empty_pool() {
        let err = next_credential(&[], 0).unwrap_err();
        assert!(matches!(err, MinerError::Configuration(_)));
    }

    #[test]
    fn test_round_robin_visits_each_twice() {
        for n in 1..=5 {
            let pool = TokenPool::new(tokens(n)).unwrap();
            let seen: Vec<String> = (0..2 * n)
                .map(|_| pool.next_credential().to_string())
                .collect();

            for (i, token) in seen.iter().enumerate() {
                assert_eq!(token, &format!("tok{}", i % n));
            }
            for i in 0..n {
                let name = format!("tok{}", i);
                assert_eq!(seen.iter().filter(|t| **t == name).count(), 2);
            }
        }
    }

    #[test]
    fn test_blank_tokens_rejected() {
        let err = TokenPool::new(vec!["".into(), "  ".into()]).unwrap_err();
        assert!(matches!(err, MinerError::Configuration(_)));
    }

    #[test]
    fn test_resolve_priority() {
        let pool = TokenPool::resolve(
            vec!["cli".into()],
            Some("a,b".into()),
            Some("single".into()),
        )
        .unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.next_credential(), "cli");

        let pool = TokenPool::resolve(vec![], Some("a, b,".into()), Some("single".into())).unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.next_credential(), "a");
        assert_eq!(pool.next_credential(), "b");

        let pool = TokenPool::resolve(vec![], None, Some("single".into())).unwrap();
        assert_eq!(pool.next_credential(), "single");

        assert!(TokenPool::resolve(vec![], None, None).is_err());
    }
}
