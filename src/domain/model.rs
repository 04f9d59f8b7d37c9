use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Group of file paths bundled together and their total size in bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct PathsChunk(pub Vec<PathBuf>, pub u64);

/// Winstons charged for the first 256 KiB block and for each further block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTerms {
    pub base: u64,
    pub incremental: u64,
}

impl PriceTerms {
    pub fn new(base: u64, incremental: u64) -> Self {
        Self { base, incremental }
    }

    /// Reward for `blocks` blocks; anything under one block pays the base.
    pub fn reward_for_blocks(&self, blocks: u64) -> u64 {
        self.base + self.incremental * blocks.saturating_sub(1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OraclePrice {
    pub arweave: OraclePricePair,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OraclePricePair {
    pub usd: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reward_for_blocks() {
        let terms = PriceTerms::new(100, 10);
        assert_eq!(terms.reward_for_blocks(0), 100);
        assert_eq!(terms.reward_for_blocks(1), 100);
        assert_eq!(terms.reward_for_blocks(4), 130);
    }

    #[test]
    fn test_oracle_price_parse() {
        let price: OraclePrice = serde_json::from_str(r#"{"arweave":{"usd":5.42}}"#).unwrap();
        assert!((price.arweave.usd - 5.42).abs() < f64::EPSILON);
    }
}
