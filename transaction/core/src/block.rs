// Copyright (c) 2025 The Quill Project

//! The block type.
//!
//! Only the fields the consensus core reads are modelled here; everything
//! else a full block carries (transaction hashes, parent id) is owned by
//! the ledger.

use crate::tx::Transaction;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A block header plus its coinbase transaction.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Block {
    /// Consensus-rule version; bumped at hard forks.
    pub major_version: u8,
    /// Soft-fork voting field.
    pub minor_version: u8,
    /// Block timestamp (unix seconds).
    pub timestamp: u64,
    /// PoW nonce.
    pub nonce: u32,
    /// The coinbase transaction paying this block's rewards.
    pub base_transaction: Transaction,
}

impl Block {
    /// The block hash: SHA-256 over the header fields and the coinbase
    /// transaction hash.
    pub fn hash(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update([self.major_version]);
        hasher.update([self.minor_version]);
        hasher.update(self.timestamp.to_le_bytes());
        hasher.update(self.nonce.to_le_bytes());
        hasher.update(self.base_transaction.hash());
        hasher.finalize().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_block() -> Block {
        Block {
            major_version: 1,
            minor_version: 0,
            timestamp: 0,
            nonce: 70,
            base_transaction: Transaction::default(),
        }
    }

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(sample_block().hash(), sample_block().hash());
    }

    #[test]
    fn hash_covers_the_nonce() {
        let block = sample_block();
        let mut other = block.clone();
        other.nonce += 1;
        assert_ne!(block.hash(), other.hash());
    }

    #[test]
    fn hash_covers_the_coinbase() {
        let block = sample_block();
        let mut other = block.clone();
        other.base_transaction.unlock_time = 99;
        assert_ne!(block.hash(), other.hash());
    }
}
