// Copyright (c) 2025 The Quill Project

//! Proof-of-work verification.
//!
//! The PoW hash itself comes from the caller (it needs a memory-hard hash
//! context the core does not own); this module only checks the hash
//! against the difficulty target.

use crate::{constants, ConsensusParameters};
use quill_transaction_core::Block;
use tracing::error;

/// Whether `hash`, read as a 256-bit little-endian integer, satisfies
/// `hash * difficulty < 2^256`.
pub fn check_hash(hash: &[u8; 32], difficulty: u64) -> bool {
    // Limb-by-limb multiply; the proof fails iff the product carries out
    // of 256 bits.
    let mut carry = 0u128;
    for limb_index in 0..4 {
        let mut limb_bytes = [0u8; 8];
        limb_bytes.copy_from_slice(&hash[limb_index * 8..(limb_index + 1) * 8]);
        let limb = u64::from_le_bytes(limb_bytes);
        let product = limb as u128 * difficulty as u128 + carry;
        carry = product >> 64;
    }
    carry == 0
}

impl ConsensusParameters {
    /// Check a block's proof of work against `current_difficulty`.
    ///
    /// `longhash` computes the PoW hash of a block (returning `None` when
    /// the hasher rejects its input). On success the PoW hash is returned
    /// for caching.
    pub fn check_proof_of_work<F>(
        &self,
        block: &Block,
        current_difficulty: u64,
        longhash: F,
    ) -> Option<[u8; 32]>
    where
        F: Fn(&Block) -> Option<[u8; 32]>,
    {
        match block.major_version {
            constants::BLOCK_MAJOR_VERSION_1 | constants::BLOCK_MAJOR_VERSION_2 => {
                let proof_of_work = longhash(block)?;
                check_hash(&proof_of_work, current_difficulty).then_some(proof_of_work)
            }
            other => {
                error!(
                    "unknown block major version: {other}.{}",
                    block.minor_version
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_transaction_core::Transaction;

    fn block(major_version: u8) -> Block {
        Block {
            major_version,
            minor_version: 0,
            timestamp: 0,
            nonce: 0,
            base_transaction: Transaction::default(),
        }
    }

    #[test]
    fn difficulty_one_accepts_any_hash() {
        assert!(check_hash(&[0xff; 32], 1));
        assert!(check_hash(&[0x00; 32], 1));
    }

    #[test]
    fn maximal_hash_fails_difficulty_two() {
        assert!(!check_hash(&[0xff; 32], 2));
    }

    #[test]
    fn carry_boundary_is_exact() {
        // Top limb 2^63: times two is exactly 2^256 -- out of range.
        let mut hash = [0u8; 32];
        hash[31] = 0x80;
        assert!(!check_hash(&hash, 2));

        // One less is in range.
        let mut hash = [0xffu8; 32];
        hash[31] = 0x7f;
        assert!(check_hash(&hash, 2));
    }

    #[test]
    fn proof_of_work_round_trip() {
        let params = ConsensusParameters::mainnet();
        let easy_hash = [0u8; 32];
        let result = params.check_proof_of_work(&block(1), u64::MAX, |_| Some(easy_hash));
        assert_eq!(result, Some(easy_hash));

        let result = params.check_proof_of_work(&block(2), 1_000_000, |_| Some([0xff; 32]));
        assert_eq!(result, None);
    }

    #[test]
    fn hasher_failure_propagates() {
        let params = ConsensusParameters::mainnet();
        assert_eq!(params.check_proof_of_work(&block(1), 1, |_| None), None);
    }

    #[test]
    fn unknown_version_is_rejected() {
        let params = ConsensusParameters::mainnet();
        let result = params.check_proof_of_work(&block(3), 1, |_| Some([0u8; 32]));
        assert_eq!(result, None);
    }
}
