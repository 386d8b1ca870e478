// Copyright (c) 2025 The Quill Project

//! The genesis factory.
//!
//! Coinbase construction uses a random ephemeral key, but the genesis
//! block must be identical on every node, so its coinbase is pinned as a
//! hard-coded blob and only the surrounding block is materialised here.

use crate::{constants, ConsensusParameters, GenesisError};
use quill_transaction_core::{Block, Transaction};
use tracing::error;

/// The genesis block and its hash, materialised once at startup.
#[derive(Clone, Debug)]
pub struct Genesis {
    block: Block,
    hash: [u8; 32],
}

impl Genesis {
    /// Materialise the genesis block for `params` and cache its hash.
    pub fn new(params: &ConsensusParameters) -> Result<Self, GenesisError> {
        let block = params.generate_genesis_block()?;
        let hash = block.hash();
        Ok(Self { block, hash })
    }

    /// The genesis block.
    pub fn block(&self) -> &Block {
        &self.block
    }

    /// The cached genesis block hash.
    pub fn hash(&self) -> [u8; 32] {
        self.hash
    }
}

impl ConsensusParameters {
    /// Decode the embedded coinbase blob and wrap it in the genesis
    /// block.
    pub fn generate_genesis_block(&self) -> Result<Block, GenesisError> {
        let blob = hex::decode(constants::GENESIS_COINBASE_TX_HEX).map_err(|_| {
            error!("failed to parse coinbase tx from hard coded blob");
            GenesisError::InvalidHex
        })?;
        let base_transaction = Transaction::from_bytes(&blob).map_err(|err| {
            error!("failed to parse coinbase tx from hard coded blob");
            GenesisError::from(err)
        })?;

        let mut nonce = constants::GENESIS_NONCE;
        if self.testnet {
            nonce += 1;
        }

        Ok(Block {
            major_version: constants::BLOCK_MAJOR_VERSION_1,
            minor_version: constants::BLOCK_MINOR_VERSION_0,
            timestamp: 0,
            nonce,
            base_transaction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_transaction_core::{TxInput, WireError};

    #[test]
    fn genesis_block_has_the_pinned_shape() {
        let params = ConsensusParameters::mainnet();
        let block = params.generate_genesis_block().unwrap();

        assert_eq!(block.major_version, constants::BLOCK_MAJOR_VERSION_1);
        assert_eq!(block.minor_version, constants::BLOCK_MINOR_VERSION_0);
        assert_eq!(block.timestamp, 0);
        assert_eq!(block.nonce, constants::GENESIS_NONCE);

        let coinbase = &block.base_transaction;
        assert_eq!(coinbase.version, 1);
        assert_eq!(
            coinbase.unlock_time,
            constants::MINED_MONEY_UNLOCK_WINDOW as u64
        );
        assert_eq!(coinbase.inputs.len(), 1);
        assert!(matches!(
            coinbase.inputs[0],
            TxInput::Base(base) if base.block_index == 0
        ));
        assert_eq!(coinbase.outputs.len(), 1);
        assert_eq!(
            coinbase.outputs[0].amount,
            constants::MONEY_SUPPLY >> constants::EMISSION_SPEED_FACTOR
        );
    }

    #[test]
    fn testnet_genesis_differs_by_nonce() {
        let mainnet = ConsensusParameters::mainnet()
            .generate_genesis_block()
            .unwrap();
        let testnet = ConsensusParameters::testnet()
            .generate_genesis_block()
            .unwrap();

        assert_eq!(testnet.nonce, constants::GENESIS_NONCE + 1);
        assert_eq!(mainnet.base_transaction, testnet.base_transaction);
        assert_ne!(mainnet.hash(), testnet.hash());
    }

    #[test]
    fn materialised_genesis_caches_the_hash() {
        let params = ConsensusParameters::mainnet();
        let genesis = Genesis::new(&params).unwrap();
        assert_eq!(genesis.hash(), genesis.block().hash());

        // Two materialisations agree bit for bit.
        let again = Genesis::new(&params).unwrap();
        assert_eq!(genesis.hash(), again.hash());
    }

    #[test]
    fn wire_failures_surface_as_genesis_errors() {
        let err: GenesisError = WireError::UnexpectedEof.into();
        assert_eq!(err, GenesisError::Wire(WireError::UnexpectedEof));
    }
}
