// Copyright (c) 2025 The Quill Project

//! Error types for the consensus core.

use displaydoc::Display;
use quill_transaction_core::WireError;

/// A parameter rejected by the builder.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ParameterError {
    /// emission speed factor `{0}` is outside [1, 64]
    EmissionSpeedFactor(u32),
    /// difficulty window `{0}` is below the minimum of 2
    DifficultyWindow(u64),
    /// upgrade voting threshold `{0}` is outside (0, 100]
    UpgradeVotingThreshold(u32),
    /// upgrade window must be non-zero
    UpgradeWindow,
}

impl std::error::Error for ParameterError {}

/// Reward computation failure.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum RewardError {
    /// block cumulative size `{0}` exceeds the limit of `{1}`
    BlockTooLarge(u64, u64),
}

impl std::error::Error for RewardError {}

/// Coinbase construction failure.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum MinerTxError {
    /// reward computation failed: {0}
    Reward(RewardError),
    /// max_outs must be at least 1
    InvalidMaxOuts,
    /// extra nonce of `{0}` bytes does not fit the extra field
    ExtraNonceTooLong(usize),
    /// outputs sum to `{got}`, expected the block reward `{expected}`
    RewardMismatch {
        /// The reward (plus governance share) the outputs must pay.
        expected: u64,
        /// What the constructed outputs actually sum to.
        got: u64,
    },
}

impl std::error::Error for MinerTxError {}

impl From<RewardError> for MinerTxError {
    fn from(err: RewardError) -> Self {
        Self::Reward(err)
    }
}

/// The embedded genesis coinbase failed to materialise.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum GenesisError {
    /// the genesis coinbase blob is not valid hex
    InvalidHex,
    /// the genesis coinbase blob failed to deserialize: {0}
    Wire(WireError),
}

impl std::error::Error for GenesisError {}

impl From<WireError> for GenesisError {
    fn from(err: WireError) -> Self {
        Self::Wire(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_carry_the_values() {
        let err = RewardError::BlockTooLarge(20_001, 20_000);
        assert!(err.to_string().contains("20001"));

        let err = MinerTxError::RewardMismatch {
            expected: 1_000,
            got: 900,
        };
        let text = err.to_string();
        assert!(text.contains("1000") && text.contains("900"));
    }

    #[test]
    fn reward_error_converts_into_miner_tx_error() {
        let err: MinerTxError = RewardError::BlockTooLarge(10, 5).into();
        assert_eq!(err, MinerTxError::Reward(RewardError::BlockTooLarge(10, 5)));
    }
}
