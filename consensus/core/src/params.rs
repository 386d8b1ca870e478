// Copyright (c) 2025 The Quill Project

//! The consensus parameter bundle and its builder.
//!
//! [`ConsensusParameters`] is constructed once through
//! [`ConsensusParametersBuilder`], which validates eagerly, and is frozen
//! after [`build`](ConsensusParametersBuilder::build). Hosts share it by
//! reference (or `Arc`); nothing in this crate mutates it.

use crate::{constants, ParameterError};
use quill_account_keys::ADDRESS_PREFIX;
use quill_transaction_core::amount;
use serde::{Deserialize, Serialize};

/// The immutable bundle of numeric consensus constants.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ConsensusParameters {
    /// Asymptotic maximum coin count, in atomic units.
    pub money_supply: u64,
    /// Right-shift applied to the unissued supply per block; in [1, 64].
    pub emission_speed_factor: u32,
    /// Floor on the per-block subsidy.
    pub tail_emission_reward: u64,
    /// Coin revision; revision 1 also size-penalises fees.
    pub coin_version: u8,
    /// Window over which the block size median is taken.
    pub reward_blocks_window: u32,
    /// Blocks up to this size earn the full reward regardless of median.
    pub block_granted_full_reward_zone: u64,
    /// Bytes reserved for the coinbase in a block template.
    pub miner_tx_blob_reserved_size: u64,
    /// Hard cap on block height.
    pub max_block_number: u32,
    /// Hard cap on a serialized block.
    pub max_block_blob_size: u64,
    /// Hard cap on a serialized transaction.
    pub max_tx_size: u64,
    /// Base of the height-dependent maximum block size.
    pub max_block_size_initial: u64,
    /// Maximum block size growth per height: numerator.
    pub max_block_size_growth_num: u64,
    /// Maximum block size growth per height: denominator.
    pub max_block_size_growth_den: u64,
    /// Blocks a coinbase output stays locked.
    pub mined_money_unlock_window: u32,
    /// Blocks sampled for the timestamp median check.
    pub timestamp_check_window: u32,
    /// Seconds a block timestamp may lie in the future.
    pub block_future_time_limit: u64,
    /// Blocks per day at the target rate.
    pub expected_blocks_per_day: u64,
    /// Seconds a transaction lives in the pool before eviction.
    pub mempool_tx_live_time: u64,
    /// Intended mean seconds between blocks.
    pub difficulty_target: u64,
    /// Sliding window for the legacy retarget; at least 2.
    pub difficulty_window: u64,
    /// Outliers trimmed from each end of the sorted legacy window.
    pub difficulty_cut: u64,
    /// Most-recent blocks excluded from the legacy window.
    pub difficulty_lag: u64,
    /// Difficulty floor and the v2 retarget fallback.
    pub default_difficulty: u64,
    /// When nonzero, overrides every retarget. Debug scenarios only.
    pub fixed_difficulty: u64,
    /// Solve time beyond which the CLIF emergency path activates.
    pub clif_threshold: u64,
    /// Height at which the version-2 consensus rules activate.
    pub upgrade_height_v2: u32,
    /// Percentage of votes required to schedule an upgrade; in (0, 100].
    pub upgrade_voting_threshold: u32,
    /// Blocks over which upgrade votes are counted.
    pub upgrade_voting_window: u32,
    /// Blocks between a scheduled upgrade and its activation; nonzero.
    pub upgrade_window: u32,
    /// Share of the base reward diverted to governance, in percent.
    pub governance_percent: u8,
    /// First height of the governance window.
    pub governance_height_start: u32,
    /// Last height of the governance window.
    pub governance_height_end: u32,
    /// Maximum serialized size of a fusion transaction.
    pub fusion_tx_max_size: u64,
    /// Minimum inputs a fusion transaction must consolidate.
    pub fusion_tx_min_input_count: u64,
    /// Minimum ratio of inputs to outputs in a fusion transaction.
    pub fusion_tx_min_in_out_ratio: u64,
    /// Minimum ring size.
    pub min_mixin: u64,
    /// Maximum ring size.
    pub max_mixin: u64,
    /// Flat minimum transaction fee.
    pub minimum_fee: u64,
    /// Outputs below this are dust for fusion purposes.
    pub default_dust_threshold: u64,
    /// Decimal places in the display form.
    pub number_of_decimal_places: u8,
    /// The display divisor, `10^number_of_decimal_places`.
    pub coin: u64,
    /// The address string prefix.
    pub public_address_prefix: String,
    /// On-disk name of the block store.
    pub blocks_filename: String,
    /// On-disk name of the block cache.
    pub blocks_cache_filename: String,
    /// On-disk name of the height index.
    pub block_indexes_filename: String,
    /// On-disk name of the persisted transaction pool.
    pub tx_pool_filename: String,
    /// On-disk name of the auxiliary blockchain indices.
    pub blockchain_indices_filename: String,
    /// Whether this is a testnet parameter set.
    pub testnet: bool,
}

impl ConsensusParameters {
    /// Start a builder seeded with the mainnet constants.
    pub fn builder() -> ConsensusParametersBuilder {
        ConsensusParametersBuilder::new()
    }

    /// The mainnet parameter set.
    pub fn mainnet() -> Self {
        Self::builder().build()
    }

    /// The testnet parameter set.
    pub fn testnet() -> Self {
        Self::builder().testnet(true).build()
    }

    /// Format an amount with this coin's decimal places.
    pub fn format_amount(&self, amount: u64) -> String {
        amount::format_amount(amount, self.number_of_decimal_places as usize)
    }

    /// Format a signed amount with this coin's decimal places.
    pub fn format_signed_amount(&self, amount: i64) -> String {
        amount::format_signed_amount(amount, self.number_of_decimal_places as usize)
    }

    /// Parse an amount string with this coin's decimal places.
    pub fn parse_amount(&self, input: &str) -> Option<u64> {
        amount::parse_amount(input, self.number_of_decimal_places as usize)
    }

    /// The activation height of `major_version`, or `u32::MAX` for
    /// versions with no scheduled fork.
    pub fn upgrade_height(&self, major_version: u8) -> u32 {
        if major_version == constants::BLOCK_MAJOR_VERSION_2 {
            self.upgrade_height_v2
        } else {
            u32::MAX
        }
    }

    /// The full-reward zone for a block version.
    ///
    /// All versions currently share one zone; the version argument is the
    /// seam future forks adjust.
    pub fn block_granted_full_reward_zone_by_version(&self, _major_version: u8) -> u64 {
        self.block_granted_full_reward_zone
    }

    /// The minimal fee a relayed transaction must pay.
    pub fn minimal_fee(&self) -> u64 {
        self.minimum_fee
    }
}

/// Builder for [`ConsensusParameters`].
///
/// Setters that guard an invariant validate eagerly and fail with
/// [`ParameterError`]; the rest are plain assignments.
#[derive(Clone, Debug)]
pub struct ConsensusParametersBuilder {
    params: ConsensusParameters,
}

impl Default for ConsensusParametersBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsensusParametersBuilder {
    /// A builder seeded with the mainnet constants.
    pub fn new() -> Self {
        let mut builder = Self {
            params: ConsensusParameters {
                money_supply: constants::MONEY_SUPPLY,
                emission_speed_factor: constants::EMISSION_SPEED_FACTOR,
                tail_emission_reward: constants::TAIL_EMISSION_REWARD,
                coin_version: constants::COIN_VERSION,
                reward_blocks_window: constants::REWARD_BLOCKS_WINDOW,
                block_granted_full_reward_zone: constants::BLOCK_GRANTED_FULL_REWARD_ZONE,
                miner_tx_blob_reserved_size: constants::COINBASE_BLOB_RESERVED_SIZE,
                max_block_number: constants::MAX_BLOCK_NUMBER,
                max_block_blob_size: constants::MAX_BLOCK_BLOB_SIZE,
                max_tx_size: constants::MAX_TX_SIZE,
                max_block_size_initial: constants::MAX_BLOCK_SIZE_INITIAL,
                max_block_size_growth_num: constants::MAX_BLOCK_SIZE_GROWTH_SPEED_NUMERATOR,
                max_block_size_growth_den: constants::MAX_BLOCK_SIZE_GROWTH_SPEED_DENOMINATOR,
                mined_money_unlock_window: constants::MINED_MONEY_UNLOCK_WINDOW,
                timestamp_check_window: constants::BLOCKCHAIN_TIMESTAMP_CHECK_WINDOW,
                block_future_time_limit: constants::BLOCK_FUTURE_TIME_LIMIT,
                expected_blocks_per_day: constants::EXPECTED_NUMBER_OF_BLOCKS_PER_DAY,
                mempool_tx_live_time: constants::MEMPOOL_TX_LIVE_TIME,
                difficulty_target: constants::DIFFICULTY_TARGET,
                difficulty_window: constants::DIFFICULTY_WINDOW,
                difficulty_cut: constants::DIFFICULTY_CUT,
                difficulty_lag: constants::DIFFICULTY_LAG,
                default_difficulty: constants::DEFAULT_DIFFICULTY,
                fixed_difficulty: 0,
                clif_threshold: constants::CLIF_THRESHOLD,
                upgrade_height_v2: constants::UPGRADE_HEIGHT_V2,
                upgrade_voting_threshold: constants::UPGRADE_VOTING_THRESHOLD,
                upgrade_voting_window: constants::UPGRADE_VOTING_WINDOW,
                upgrade_window: constants::UPGRADE_WINDOW,
                governance_percent: constants::GOVERNANCE_PERCENT,
                governance_height_start: constants::GOVERNANCE_HEIGHT_START,
                governance_height_end: constants::GOVERNANCE_HEIGHT_END,
                fusion_tx_max_size: constants::FUSION_TX_MAX_SIZE,
                fusion_tx_min_input_count: constants::FUSION_TX_MIN_INPUT_COUNT,
                fusion_tx_min_in_out_ratio: constants::FUSION_TX_MIN_IN_OUT_COUNT_RATIO,
                min_mixin: constants::MIN_TX_MIXIN_SIZE,
                max_mixin: constants::MAX_TX_MIXIN_SIZE,
                minimum_fee: constants::MINIMUM_FEE,
                default_dust_threshold: constants::DEFAULT_DUST_THRESHOLD,
                number_of_decimal_places: 0,
                coin: 1,
                public_address_prefix: ADDRESS_PREFIX.to_string(),
                blocks_filename: constants::BLOCKS_FILENAME.to_string(),
                blocks_cache_filename: constants::BLOCKS_CACHE_FILENAME.to_string(),
                block_indexes_filename: constants::BLOCK_INDEXES_FILENAME.to_string(),
                tx_pool_filename: constants::TX_POOL_FILENAME.to_string(),
                blockchain_indices_filename: constants::BLOCKCHAIN_INDICES_FILENAME.to_string(),
                testnet: false,
            },
        };
        builder = builder.number_of_decimal_places(constants::DISPLAY_DECIMAL_POINT);
        builder
    }

    /// Set the emission speed factor; must be in [1, 64].
    pub fn emission_speed_factor(mut self, value: u32) -> Result<Self, ParameterError> {
        if value == 0 || value > 64 {
            return Err(ParameterError::EmissionSpeedFactor(value));
        }
        self.params.emission_speed_factor = value;
        Ok(self)
    }

    /// Set the legacy retarget window; must be at least 2.
    pub fn difficulty_window(mut self, value: u64) -> Result<Self, ParameterError> {
        if value < 2 {
            return Err(ParameterError::DifficultyWindow(value));
        }
        self.params.difficulty_window = value;
        Ok(self)
    }

    /// Set the upgrade voting threshold; must be in (0, 100].
    pub fn upgrade_voting_threshold(mut self, value: u32) -> Result<Self, ParameterError> {
        if value == 0 || value > 100 {
            return Err(ParameterError::UpgradeVotingThreshold(value));
        }
        self.params.upgrade_voting_threshold = value;
        Ok(self)
    }

    /// Set the upgrade window; must be non-zero.
    pub fn upgrade_window(mut self, value: u32) -> Result<Self, ParameterError> {
        if value == 0 {
            return Err(ParameterError::UpgradeWindow);
        }
        self.params.upgrade_window = value;
        Ok(self)
    }

    /// Set the number of decimal places and the derived coin divisor.
    pub fn number_of_decimal_places(mut self, value: u8) -> Self {
        self.params.number_of_decimal_places = value;
        self.params.coin = 1;
        for _ in 0..value {
            self.params.coin *= 10;
        }
        self
    }

    /// Set the asymptotic money supply.
    pub fn money_supply(mut self, value: u64) -> Self {
        self.params.money_supply = value;
        self
    }

    /// Set the tail emission floor.
    pub fn tail_emission_reward(mut self, value: u64) -> Self {
        self.params.tail_emission_reward = value;
        self
    }

    /// Set the coin revision.
    pub fn coin_version(mut self, value: u8) -> Self {
        self.params.coin_version = value;
        self
    }

    /// Set the full-reward zone.
    pub fn block_granted_full_reward_zone(mut self, value: u64) -> Self {
        self.params.block_granted_full_reward_zone = value;
        self
    }

    /// Set the block size median window.
    pub fn reward_blocks_window(mut self, value: u32) -> Self {
        self.params.reward_blocks_window = value;
        self
    }

    /// Set the base of the maximum block size.
    pub fn max_block_size_initial(mut self, value: u64) -> Self {
        self.params.max_block_size_initial = value;
        self
    }

    /// Set the maximum block size growth numerator.
    pub fn max_block_size_growth_num(mut self, value: u64) -> Self {
        self.params.max_block_size_growth_num = value;
        self
    }

    /// Set the maximum block size growth denominator.
    pub fn max_block_size_growth_den(mut self, value: u64) -> Self {
        self.params.max_block_size_growth_den = value;
        self
    }

    /// Set the coinbase unlock window.
    pub fn mined_money_unlock_window(mut self, value: u32) -> Self {
        self.params.mined_money_unlock_window = value;
        self
    }

    /// Set the difficulty target, in seconds.
    pub fn difficulty_target(mut self, value: u64) -> Self {
        self.params.difficulty_target = value;
        self
    }

    /// Set the legacy retarget cut.
    pub fn difficulty_cut(mut self, value: u64) -> Self {
        self.params.difficulty_cut = value;
        self
    }

    /// Set the legacy retarget lag.
    pub fn difficulty_lag(mut self, value: u64) -> Self {
        self.params.difficulty_lag = value;
        self
    }

    /// Set the difficulty floor.
    pub fn default_difficulty(mut self, value: u64) -> Self {
        self.params.default_difficulty = value;
        self
    }

    /// Pin every retarget to a fixed value; zero disables the pin.
    pub fn fixed_difficulty(mut self, value: u64) -> Self {
        self.params.fixed_difficulty = value;
        self
    }

    /// Set the CLIF activation threshold, in seconds.
    pub fn clif_threshold(mut self, value: u64) -> Self {
        self.params.clif_threshold = value;
        self
    }

    /// Set the v2 hard fork height.
    pub fn upgrade_height_v2(mut self, value: u32) -> Self {
        self.params.upgrade_height_v2 = value;
        self
    }

    /// Set the governance share, in percent.
    pub fn governance_percent(mut self, value: u8) -> Self {
        self.params.governance_percent = value;
        self
    }

    /// Set the first height of the governance window.
    pub fn governance_height_start(mut self, value: u32) -> Self {
        self.params.governance_height_start = value;
        self
    }

    /// Set the last height of the governance window.
    pub fn governance_height_end(mut self, value: u32) -> Self {
        self.params.governance_height_end = value;
        self
    }

    /// Set the maximum fusion transaction size.
    pub fn fusion_tx_max_size(mut self, value: u64) -> Self {
        self.params.fusion_tx_max_size = value;
        self
    }

    /// Set the minimum fusion input count.
    pub fn fusion_tx_min_input_count(mut self, value: u64) -> Self {
        self.params.fusion_tx_min_input_count = value;
        self
    }

    /// Set the minimum fusion input-to-output ratio.
    pub fn fusion_tx_min_in_out_ratio(mut self, value: u64) -> Self {
        self.params.fusion_tx_min_in_out_ratio = value;
        self
    }

    /// Set the minimum ring size.
    pub fn min_mixin(mut self, value: u64) -> Self {
        self.params.min_mixin = value;
        self
    }

    /// Set the maximum ring size.
    pub fn max_mixin(mut self, value: u64) -> Self {
        self.params.max_mixin = value;
        self
    }

    /// Set the flat minimum fee.
    pub fn minimum_fee(mut self, value: u64) -> Self {
        self.params.minimum_fee = value;
        self
    }

    /// Set the dust threshold.
    pub fn default_dust_threshold(mut self, value: u64) -> Self {
        self.params.default_dust_threshold = value;
        self
    }

    /// Set the block store filename.
    pub fn blocks_filename(mut self, value: &str) -> Self {
        self.params.blocks_filename = value.to_string();
        self
    }

    /// Set the block cache filename.
    pub fn blocks_cache_filename(mut self, value: &str) -> Self {
        self.params.blocks_cache_filename = value.to_string();
        self
    }

    /// Set the height index filename.
    pub fn block_indexes_filename(mut self, value: &str) -> Self {
        self.params.block_indexes_filename = value.to_string();
        self
    }

    /// Set the transaction pool filename.
    pub fn tx_pool_filename(mut self, value: &str) -> Self {
        self.params.tx_pool_filename = value.to_string();
        self
    }

    /// Set the blockchain indices filename.
    pub fn blockchain_indices_filename(mut self, value: &str) -> Self {
        self.params.blockchain_indices_filename = value.to_string();
        self
    }

    /// Mark the parameter set as testnet.
    pub fn testnet(mut self, value: bool) -> Self {
        self.params.testnet = value;
        self
    }

    /// Freeze the parameters, applying testnet overrides.
    pub fn build(mut self) -> ConsensusParameters {
        if self.params.testnet {
            self.params.upgrade_height_v2 = 100;
            self.params.governance_percent = 10;
            self.params.governance_height_start = 1;
            self.params.governance_height_end = 100;
            for filename in [
                &mut self.params.blocks_filename,
                &mut self.params.blocks_cache_filename,
                &mut self.params.block_indexes_filename,
                &mut self.params.tx_pool_filename,
                &mut self.params.blockchain_indices_filename,
            ] {
                filename.insert_str(0, "testnet_");
            }
        }
        self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emission_speed_factor_bounds() {
        assert!(ConsensusParameters::builder().emission_speed_factor(0).is_err());
        assert!(ConsensusParameters::builder().emission_speed_factor(65).is_err());
        assert!(ConsensusParameters::builder().emission_speed_factor(1).is_ok());
        assert!(ConsensusParameters::builder().emission_speed_factor(64).is_ok());
    }

    #[test]
    fn difficulty_window_bounds() {
        assert_eq!(
            ConsensusParameters::builder()
                .difficulty_window(1)
                .unwrap_err(),
            ParameterError::DifficultyWindow(1)
        );
        assert!(ConsensusParameters::builder().difficulty_window(2).is_ok());
    }

    #[test]
    fn upgrade_voting_threshold_bounds() {
        assert!(ConsensusParameters::builder()
            .upgrade_voting_threshold(0)
            .is_err());
        assert!(ConsensusParameters::builder()
            .upgrade_voting_threshold(101)
            .is_err());
        assert!(ConsensusParameters::builder()
            .upgrade_voting_threshold(100)
            .is_ok());
    }

    #[test]
    fn upgrade_window_must_be_nonzero() {
        assert_eq!(
            ConsensusParameters::builder().upgrade_window(0).unwrap_err(),
            ParameterError::UpgradeWindow
        );
    }

    #[test]
    fn coin_divisor_tracks_decimal_places() {
        let params = ConsensusParameters::builder()
            .number_of_decimal_places(6)
            .build();
        assert_eq!(params.coin, 1_000_000);
        assert_eq!(params.number_of_decimal_places, 6);
    }

    #[test]
    fn mainnet_defaults_are_frozen_in() {
        let params = ConsensusParameters::mainnet();
        assert!(!params.testnet);
        assert_eq!(params.coin, 100_000_000);
        assert_eq!(params.blocks_filename, "blocks.bin");
        assert_eq!(params.upgrade_height_v2, crate::constants::UPGRADE_HEIGHT_V2);
    }

    #[test]
    fn testnet_overrides_apply_at_build_time() {
        let params = ConsensusParameters::testnet();
        assert!(params.testnet);
        assert_eq!(params.upgrade_height_v2, 100);
        assert_eq!(params.governance_percent, 10);
        assert_eq!(params.governance_height_start, 1);
        assert_eq!(params.governance_height_end, 100);
        assert_eq!(params.blocks_filename, "testnet_blocks.bin");
        assert_eq!(params.blocks_cache_filename, "testnet_blockscache.bin");
        assert_eq!(params.block_indexes_filename, "testnet_blockindexes.bin");
        assert_eq!(params.tx_pool_filename, "testnet_poolstate.bin");
        assert_eq!(
            params.blockchain_indices_filename,
            "testnet_blockchainindices.bin"
        );
    }

    #[test]
    fn amount_codec_uses_the_configured_decimals() {
        let params = ConsensusParameters::builder()
            .number_of_decimal_places(6)
            .build();
        assert_eq!(params.parse_amount("1.5"), Some(1_500_000));
        assert_eq!(params.format_amount(1_500_000), "1.500000");
        assert_eq!(params.parse_amount("0.0000001"), None);
        assert_eq!(params.format_signed_amount(-250_000), "-0.250000");
    }

    #[test]
    fn upgrade_height_is_versioned() {
        let params = ConsensusParameters::mainnet();
        assert_eq!(params.upgrade_height(2), params.upgrade_height_v2);
        assert_eq!(params.upgrade_height(1), u32::MAX);
        assert_eq!(params.upgrade_height(3), u32::MAX);
    }
}
