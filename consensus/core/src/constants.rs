// Copyright (c) 2025 The Quill Project

//! Mainnet consensus constants.
//!
//! These are the values [`crate::ConsensusParametersBuilder::new`] seeds
//! itself with; testnet overrides are applied at build time.

/// Asymptotic maximum coin count, in atomic units.
pub const MONEY_SUPPLY: u64 = u64::MAX;

/// Base reward is `(MONEY_SUPPLY - generated) >> EMISSION_SPEED_FACTOR`.
///
/// 18 gives a smooth curve that emits roughly half the remaining supply
/// every 2^18 blocks.
pub const EMISSION_SPEED_FACTOR: u32 = 18;

/// Floor on the per-block subsidy once the emission curve decays (1 QLL).
pub const TAIL_EMISSION_REWARD: u64 = 100_000_000;

/// Coin revision. Revision 1 also size-penalises fees.
pub const COIN_VERSION: u8 = 1;

/// Decimal places in the display form (1 QLL = 10^8 atomic units).
pub const DISPLAY_DECIMAL_POINT: u8 = 8;

/// Flat minimum transaction fee (0.001 QLL).
pub const MINIMUM_FEE: u64 = 100_000;

/// Outputs below this are dust for fusion purposes (0.001 QLL).
pub const DEFAULT_DUST_THRESHOLD: u64 = MINIMUM_FEE;

/// Intended mean seconds between blocks.
pub const DIFFICULTY_TARGET: u64 = 120;

/// Blocks per day at the target rate.
pub const EXPECTED_NUMBER_OF_BLOCKS_PER_DAY: u64 = 24 * 60 * 60 / DIFFICULTY_TARGET;

/// Sliding window for the legacy retarget.
pub const DIFFICULTY_WINDOW: u64 = 720;

/// Outliers trimmed from each end of the sorted legacy window.
pub const DIFFICULTY_CUT: u64 = 60;

/// Most-recent blocks excluded from the legacy window for stability.
pub const DIFFICULTY_LAG: u64 = 15;

/// Difficulty floor, and the v2 retarget's fallback value.
pub const DEFAULT_DIFFICULTY: u64 = 10_000;

/// When nonzero, every retarget returns this value. Debug scenarios only.
pub const FIXED_DIFFICULTY: u64 = 0;

/// A solve time beyond this activates the CLIF emergency path.
pub const CLIF_THRESHOLD: u64 = DIFFICULTY_TARGET * 5;

/// Hard cap on block height.
pub const MAX_BLOCK_NUMBER: u32 = 500_000_000;

/// Hard cap on a serialized block.
pub const MAX_BLOCK_BLOB_SIZE: u64 = 500_000_000;

/// Hard cap on a serialized transaction.
pub const MAX_TX_SIZE: u64 = 1_000_000_000;

/// Blocks up to this size earn the full reward regardless of the median.
pub const BLOCK_GRANTED_FULL_REWARD_ZONE: u64 = 100_000;

/// Window over which the size median is taken.
pub const REWARD_BLOCKS_WINDOW: u32 = 100;

/// Bytes reserved in a block template for the coinbase transaction.
pub const COINBASE_BLOB_RESERVED_SIZE: u64 = 600;

/// Base of the height-dependent maximum block size.
pub const MAX_BLOCK_SIZE_INITIAL: u64 = 1_000_000;

/// Growth of the maximum block size: numerator.
pub const MAX_BLOCK_SIZE_GROWTH_SPEED_NUMERATOR: u64 = 100 * 1024;

/// Growth of the maximum block size: denominator (one year of blocks).
pub const MAX_BLOCK_SIZE_GROWTH_SPEED_DENOMINATOR: u64 = 365 * 24 * 60 * 60 / DIFFICULTY_TARGET;

/// Blocks a coinbase output stays locked.
pub const MINED_MONEY_UNLOCK_WINDOW: u32 = 10;

/// Blocks sampled for the timestamp median check.
pub const BLOCKCHAIN_TIMESTAMP_CHECK_WINDOW: u32 = 60;

/// Seconds a block timestamp may lie in the future.
pub const BLOCK_FUTURE_TIME_LIMIT: u64 = 60 * 60 * 2;

/// Seconds a transaction lives in the pool before eviction.
pub const MEMPOOL_TX_LIVE_TIME: u64 = 60 * 60 * 24;

/// Height at which the version-2 consensus rules activate.
pub const UPGRADE_HEIGHT_V2: u32 = 60_000;

/// Percentage of minor-version votes required to schedule an upgrade.
pub const UPGRADE_VOTING_THRESHOLD: u32 = 90;

/// Blocks over which upgrade votes are counted.
pub const UPGRADE_VOTING_WINDOW: u32 = EXPECTED_NUMBER_OF_BLOCKS_PER_DAY as u32;

/// Blocks between a scheduled upgrade and its activation.
pub const UPGRADE_WINDOW: u32 = EXPECTED_NUMBER_OF_BLOCKS_PER_DAY as u32;

/// Share of the base reward diverted to governance, in percent.
pub const GOVERNANCE_PERCENT: u8 = 10;

/// First height of the governance window.
pub const GOVERNANCE_HEIGHT_START: u32 = 1;

/// Last height of the governance window (four years of blocks).
pub const GOVERNANCE_HEIGHT_END: u32 = 4 * 365 * (EXPECTED_NUMBER_OF_BLOCKS_PER_DAY as u32);

/// Maximum serialized size of a fusion transaction.
pub const FUSION_TX_MAX_SIZE: u64 = BLOCK_GRANTED_FULL_REWARD_ZONE * 30 / 100;

/// Minimum inputs a fusion transaction must consolidate.
pub const FUSION_TX_MIN_INPUT_COUNT: u64 = 12;

/// Minimum ratio of inputs to outputs in a fusion transaction.
pub const FUSION_TX_MIN_IN_OUT_COUNT_RATIO: u64 = 4;

/// Minimum ring size (decoys plus the real input).
pub const MIN_TX_MIXIN_SIZE: u64 = 2;

/// Maximum ring size.
pub const MAX_TX_MIXIN_SIZE: u64 = 20;

/// Block major version for the launch rules.
pub const BLOCK_MAJOR_VERSION_1: u8 = 1;

/// Block major version for the v2 hard fork.
pub const BLOCK_MAJOR_VERSION_2: u8 = 2;

/// Initial block minor version.
pub const BLOCK_MINOR_VERSION_0: u8 = 0;

/// Nonce of the genesis block. Testnet uses this plus one.
pub const GENESIS_NONCE: u32 = 70;

/// The hard-coded genesis coinbase transaction, in wire form.
///
/// Generating a coinbase uses a random ephemeral key, but the genesis must
/// be identical on every node, so the transaction is pinned as a blob:
/// version 1, unlock window 10, one base input at height 0, one output
/// paying the full initial subsidy (`MONEY_SUPPLY >>
/// EMISSION_SPEED_FACTOR`).
pub const GENESIS_COINBASE_TX_HEX: &str =
    "010a01ff0001ffffffffffff0f026704c4777bfa44ce808b0d99e8a0d94da3e5e3a2cea58c6b830adb56da7b6c9d21013fa8a2cb71f3b5dd2e19593d72967e96797fdfe8dc48d02b5ee2bbf443d03a95";

/// Seed string for the governance view secret key.
pub const GOVERNANCE_VIEW_KEY_SEED: &str = "quill-governance-view-key-v1";

/// Seed string for the governance spend secret key.
pub const GOVERNANCE_SPEND_KEY_SEED: &str = "quill-governance-spend-key-v1";

/// On-disk name of the block store.
pub const BLOCKS_FILENAME: &str = "blocks.bin";

/// On-disk name of the block cache.
pub const BLOCKS_CACHE_FILENAME: &str = "blockscache.bin";

/// On-disk name of the height index.
pub const BLOCK_INDEXES_FILENAME: &str = "blockindexes.bin";

/// On-disk name of the persisted transaction pool.
pub const TX_POOL_FILENAME: &str = "poolstate.bin";

/// On-disk name of the auxiliary blockchain indices.
pub const BLOCKCHAIN_INDICES_FILENAME: &str = "blockchainindices.bin";
