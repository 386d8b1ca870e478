// Copyright (c) 2025 The Quill Project

//! Block reward computation.
//!
//! The reward pipeline, in order:
//!
//! 1. a solve-time *consistency* factor (post-v2) scales the base subsidy
//!    up to 2x for fast blocks and damps slow ones,
//! 2. the *tail emission* floor keeps the subsidy from decaying to zero,
//! 3. the quadratic *size penalty* shrinks the reward of blocks above the
//!    effective median, and rejects blocks above twice the median,
//! 4. fees pass through, penalised too on coin revision 1.
//!
//! A share of the base reward is diverted to governance inside the
//! configured height window.

use crate::{ConsensusParameters, RewardError};
use tracing::trace;

/// The outcome of a reward computation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BlockReward {
    /// What the coinbase may pay out: penalised subsidy plus fees.
    pub reward: u64,
    /// Net change to the emitted supply (the penalised part of the fee is
    /// burned, hence this can dip below the subsidy).
    pub emission_change: i64,
}

impl ConsensusParameters {
    /// Compute the reward for a block, or fail if the block is too large.
    ///
    /// `block_target` is the observed solve time of the block (new
    /// timestamp minus previous timestamp); it only matters from the v2
    /// fork onward.
    #[allow(clippy::too_many_arguments)]
    pub fn block_reward(
        &self,
        major_version: u8,
        median_size: u64,
        current_block_size: u64,
        already_generated_coins: u64,
        fee: u64,
        height: u32,
        block_target: u64,
    ) -> Result<BlockReward, RewardError> {
        debug_assert!(self.emission_speed_factor >= 1 && self.emission_speed_factor <= 64);

        let mut consistency = 1.0f64;
        let exponent = 0.25f64;
        if height >= self.upgrade_height_v2 && self.difficulty_target != 0 {
            consistency = block_target as f64 / self.difficulty_target as f64;
            if consistency < 1.0 {
                consistency = consistency.max(0.0);
            } else if consistency > 1.0 {
                consistency = consistency.powf(exponent).min(2.0);
            }
        }

        let unissued = self.money_supply - already_generated_coins;
        let curve = unissued
            .checked_shr(self.emission_speed_factor)
            .unwrap_or(0);
        let mut base_reward = (curve as f64 * consistency) as u64;
        if already_generated_coins.saturating_add(self.tail_emission_reward) >= self.money_supply
            || base_reward < self.tail_emission_reward
        {
            base_reward = self.tail_emission_reward;
        }

        let full_reward_zone = self.block_granted_full_reward_zone_by_version(major_version);
        let median_size = median_size.max(full_reward_zone);
        if current_block_size > median_size * 2 {
            trace!(
                "block cumulative size is too big: {current_block_size}, expected less than {}",
                median_size * 2
            );
            return Err(RewardError::BlockTooLarge(
                current_block_size,
                median_size * 2,
            ));
        }

        let penalized_base_reward = penalized_amount(base_reward, median_size, current_block_size);
        let penalized_fee = if self.coin_version == 1 {
            penalized_amount(fee, median_size, current_block_size)
        } else {
            fee
        };

        Ok(BlockReward {
            reward: penalized_base_reward + penalized_fee,
            emission_change: penalized_base_reward as i64 - (fee - penalized_fee) as i64,
        })
    }

    /// The maximum cumulative block size at `height`.
    pub fn max_block_cumulative_size(&self, height: u64) -> u64 {
        debug_assert!(height <= u64::MAX / self.max_block_size_growth_num);
        let max_size = self.max_block_size_initial
            + height * self.max_block_size_growth_num / self.max_block_size_growth_den;
        debug_assert!(max_size >= self.max_block_size_initial);
        max_size
    }

    /// Whether the governance share applies at `height`.
    pub fn is_governance_enabled(&self, height: u32) -> bool {
        height >= self.governance_height_start && height <= self.governance_height_end
    }

    /// The governance share of `base_reward`.
    ///
    /// The configured percentage is clamped into [1, 50] so the share is
    /// never zero and never a majority.
    pub fn governance_reward(&self, base_reward: u64) -> u64 {
        let percent = self.governance_percent.clamp(1, 50);
        (base_reward as f64 * (percent as f64 * 0.01)) as u64
    }
}

/// Apply the quadratic size penalty.
///
/// For `median < size <= 2 * median` the amount is scaled by
/// `size * (2 * median - size) / median^2`; at the median the factor is 1,
/// at twice the median it reaches 0.
pub(crate) fn penalized_amount(amount: u64, median_size: u64, current_block_size: u64) -> u64 {
    debug_assert!(median_size > 0);
    debug_assert!(current_block_size <= median_size * 2);
    if current_block_size <= median_size {
        return amount;
    }

    let multiplicand = current_block_size * (2 * median_size - current_block_size);
    let product = amount as u128 * multiplicand as u128;
    let penalized = product / median_size as u128 / median_size as u128;
    penalized as u64
}
