// Copyright (c) 2025 The Quill Project

//! Difficulty retargeting.
//!
//! Three algorithms share the entry point [`ConsensusParameters::next_difficulty`]:
//!
//! - **v1** — the legacy windowed mean: sort the timestamp window, trim
//!   outliers from both ends, divide total work by the trimmed time span.
//! - **v2** — outlier-robust: partition per-block solve times by their
//!   distance from the mean and nudge the previous difficulty by at most
//!   a few percent per block.
//! - **CLIF** — the emergency path: when a single solve time blows past
//!   the configured threshold, halve difficulty (repeatedly, scaled by
//!   how late the block is) while clamping against long-horizon averages
//!   supplied by the caller, so a stalled chain recovers in bounded time
//!   without dropping below historical norms.
//!
//! All real-valued arithmetic is IEEE-754 double precision in a fixed
//! evaluation order; every node must reproduce these results bit for bit.

use crate::{constants, ConsensusParameters};
use tracing::{error, info, warn};

/// The averaging horizons the CLIF path consults.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StatPeriod {
    /// The last hour.
    Hour,
    /// The last day.
    Day,
    /// The last week.
    Week,
    /// The last 30 days.
    Month,
    /// The last half year.
    HalfYear,
    /// The last year.
    Year,
}

impl StatPeriod {
    /// Every period, shortest horizon first.
    pub const ALL: [StatPeriod; 6] = [
        StatPeriod::Hour,
        StatPeriod::Day,
        StatPeriod::Week,
        StatPeriod::Month,
        StatPeriod::HalfYear,
        StatPeriod::Year,
    ];

    /// The period length in seconds.
    pub fn seconds(self) -> u64 {
        match self {
            StatPeriod::Hour => 60 * 60,
            StatPeriod::Day => 24 * 60 * 60,
            StatPeriod::Week => 7 * 24 * 60 * 60,
            StatPeriod::Month => 30 * 24 * 60 * 60,
            StatPeriod::HalfYear => 183 * 24 * 60 * 60,
            StatPeriod::Year => 365 * 24 * 60 * 60,
        }
    }
}

impl ConsensusParameters {
    /// Compute the difficulty of the next block.
    ///
    /// `timestamps` and `cumulative_difficulties` are aligned windows of
    /// the most recent blocks, oldest first. `next_block_time` is the
    /// candidate timestamp of the block being targeted; `lazy_stats`
    /// supplies mean historical difficulty over a [`StatPeriod`] ending
    /// at a given anchor timestamp (returning 0 when unknown).
    pub fn next_difficulty<F>(
        &self,
        height: u32,
        major_version: u8,
        timestamps: Vec<u64>,
        cumulative_difficulties: Vec<u64>,
        next_block_time: u64,
        lazy_stats: F,
    ) -> u64
    where
        F: Fn(StatPeriod, u64) -> u64,
    {
        if constants::FIXED_DIFFICULTY > 0 {
            warn!("fixed difficulty is used: {}", constants::FIXED_DIFFICULTY);
            return constants::FIXED_DIFFICULTY;
        }
        if self.fixed_difficulty > 0 {
            warn!("fixed difficulty is used: {}", self.fixed_difficulty);
            return self.fixed_difficulty;
        }

        let last_timestamp = timestamps.last().copied().unwrap_or(0);
        if major_version >= constants::BLOCK_MAJOR_VERSION_2
            && next_block_time > last_timestamp + self.clif_threshold
        {
            let count = cumulative_difficulties.len();
            let last_difficulty = if count >= 2 {
                cumulative_difficulties[count - 1] - cumulative_difficulties[count - 2]
            } else {
                1
            };
            let current_solve_time = next_block_time - last_timestamp;
            return self.clif_difficulty(
                height,
                major_version,
                last_difficulty,
                last_timestamp,
                current_solve_time,
                &lazy_stats,
            );
        }

        if major_version >= constants::BLOCK_MAJOR_VERSION_2 {
            self.next_difficulty_v2(&timestamps, &cumulative_difficulties, height)
        } else {
            self.next_difficulty_v1(timestamps, cumulative_difficulties)
        }
    }

    /// The legacy windowed-mean retarget.
    fn next_difficulty_v1(
        &self,
        mut timestamps: Vec<u64>,
        mut cumulative_difficulties: Vec<u64>,
    ) -> u64 {
        debug_assert!(self.difficulty_window >= 2);

        let window = self.difficulty_window as usize;
        if timestamps.len() > window {
            // The caller hands us window + lag samples; the newest `lag`
            // are dropped here for stability.
            timestamps.truncate(window);
            cumulative_difficulties.truncate(window);
        }

        let length = timestamps.len();
        debug_assert_eq!(length, cumulative_difficulties.len());
        if length <= 1 {
            return 1;
        }

        timestamps.sort_unstable();

        let cut = self.difficulty_cut as usize;
        debug_assert!(2 * cut <= window - 2);
        let (cut_begin, cut_end) = if length <= window - 2 * cut {
            (0, length)
        } else {
            let cut_begin = (length - (window - 2 * cut) + 1) / 2;
            (cut_begin, cut_begin + (window - 2 * cut))
        };
        debug_assert!(cut_begin + 2 <= cut_end && cut_end <= length);

        let time_span = (timestamps[cut_end - 1] - timestamps[cut_begin]).max(1);
        let total_work = cumulative_difficulties[cut_end - 1] - cumulative_difficulties[cut_begin];
        debug_assert!(total_work > 0);

        let product = total_work as u128 * self.difficulty_target as u128;
        if product > u64::MAX as u128 {
            return 0;
        }
        let low = product as u64;
        match low.checked_add(time_span - 1) {
            Some(adjusted) => adjusted / time_span,
            None => 0,
        }
    }

    /// The outlier-robust retarget introduced with the v2 rules.
    fn next_difficulty_v2(
        &self,
        timestamps: &[u64],
        cumulative_difficulties: &[u64],
        height: u32,
    ) -> u64 {
        let min_difficulty = self.default_difficulty;
        if self.testnet {
            return min_difficulty;
        }
        if timestamps.len() < 2 {
            return min_difficulty;
        }
        debug_assert_eq!(timestamps.len(), cumulative_difficulties.len());

        let diff_window = (timestamps.len() - 1) as u32;

        // Until a full window has accumulated past the fork, hold the
        // baseline difficulty.
        if height < self.upgrade_height_v2 + diff_window {
            return min_difficulty;
        }

        if timestamps.windows(2).any(|pair| pair[0] > pair[1]) {
            error!("invalid timestamps for difficulty calculation");
            return min_difficulty;
        }
        if cumulative_difficulties
            .windows(2)
            .any(|pair| pair[0] >= pair[1])
        {
            error!("invalid cumulative difficulties for difficulty calculation");
            return min_difficulty;
        }

        let difficulty_target = self.difficulty_target;
        let window_target = difficulty_target * diff_window as u64;
        let window_time = timestamps[timestamps.len() - 1] - timestamps[0];

        let solve_times: Vec<u64> = timestamps.windows(2).map(|pair| pair[1] - pair[0]).collect();
        let difficulties: Vec<u64> = cumulative_difficulties
            .windows(2)
            .map(|pair| pair[1] - pair[0])
            .collect();
        let prev_difficulty = difficulties.last().copied().unwrap_or(min_difficulty);

        // Partition solve times into those within one standard deviation
        // of the mean and the outliers.
        let avg_solvetime = mean(&solve_times);
        let stddev_solvetime = stddev(&solve_times);
        let solvetime_lowborder = if avg_solvetime > stddev_solvetime {
            avg_solvetime - stddev_solvetime
        } else {
            1.0
        };
        let solvetime_highborder = avg_solvetime + stddev_solvetime;

        let mut valid_number = 0usize;
        let mut valid_sum = 0u64;
        let mut invalid_number = 0usize;
        let mut invalid_sum = 0u64;
        for &solve_time in &solve_times {
            let st = solve_time as f64;
            if st >= solvetime_lowborder && st <= solvetime_highborder {
                valid_number += 1;
                valid_sum += solve_time;
            } else {
                invalid_number += 1;
                invalid_sum += solve_time;
            }
        }

        // A clean window needs no adjustment at all.
        if invalid_number == 0 {
            return prev_difficulty.max(min_difficulty);
        }

        let valid_mean = valid_sum as f64 / valid_number as f64;
        let invalid_mean = invalid_sum as f64 / invalid_number as f64;

        let next_diff = if window_time as f64 >= window_target as f64 * 0.97
            && window_time as f64 <= window_target as f64 * 1.03
        {
            // On-pace window: steer gently toward whichever group has the
            // larger mean, capped at one percent per block.
            let reference_mean = if valid_mean >= invalid_mean {
                valid_mean
            } else {
                invalid_mean
            };
            let coef = difficulty_target as f64 / reference_mean;
            if reference_mean < difficulty_target as f64 {
                prev_difficulty as f64 * coef.min(1.01) + 0.5
            } else {
                prev_difficulty as f64 * coef.max(0.99) + 0.5
            }
        } else if (window_time as f64) < window_target as f64 * 0.97 {
            prev_difficulty as f64 * 1.02 + 0.5
        } else {
            prev_difficulty as f64 * 0.98 + 0.5
        };

        (next_diff as u64).max(min_difficulty)
    }

    /// The CLIF emergency divisor.
    fn clif_difficulty<F>(
        &self,
        height: u32,
        major_version: u8,
        last_difficulty: u64,
        last_timestamp: u64,
        current_solve_time: u64,
        lazy_stats: &F,
    ) -> u64
    where
        F: Fn(StatPeriod, u64) -> u64,
    {
        info!(
            "CLIF difficulty inputs: height {height}, block version {major_version}, \
             last difficulty {last_difficulty}, current solve time {current_solve_time}"
        );

        let mut new_diff = last_difficulty;
        if new_diff > self.default_difficulty {
            let correction_interval = current_solve_time - self.clif_threshold;
            let decrease_counter = correction_interval / self.difficulty_target + 1;
            let mut round_counter = 1u64;

            new_diff /= 2;
            info!(
                "CLIF decreased difficulty {round_counter} times, \
                 intermediate difficulty is {new_diff}"
            );

            for period in StatPeriod::ALL {
                let mean_diff = lazy_stats(period, last_timestamp);
                info!("last {period:?} average difficulty is {mean_diff}");
                if mean_diff > 0 {
                    new_diff = new_diff.min(mean_diff);
                }
            }

            if decrease_counter > 1 {
                while round_counter < decrease_counter {
                    new_diff /= 2;
                    round_counter += 1;
                    if new_diff <= self.default_difficulty {
                        break;
                    }
                }
                info!(
                    "CLIF decreased difficulty {round_counter} times, \
                     intermediate difficulty is {new_diff}"
                );
            }

            new_diff = new_diff.max(self.default_difficulty);
        }

        info!("CLIF difficulty result: {new_diff}");
        new_diff
    }
}

/// Arithmetic mean of a sample, 0 when empty.
fn mean(values: &[u64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|value| *value as f64).sum::<f64>() / values.len() as f64
}

/// Population standard deviation of a sample, 0 when empty.
fn stddev(values: &[u64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mu = mean(values);
    let variance = values
        .iter()
        .map(|value| {
            let deviation = *value as f64 - mu;
            deviation * deviation
        })
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}
