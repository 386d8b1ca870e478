// Copyright (c) 2025 The Quill Project

//! The amount codec.
//!
//! Amounts are `u64` atomic units. This module owns their display form
//! (a fixed-point decimal string), the inverse parser, and decomposition
//! into the canonical "pretty" denominations `d * 10^k` with `d` in 1..=9.

use lazy_static::lazy_static;

lazy_static! {
    /// Every pretty amount representable in a `u64`, ascending.
    ///
    /// Nine entries per decade (`1..=9 * 10^k` for `k` in 0..=18), plus
    /// the lone `10^19` that still fits.
    pub static ref PRETTY_AMOUNTS: Vec<u64> = {
        let mut amounts = Vec::with_capacity(172);
        let mut order = 1u64;
        'decades: loop {
            for digit in 1..=9u64 {
                match digit.checked_mul(order) {
                    Some(amount) => amounts.push(amount),
                    None => break 'decades,
                }
            }
            order = match order.checked_mul(10) {
                Some(next) => next,
                None => break,
            };
        }
        amounts
    };
}

/// Format an amount as a decimal string with exactly `decimals` fractional
/// digits. The integer side is zero-padded so the dot never leads.
pub fn format_amount(amount: u64, decimals: usize) -> String {
    let mut s = amount.to_string();
    if s.len() < decimals + 1 {
        s.insert_str(0, &"0".repeat(decimals + 1 - s.len()));
    }
    s.insert(s.len() - decimals, '.');
    s
}

/// Format a signed amount; negative values get a leading `-`.
pub fn format_signed_amount(amount: i64, decimals: usize) -> String {
    let mut s = format_amount(amount.unsigned_abs(), decimals);
    if amount < 0 {
        s.insert(0, '-');
    }
    s
}

/// Parse a decimal amount string.
///
/// Whitespace is trimmed, a single dot is allowed, trailing fractional
/// zeros beyond `decimals` are tolerated, and everything else must be an
/// ascii digit. Returns `None` on any violation or on a fraction finer
/// than `decimals`.
pub fn parse_amount(input: &str, decimals: usize) -> Option<u64> {
    let mut s = input.trim().to_string();
    let mut fraction_size = 0usize;
    if let Some(point_index) = s.find('.') {
        fraction_size = s.len() - point_index - 1;
        while decimals < fraction_size && s.ends_with('0') {
            s.pop();
            fraction_size -= 1;
        }
        if decimals < fraction_size {
            return None;
        }
        s.remove(point_index);
    }

    if s.is_empty() {
        return None;
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    if fraction_size < decimals {
        s.push_str(&"0".repeat(decimals - fraction_size));
    }

    s.parse::<u64>().ok()
}

/// Decompose `amount` into pretty chunks, in emission order (ascending
/// digit significance).
///
/// Chunks below `dust_threshold` are accumulated and, when a qualifying
/// chunk is met (or the walk ends), emitted once as a single dust residue
/// ahead of it. The chunks always sum back to `amount`.
pub fn decompose_amount_into_digits(mut amount: u64, dust_threshold: u64) -> Vec<u64> {
    let mut chunks = Vec::new();
    if amount == 0 {
        return chunks;
    }

    let mut dust_handled = false;
    let mut dust = 0u64;
    let mut order = 1u64;
    while amount != 0 {
        let chunk = (amount % 10) * order;
        amount /= 10;
        order = order.saturating_mul(10);

        if !dust_handled && chunk < dust_threshold {
            dust += chunk;
        } else {
            if !dust_handled && dust != 0 {
                chunks.push(dust);
                dust_handled = true;
            }
            if chunk != 0 {
                chunks.push(chunk);
            }
        }
    }
    if !dust_handled && dust != 0 {
        chunks.push(dust);
    }
    chunks
}

/// Decompose `amount` into pretty chunks, sorted ascending.
///
/// This is the set-shaped variant used for fusion verification;
/// [`decompose_amount_into_digits`] is the order-preserving variant used
/// for coinbase output layout.
pub fn decompose_amount(amount: u64, dust_threshold: u64) -> Vec<u64> {
    let mut chunks = decompose_amount_into_digits(amount, dust_threshold);
    chunks.sort_unstable();
    chunks
}

/// Round a minimal fee up to `digits` significant digits.
///
/// Goes through the decimal string form and IEEE-754 doubles, in this
/// exact evaluation order, so all nodes agree on the result.
pub fn round_up_min_fee(minimal_fee: u64, digits: i32, decimals: usize) -> Option<u64> {
    let min_fee: f64 = format_amount(minimal_fee, decimals).parse().ok()?;
    let scale = 10f64.powf(min_fee.abs().log10().floor() + (1 - digits) as f64);
    let rounded_fee = (min_fee / scale).ceil() * scale;
    parse_amount(&format!("{rounded_fee:.12}"), decimals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn pretty_amounts_shape() {
        assert_eq!(PRETTY_AMOUNTS.len(), 172);
        assert_eq!(PRETTY_AMOUNTS[0], 1);
        assert_eq!(*PRETTY_AMOUNTS.last().unwrap(), 10_000_000_000_000_000_000);
        assert!(PRETTY_AMOUNTS.windows(2).all(|w| w[0] < w[1]));
        // Nine entries per full decade.
        assert_eq!(PRETTY_AMOUNTS[9], 10);
        assert_eq!(PRETTY_AMOUNTS[17], 90);
        assert_eq!(PRETTY_AMOUNTS[18], 100);
    }

    #[test]
    fn format_pads_the_integer_side() {
        assert_eq!(format_amount(1_500_000, 6), "1.500000");
        assert_eq!(format_amount(1, 6), "0.000001");
        assert_eq!(format_amount(0, 6), "0.000000");
        assert_eq!(format_amount(123, 0), "123.");
    }

    #[test]
    fn format_signed_prefixes_minus() {
        assert_eq!(format_signed_amount(-1_500_000, 6), "-1.500000");
        assert_eq!(format_signed_amount(1_500_000, 6), "1.500000");
    }

    #[test]
    fn parse_accepts_shorter_fractions() {
        assert_eq!(parse_amount("1.5", 6), Some(1_500_000));
        assert_eq!(parse_amount("1", 6), Some(1_000_000));
        assert_eq!(parse_amount(" 0.25 ", 6), Some(250_000));
    }

    #[test]
    fn parse_tolerates_trailing_fractional_zeros() {
        assert_eq!(parse_amount("1.5000000", 6), Some(1_500_000));
        assert_eq!(parse_amount("1.000000000000", 6), Some(1_000_000));
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert_eq!(parse_amount("", 6), None);
        assert_eq!(parse_amount(".", 6), None);
        assert_eq!(parse_amount("abc", 6), None);
        assert_eq!(parse_amount("1.2.3", 6), None);
        assert_eq!(parse_amount("-1", 6), None);
        // Fraction finer than the coin supports.
        assert_eq!(parse_amount("0.0000001", 6), None);
    }

    #[test]
    fn decompose_preserves_emission_order() {
        assert_eq!(
            decompose_amount_into_digits(1_234_567, 0),
            vec![7, 60, 500, 4_000, 30_000, 200_000, 1_000_000]
        );
    }

    #[test]
    fn decompose_collects_dust_residue() {
        // 7 + 60 + 500 fall below the threshold and come back as one
        // residue ahead of the first real chunk.
        assert_eq!(
            decompose_amount_into_digits(1_234_567, 1_000),
            vec![567, 4_000, 30_000, 200_000, 1_000_000]
        );
    }

    #[test]
    fn decompose_of_zero_is_empty() {
        assert!(decompose_amount_into_digits(0, 0).is_empty());
    }

    #[test]
    fn sorted_decompose_matches_unsorted_content() {
        let mut unsorted = decompose_amount_into_digits(907_010, 0);
        unsorted.sort_unstable();
        assert_eq!(decompose_amount(907_010, 0), unsorted);
    }

    #[test]
    fn chunks_without_dust_are_pretty() {
        for amount in [1u64, 19, 1_234_567, 90_000_000_001, u64::MAX] {
            for chunk in decompose_amount_into_digits(amount, 0) {
                assert!(
                    PRETTY_AMOUNTS.binary_search(&chunk).is_ok(),
                    "chunk {chunk} of {amount} is not pretty"
                );
            }
        }
    }

    #[test]
    fn round_up_min_fee_two_digits() {
        // 0.00123456 rounded up to two significant digits is 0.0013.
        assert_eq!(round_up_min_fee(123_456, 2, 8), Some(130_000));
        // Already round values stay put.
        assert_eq!(round_up_min_fee(130_000, 2, 8), Some(130_000));
    }

    proptest! {
        #[test]
        fn format_parse_round_trip(amount in any::<u64>()) {
            prop_assert_eq!(parse_amount(&format_amount(amount, 8), 8), Some(amount));
        }

        #[test]
        fn pretty_amount_round_trip(digit in 1u64..=9, power in 0u32..=18) {
            let amount = digit * 10u64.pow(power);
            prop_assert_eq!(parse_amount(&format_amount(amount, 8), 8), Some(amount));
        }

        #[test]
        fn decompose_preserves_the_sum(amount in any::<u64>(), dust in 0u64..1_000_000) {
            let chunks = decompose_amount_into_digits(amount, dust);
            let sum: u128 = chunks.iter().map(|chunk| *chunk as u128).sum();
            prop_assert_eq!(sum, amount as u128);
        }
    }
}
