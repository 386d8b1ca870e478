// Copyright (c) 2025 The Quill Project

//! Fusion-transaction recognition.
//!
//! A fusion transaction consolidates many small outputs into fewer,
//! canonical-denomination outputs and is exempt from the minimum fee. The
//! checker enforces the structural limits (size, input count, in/out
//! ratio) and that the outputs are exactly the canonical decomposition of
//! the input sum.

use crate::ConsensusParameters;
use quill_transaction_core::{
    amount::{decompose_amount, PRETTY_AMOUNTS},
    Transaction,
};
use tracing::debug;

impl ConsensusParameters {
    /// Decide whether the given input/output amounts form a valid fusion
    /// transaction of serialized size `size` at `height`.
    pub fn is_fusion_transaction(
        &self,
        inputs_amounts: &[u64],
        outputs_amounts: &[u64],
        size: u64,
        height: u32,
    ) -> bool {
        if size > self.fusion_tx_max_size {
            debug!("fusion transaction verification failed: size exceeded max allowed size");
            return false;
        }

        if (inputs_amounts.len() as u64) < self.fusion_tx_min_input_count {
            debug!("fusion transaction verification failed: inputs count is less than minimum");
            return false;
        }

        if (inputs_amounts.len() as u64)
            < outputs_amounts.len() as u64 * self.fusion_tx_min_in_out_ratio
        {
            debug!(
                "fusion transaction verification failed: \
                 inputs to outputs count ratio is less than minimum"
            );
            return false;
        }

        let mut input_amount = 0u64;
        for &amount in inputs_amounts {
            if height < self.upgrade_height_v2 && amount < self.default_dust_threshold {
                debug!(
                    "fusion transaction verification failed: \
                     amount {amount} is less than dust threshold"
                );
                return false;
            }
            input_amount = match input_amount.checked_add(amount) {
                Some(sum) => sum,
                None => {
                    debug!("fusion transaction verification failed: input amounts overflow");
                    return false;
                }
            };
        }

        let dust_threshold = if height < self.upgrade_height_v2 {
            self.default_dust_threshold
        } else {
            0
        };
        let expected_outputs = decompose_amount(input_amount, dust_threshold);
        let mut sorted_outputs = outputs_amounts.to_vec();
        sorted_outputs.sort_unstable();

        if expected_outputs != sorted_outputs {
            debug!(
                "fusion transaction verification failed: \
                 decomposed output amounts do not match expected"
            );
            return false;
        }

        true
    }

    /// [`is_fusion_transaction`](Self::is_fusion_transaction) over a
    /// whole transaction.
    pub fn is_fusion(&self, transaction: &Transaction, size: u64, height: u32) -> bool {
        debug_assert_eq!(transaction.wire_size() as u64, size);
        self.is_fusion_transaction(
            &transaction.input_amounts(),
            &transaction.output_amounts(),
            size,
            height,
        )
    }

    /// Whether `amount` may be consumed by a fusion transaction whose
    /// eligibility cutoff is `threshold`.
    ///
    /// Eligible amounts are pretty, at least the dust threshold, and
    /// below the cutoff; the returned value is the amount's power of ten
    /// in the pretty table.
    pub fn is_applicable_fusion_input(
        &self,
        amount: u64,
        threshold: u64,
        _height: u32,
    ) -> Option<u8> {
        if amount >= threshold {
            return None;
        }
        if amount < self.default_dust_threshold {
            return None;
        }
        let index = PRETTY_AMOUNTS.binary_search(&amount).ok()?;
        Some((index / 9) as u8)
    }

    /// Upper bound on the inputs that fit in a fusion transaction of
    /// `transaction_size` bytes with `output_count` outputs and
    /// `mixin_count` decoys per input.
    pub fn approximate_maximum_input_count(
        transaction_size: u64,
        output_count: u64,
        mixin_count: u64,
    ) -> u64 {
        const KEY_IMAGE_SIZE: u64 = 32;
        const OUTPUT_KEY_SIZE: u64 = 32;
        const AMOUNT_SIZE: u64 = 8 + 2;
        const GLOBAL_INDEXES_VECTOR_SIZE_SIZE: u64 = 1;
        const GLOBAL_INDEXES_INITIAL_VALUE_SIZE: u64 = 4;
        const GLOBAL_INDEXES_DIFFERENCE_SIZE: u64 = 4;
        const SIGNATURE_SIZE: u64 = 64;
        const EXTRA_TAG_SIZE: u64 = 1;
        const INPUT_TAG_SIZE: u64 = 1;
        const OUTPUT_TAG_SIZE: u64 = 1;
        const PUBLIC_KEY_SIZE: u64 = 32;
        const TRANSACTION_VERSION_SIZE: u64 = 1;
        const TRANSACTION_UNLOCK_TIME_SIZE: u64 = 8;

        let outputs_size = output_count * (OUTPUT_TAG_SIZE + OUTPUT_KEY_SIZE + AMOUNT_SIZE);
        let header_size = TRANSACTION_VERSION_SIZE
            + TRANSACTION_UNLOCK_TIME_SIZE
            + EXTRA_TAG_SIZE
            + PUBLIC_KEY_SIZE;
        let input_size = INPUT_TAG_SIZE
            + AMOUNT_SIZE
            + KEY_IMAGE_SIZE
            + SIGNATURE_SIZE
            + GLOBAL_INDEXES_VECTOR_SIZE_SIZE
            + GLOBAL_INDEXES_INITIAL_VALUE_SIZE
            + mixin_count * (GLOBAL_INDEXES_DIFFERENCE_SIZE + SIGNATURE_SIZE);

        transaction_size.saturating_sub(header_size + outputs_size) / input_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ConsensusParameters {
        ConsensusParameters::mainnet()
    }

    #[test]
    fn valid_fusion_accepted_after_the_fork() {
        let params = params();
        let inputs = [50_000u64; 12];
        let outputs = [600_000u64];
        assert!(params.is_fusion_transaction(
            &inputs,
            &outputs,
            1_000,
            params.upgrade_height_v2
        ));
    }

    #[test]
    fn sub_dust_inputs_rejected_before_the_fork() {
        let params = params();
        let inputs = [50_000u64; 12];
        let outputs = [600_000u64];
        assert!(!params.is_fusion_transaction(&inputs, &outputs, 1_000, 0));
    }

    #[test]
    fn dusty_decomposition_accepted_before_the_fork() {
        let params = params();
        // 12 x 200000 = 2400000, which decomposes cleanly above the dust
        // threshold.
        let inputs = [200_000u64; 12];
        let outputs = [400_000u64, 2_000_000];
        assert!(params.is_fusion_transaction(&inputs, &outputs, 1_000, 0));
    }

    #[test]
    fn oversized_fusion_rejected() {
        let params = params();
        let inputs = [50_000u64; 12];
        let outputs = [600_000u64];
        assert!(!params.is_fusion_transaction(
            &inputs,
            &outputs,
            params.fusion_tx_max_size + 1,
            params.upgrade_height_v2
        ));
    }

    #[test]
    fn too_few_inputs_rejected() {
        let params = params();
        let inputs = [50_000u64; 11];
        let outputs = [550_000u64];
        assert!(!params.is_fusion_transaction(
            &inputs,
            &outputs,
            1_000,
            params.upgrade_height_v2
        ));
    }

    #[test]
    fn poor_in_out_ratio_rejected() {
        let params = params();
        let inputs = [50_000u64; 12];
        // Four outputs would need at least 16 inputs at ratio 4.
        let outputs = [100_000u64, 200_000, 100_000, 200_000];
        assert!(!params.is_fusion_transaction(
            &inputs,
            &outputs,
            1_000,
            params.upgrade_height_v2
        ));
    }

    #[test]
    fn non_canonical_outputs_rejected() {
        let params = params();
        let inputs = [50_000u64; 12];
        // Sums correctly, but is not the canonical decomposition.
        let outputs = [500_000u64, 100_000];
        assert!(!params.is_fusion_transaction(
            &inputs,
            &outputs,
            1_000,
            params.upgrade_height_v2
        ));
    }

    #[test]
    fn accepted_fusion_preserves_the_sum() {
        let params = params();
        let inputs = [70_000u64; 16];
        let input_sum: u64 = inputs.iter().sum();
        let outputs = decompose_amount(input_sum, 0);
        assert!(params.is_fusion_transaction(
            &inputs,
            &outputs,
            1_000,
            params.upgrade_height_v2
        ));
        assert_eq!(outputs.iter().sum::<u64>(), input_sum);
    }

    #[test]
    fn output_order_does_not_matter() {
        let params = params();
        let inputs = [200_000u64; 12];
        let outputs = [2_000_000u64, 400_000];
        assert!(params.is_fusion_transaction(
            &inputs,
            &outputs,
            1_000,
            params.upgrade_height_v2
        ));
    }

    #[test]
    fn whole_transaction_verdict_matches_the_amount_view() {
        use quill_crypto_keys::CompressedPublicKey;
        use quill_transaction_core::{KeyInput, TxInput, TxOutTarget, TxOutput};

        let params = params();
        let inputs = (0..12)
            .map(|i| {
                TxInput::Key(KeyInput {
                    amount: 50_000,
                    output_offsets: vec![i, i + 7],
                    key_image: [i as u8; 32],
                })
            })
            .collect();
        let transaction = Transaction {
            version: 1,
            unlock_time: 0,
            inputs,
            outputs: vec![TxOutput {
                amount: 600_000,
                target: TxOutTarget::Key {
                    key: CompressedPublicKey([5u8; 32]),
                },
            }],
            extra: Vec::new(),
        };

        let size = transaction.wire_size() as u64;
        assert!(params.is_fusion(&transaction, size, params.upgrade_height_v2));
        assert!(!params.is_fusion(&transaction, size, 0));
    }

    #[test]
    fn applicable_inputs_are_pretty_and_between_the_bounds() {
        let params = params();
        let height = params.upgrade_height_v2;

        // 100000 = 1 * 10^5 sits in decade five of the pretty table.
        assert_eq!(
            params.is_applicable_fusion_input(100_000, 200_000, height),
            Some(5)
        );
        // Not pretty.
        assert_eq!(params.is_applicable_fusion_input(150_000, 200_000, height), None);
        // Below the dust threshold.
        assert_eq!(params.is_applicable_fusion_input(50_000, 200_000, height), None);
        // At or above the cutoff.
        assert_eq!(params.is_applicable_fusion_input(200_000, 200_000, height), None);
        assert_eq!(params.is_applicable_fusion_input(300_000, 200_000, height), None);
    }

    #[test]
    fn approximate_input_count_matches_the_size_budget() {
        // 30000-byte budget, one output, two decoys per input.
        let count = ConsensusParameters::approximate_maximum_input_count(30_000, 1, 2);
        assert_eq!(count, 120);

        // A budget smaller than the header fits nothing.
        assert_eq!(ConsensusParameters::approximate_maximum_input_count(10, 1, 2), 0);
    }
}
