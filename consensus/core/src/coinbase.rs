// Copyright (c) 2025 The Quill Project

//! Coinbase (miner) transaction construction and governance verification.
//!
//! The coinbase pays the miner with stealth outputs decomposed into
//! canonical denominations, and, inside the governance window, one
//! additional stealth output to the governance account. Validators
//! recompute the governance output keys from the embedded view secret to
//! verify the diverted share without learning anything else.

use crate::{constants, ConsensusParameters, MinerTxError};
use lazy_static::lazy_static;
use quill_account_keys::{AccountKeys, PublicAddress};
use quill_crypto_keys::{
    stealth::{derive_public_key, generate_key_derivation},
    CompressedPublicKey, KeyPair, RistrettoPrivate, RistrettoPublic,
};
use quill_transaction_core::{
    amount::decompose_amount_into_digits,
    constants::CURRENT_TRANSACTION_VERSION,
    extra::{add_extra_nonce_to_extra, add_tx_public_key_to_extra, tx_public_key_from_extra},
    BaseInput, Transaction, TxInput, TxOutTarget, TxOutput,
};
use rand_core::OsRng;
use tracing::{debug, error, info};

lazy_static! {
    static ref GOVERNANCE_ACCOUNT: AccountKeys = AccountKeys::from_secrets(
        RistrettoPrivate::from_seed(constants::GOVERNANCE_VIEW_KEY_SEED.as_bytes()),
        RistrettoPrivate::from_seed(constants::GOVERNANCE_SPEND_KEY_SEED.as_bytes()),
    );
}

/// The governance account, derived once from the embedded seeds.
pub fn governance_account() -> &'static AccountKeys {
    &GOVERNANCE_ACCOUNT
}

impl ConsensusParameters {
    /// Construct the miner transaction for a block.
    ///
    /// Pass `u64::MAX` as `block_target` to use the configured difficulty
    /// target (i.e. an on-pace solve).
    #[allow(clippy::too_many_arguments)]
    pub fn construct_miner_tx(
        &self,
        major_version: u8,
        height: u32,
        median_size: u64,
        already_generated_coins: u64,
        current_block_size: u64,
        fee: u64,
        miner_address: &PublicAddress,
        extra_nonce: &[u8],
        max_outs: usize,
        block_target: u64,
    ) -> Result<Transaction, MinerTxError> {
        let block_target = if block_target == u64::MAX {
            self.difficulty_target
        } else {
            block_target
        };

        let tx_key = KeyPair::generate(&mut OsRng);
        let mut extra = Vec::new();
        add_tx_public_key_to_extra(&mut extra, &CompressedPublicKey::from(&tx_key.public_key));
        if !extra_nonce.is_empty() && !add_extra_nonce_to_extra(&mut extra, extra_nonce) {
            return Err(MinerTxError::ExtraNonceTooLong(extra_nonce.len()));
        }

        let computed = self
            .block_reward(
                major_version,
                median_size,
                current_block_size,
                already_generated_coins,
                fee,
                height,
                block_target,
            )
            .map_err(|err| {
                info!("block is too big");
                err
            })?;

        // Inside the governance window the miner's share shrinks by the
        // governance reward. The genesis block keeps the whole subsidy.
        let mut block_reward = computed.reward;
        let mut governance_reward = 0u64;
        let enable_governance =
            self.is_governance_enabled(height) && already_generated_coins != 0;
        if enable_governance {
            governance_reward = self.governance_reward(block_reward);
            block_reward -= governance_reward;
        }
        let total_reward = block_reward + governance_reward;

        let mut out_amounts = decompose_amount_into_digits(block_reward, 0);
        if max_outs < 1 {
            error!("max_outs must be non-zero");
            return Err(MinerTxError::InvalidMaxOuts);
        }
        while out_amounts.len() > max_outs {
            if let Some(last) = out_amounts.pop() {
                let merged = out_amounts.len() - 1;
                out_amounts[merged] += last;
            }
        }

        let derivation = generate_key_derivation(miner_address.view_public_key(), &tx_key.secret_key);
        let mut outputs = Vec::with_capacity(out_amounts.len() + 1);
        let mut summary_amounts = 0u64;
        for (index, amount) in out_amounts.into_iter().enumerate() {
            let out_key = derive_public_key(&derivation, index as u64, miner_address.spend_public_key());
            summary_amounts += amount;
            outputs.push(TxOutput {
                amount,
                target: TxOutTarget::Key {
                    key: CompressedPublicKey::from(&out_key),
                },
            });
        }

        if enable_governance {
            let governance = governance_account();
            let derivation =
                generate_key_derivation(governance.address.view_public_key(), &tx_key.secret_key);
            // The governance output key continues the per-tx index
            // counter from the miner outputs.
            let position = outputs.len() as u64;
            let out_key =
                derive_public_key(&derivation, position, governance.address.spend_public_key());
            summary_amounts += governance_reward;
            outputs.push(TxOutput {
                amount: governance_reward,
                target: TxOutTarget::Key {
                    key: CompressedPublicKey::from(&out_key),
                },
            });
        }

        if summary_amounts != total_reward {
            error!(
                "failed to construct miner tx, output sum {summary_amounts} \
                 is not equal to block reward {total_reward}"
            );
            return Err(MinerTxError::RewardMismatch {
                expected: total_reward,
                got: summary_amounts,
            });
        }

        Ok(Transaction {
            version: CURRENT_TRANSACTION_VERSION,
            unlock_time: (height + self.mined_money_unlock_window) as u64,
            inputs: vec![TxInput::Base(BaseInput {
                block_index: height,
            })],
            outputs,
            extra,
        })
    }

    /// Verify that a coinbase pays the governance account its share.
    ///
    /// Scans the outputs, recomputing the expected governance output key
    /// at every index from the embedded view secret; accepts iff the
    /// matching outputs sum to exactly the governance share of the total
    /// payout.
    pub fn validate_governance_fee(&self, base_tx: &Transaction) -> bool {
        let governance = governance_account();

        let tx_public_key = match tx_public_key_from_extra(&base_tx.extra) {
            Some(key) => key,
            None => {
                debug!("coinbase carries no transaction public key");
                return false;
            }
        };
        let tx_public_key = match RistrettoPublic::try_from(&tx_public_key) {
            Ok(key) => key,
            Err(err) => {
                debug!("bad coinbase transaction public key: {err}");
                return false;
            }
        };

        let derivation = generate_key_derivation(&tx_public_key, &governance.view_secret_key);

        let mut total_reward = 0u64;
        let mut governance_fee = 0u64;
        for (index, output) in base_tx.outputs.iter().enumerate() {
            total_reward += output.amount;
            let TxOutTarget::Key { key } = &output.target;
            let expected =
                derive_public_key(&derivation, index as u64, governance.address.spend_public_key());
            if *key == CompressedPublicKey::from(&expected) {
                governance_fee += output.amount;
            }
        }

        governance_fee == self.governance_reward(total_reward)
    }
}
