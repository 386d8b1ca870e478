// Copyright (c) 2025 The Quill Project

//! The tx-extra field codec.
//!
//! `Transaction::extra` is a sequence of tagged records:
//!
//! - `0x01` — the transaction public key, 32 raw bytes,
//! - `0x02` — an extra nonce, one length byte then that many bytes.
//!
//! Scanning stops at the first unknown tag; the rest of the field is
//! opaque.

use crate::constants::TX_EXTRA_NONCE_MAX_COUNT;
use quill_crypto_keys::CompressedPublicKey;

/// Tag for the transaction public key record.
pub const TX_EXTRA_TAG_PUBKEY: u8 = 0x01;

/// Tag for the extra-nonce record.
pub const TX_EXTRA_TAG_NONCE: u8 = 0x02;

/// Append the transaction public key record to `extra`.
pub fn add_tx_public_key_to_extra(extra: &mut Vec<u8>, tx_public_key: &CompressedPublicKey) {
    extra.push(TX_EXTRA_TAG_PUBKEY);
    extra.extend_from_slice(&tx_public_key.0);
}

/// Append an extra-nonce record to `extra`.
///
/// Returns `false` (leaving `extra` untouched) if the nonce is longer than
/// [`TX_EXTRA_NONCE_MAX_COUNT`] bytes.
pub fn add_extra_nonce_to_extra(extra: &mut Vec<u8>, nonce: &[u8]) -> bool {
    if nonce.len() > TX_EXTRA_NONCE_MAX_COUNT {
        return false;
    }
    extra.push(TX_EXTRA_TAG_NONCE);
    extra.push(nonce.len() as u8);
    extra.extend_from_slice(nonce);
    true
}

/// Scan `extra` for the transaction public key record.
pub fn tx_public_key_from_extra(extra: &[u8]) -> Option<CompressedPublicKey> {
    let mut rest = extra;
    while let Some((&tag, after_tag)) = rest.split_first() {
        match tag {
            TX_EXTRA_TAG_PUBKEY => {
                let key: &[u8; 32] = after_tag.get(..32)?.try_into().ok()?;
                return Some(CompressedPublicKey(*key));
            }
            TX_EXTRA_TAG_NONCE => {
                let (&len, after_len) = after_tag.split_first()?;
                rest = after_len.get(len as usize..)?;
            }
            _ => return None,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_key_round_trips() {
        let key = CompressedPublicKey([0xabu8; 32]);
        let mut extra = Vec::new();
        add_tx_public_key_to_extra(&mut extra, &key);
        assert_eq!(tx_public_key_from_extra(&extra), Some(key));
    }

    #[test]
    fn scanner_skips_leading_nonce() {
        let key = CompressedPublicKey([0x11u8; 32]);
        let mut extra = Vec::new();
        assert!(add_extra_nonce_to_extra(&mut extra, b"mining-pool-tag"));
        add_tx_public_key_to_extra(&mut extra, &key);
        assert_eq!(tx_public_key_from_extra(&extra), Some(key));
    }

    #[test]
    fn oversized_nonce_rejected() {
        let mut extra = Vec::new();
        let nonce = [0u8; TX_EXTRA_NONCE_MAX_COUNT + 1];
        assert!(!add_extra_nonce_to_extra(&mut extra, &nonce));
        assert!(extra.is_empty());
    }

    #[test]
    fn missing_key_yields_none() {
        assert_eq!(tx_public_key_from_extra(&[]), None);

        let mut extra = Vec::new();
        assert!(add_extra_nonce_to_extra(&mut extra, b"only-a-nonce"));
        assert_eq!(tx_public_key_from_extra(&extra), None);
    }

    #[test]
    fn unknown_tag_stops_the_scan() {
        let key = CompressedPublicKey([0x22u8; 32]);
        let mut extra = vec![0x7f];
        add_tx_public_key_to_extra(&mut extra, &key);
        assert_eq!(tx_public_key_from_extra(&extra), None);
    }

    #[test]
    fn truncated_key_record_yields_none() {
        let extra = [TX_EXTRA_TAG_PUBKEY, 0x01, 0x02];
        assert_eq!(tx_public_key_from_extra(&extra), None);
    }
}
