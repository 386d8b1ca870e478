// Copyright (c) 2025 The Quill Project

//! Transaction types and their deterministic wire form.
//!
//! The wire form is the consensus serialization: it is what gets hashed,
//! what block sizes are measured against, and what the hard-coded genesis
//! coinbase blob is encoded in. Layout:
//!
//! ```text
//! version        varint
//! unlock_time    varint
//! inputs         varint count, then per input a tag byte:
//!                  0xff  base input:  varint block_index
//!                  0x02  key input:   varint amount,
//!                                     varint offset count, varint offsets,
//!                                     32-byte key image
//! outputs        varint count, then per output:
//!                  varint amount, tag 0x02, 32-byte output key
//! extra          varint length, raw bytes
//! ```

use crate::{
    constants::{TAG_BASE_INPUT, TAG_KEY_INPUT, TAG_KEY_OUTPUT},
    wire::{read_blob, read_bytes, read_varint, write_varint, WireError},
};
use quill_crypto_keys::CompressedPublicKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The coinbase input: references the block it rewards rather than a
/// previous output.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct BaseInput {
    /// Height of the block this input rewards.
    pub block_index: u32,
}

/// A spend of a previous output, hidden in a ring of decoys.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct KeyInput {
    /// The amount being spent.
    pub amount: u64,
    /// Global output indices of the ring members, delta-encoded.
    pub output_offsets: Vec<u64>,
    /// The key image of the spent output.
    pub key_image: [u8; 32],
}

/// A transaction input.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum TxInput {
    /// The coinbase input.
    Base(BaseInput),
    /// A regular spend.
    Key(KeyInput),
}

/// The destination of a transaction output.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum TxOutTarget {
    /// A one-time output key.
    Key {
        /// The stealth output key only the recipient can spend.
        key: CompressedPublicKey,
    },
}

/// A transaction output.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct TxOutput {
    /// Amount, in atomic units.
    pub amount: u64,
    /// Where the amount goes.
    pub target: TxOutTarget,
}

/// A transaction.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Transaction {
    /// Format version.
    pub version: u8,
    /// Height (or timestamp) before which outputs cannot be spent.
    pub unlock_time: u64,
    /// Inputs, in consensus order.
    pub inputs: Vec<TxInput>,
    /// Outputs, in consensus order.
    pub outputs: Vec<TxOutput>,
    /// Free-form extra field (tx public key, nonce).
    pub extra: Vec<u8>,
}

impl Transaction {
    /// Serialize to the consensus wire form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.to_bytes_size_hint());
        write_varint(&mut buf, self.version as u64);
        write_varint(&mut buf, self.unlock_time);

        write_varint(&mut buf, self.inputs.len() as u64);
        for input in &self.inputs {
            match input {
                TxInput::Base(base) => {
                    buf.push(TAG_BASE_INPUT);
                    write_varint(&mut buf, base.block_index as u64);
                }
                TxInput::Key(key) => {
                    buf.push(TAG_KEY_INPUT);
                    write_varint(&mut buf, key.amount);
                    write_varint(&mut buf, key.output_offsets.len() as u64);
                    for offset in &key.output_offsets {
                        write_varint(&mut buf, *offset);
                    }
                    buf.extend_from_slice(&key.key_image);
                }
            }
        }

        write_varint(&mut buf, self.outputs.len() as u64);
        for output in &self.outputs {
            write_varint(&mut buf, output.amount);
            let TxOutTarget::Key { key } = &output.target;
            buf.push(TAG_KEY_OUTPUT);
            buf.extend_from_slice(&key.0);
        }

        write_varint(&mut buf, self.extra.len() as u64);
        buf.extend_from_slice(&self.extra);
        buf
    }

    /// Deserialize from the consensus wire form. The whole input must be
    /// consumed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WireError> {
        let mut input = bytes;
        let version = read_varint(&mut input)? as u8;
        let unlock_time = read_varint(&mut input)?;

        let input_count = read_varint(&mut input)? as usize;
        let mut inputs = Vec::with_capacity(input_count.min(1024));
        for _ in 0..input_count {
            let tag = read_bytes::<1>(&mut input)?[0];
            match tag {
                TAG_BASE_INPUT => {
                    let block_index = read_varint(&mut input)? as u32;
                    inputs.push(TxInput::Base(BaseInput { block_index }));
                }
                TAG_KEY_INPUT => {
                    let amount = read_varint(&mut input)?;
                    let offset_count = read_varint(&mut input)? as usize;
                    let mut output_offsets = Vec::with_capacity(offset_count.min(1024));
                    for _ in 0..offset_count {
                        output_offsets.push(read_varint(&mut input)?);
                    }
                    let key_image = read_bytes::<32>(&mut input)?;
                    inputs.push(TxInput::Key(KeyInput {
                        amount,
                        output_offsets,
                        key_image,
                    }));
                }
                other => return Err(WireError::InvalidTag(other)),
            }
        }

        let output_count = read_varint(&mut input)? as usize;
        let mut outputs = Vec::with_capacity(output_count.min(1024));
        for _ in 0..output_count {
            let amount = read_varint(&mut input)?;
            let tag = read_bytes::<1>(&mut input)?[0];
            if tag != TAG_KEY_OUTPUT {
                return Err(WireError::InvalidTag(tag));
            }
            let key = CompressedPublicKey(read_bytes::<32>(&mut input)?);
            outputs.push(TxOutput {
                amount,
                target: TxOutTarget::Key { key },
            });
        }

        let extra = read_blob(&mut input)?;
        if !input.is_empty() {
            return Err(WireError::TrailingBytes(input.len()));
        }

        Ok(Self {
            version,
            unlock_time,
            inputs,
            outputs,
            extra,
        })
    }

    /// Size of the wire form, in bytes.
    pub fn wire_size(&self) -> usize {
        self.to_bytes().len()
    }

    /// The consensus hash: SHA-256 of the wire form.
    pub fn hash(&self) -> [u8; 32] {
        Sha256::digest(self.to_bytes()).into()
    }

    /// Amounts of all key inputs, in order. Base inputs carry no amount.
    pub fn input_amounts(&self) -> Vec<u64> {
        self.inputs
            .iter()
            .filter_map(|input| match input {
                TxInput::Key(key) => Some(key.amount),
                TxInput::Base(_) => None,
            })
            .collect()
    }

    /// Amounts of all outputs, in order.
    pub fn output_amounts(&self) -> Vec<u64> {
        self.outputs.iter().map(|output| output.amount).collect()
    }

    fn to_bytes_size_hint(&self) -> usize {
        // A rough upper bound; serialization only uses it for capacity.
        32 + self.inputs.len() * 64 + self.outputs.len() * 48 + self.extra.len()
    }
}
