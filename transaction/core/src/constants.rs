// Copyright (c) 2025 The Quill Project

//! Transaction-level constants.

/// The transaction format version produced by this node.
pub const CURRENT_TRANSACTION_VERSION: u8 = 1;

/// Wire tag for a coinbase (base) input.
pub const TAG_BASE_INPUT: u8 = 0xff;

/// Wire tag for a key input.
pub const TAG_KEY_INPUT: u8 = 0x02;

/// Wire tag for a key output.
pub const TAG_KEY_OUTPUT: u8 = 0x02;

/// Maximum length of the extra-nonce field, in bytes.
///
/// The nonce length is carried in a single byte on the wire.
pub const TX_EXTRA_NONCE_MAX_COUNT: usize = 255;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonce_length_fits_in_a_byte() {
        assert!(TX_EXTRA_NONCE_MAX_COUNT <= u8::MAX as usize);
    }

    #[test]
    fn input_and_output_tags_are_disjoint_from_base() {
        assert_ne!(TAG_BASE_INPUT, TAG_KEY_INPUT);
    }
}
