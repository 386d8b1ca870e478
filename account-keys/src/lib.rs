// Copyright (c) 2025 The Quill Project

//! Quill account key structures.
//!
//! An account is a pair of key pairs: a view pair (a, A) used to recognise
//! owned outputs, and a spend pair (b, B) used to spend them. The public
//! half (A, B) is what senders see, wrapped in [`PublicAddress`] with a
//! URI-prefixed base58 string form.

#![deny(missing_docs)]

mod account_keys;

pub use crate::account_keys::{AccountKeys, AddressError, PublicAddress, ADDRESS_PREFIX};
