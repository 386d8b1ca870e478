// Copyright (c) 2025 The Quill Project

//! Account key pairs and public addresses.
//!
//! A public address is the pair (A, B) of view and spend public keys. Its
//! string form is `quill://1/<base58(A || B)>`; the version segment allows
//! future format upgrades.

use core::{fmt, str::FromStr};
use displaydoc::Display;
use quill_crypto_keys::{KeyError, RistrettoPrivate, RistrettoPublic};
use rand_core::{CryptoRng, RngCore};

/// The address string prefix, including the format version.
pub const ADDRESS_PREFIX: &str = "quill://1/";

/// Errors which can occur when parsing an address string.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum AddressError {
    /// the address does not start with the `quill://1/` prefix
    InvalidPrefix,
    /// the address payload is not valid base58
    InvalidBase58,
    /// expected 64 bytes of key material, got `{0}`
    InvalidLength(usize),
    /// bad key material: `{0}`
    InvalidKey(KeyError),
}

impl std::error::Error for AddressError {}

impl From<KeyError> for AddressError {
    fn from(err: KeyError) -> Self {
        Self::InvalidKey(err)
    }
}

/// A user's public address: the view and spend public keys.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct PublicAddress {
    /// The public view key `A`.
    view_public_key: RistrettoPublic,
    /// The public spend key `B`.
    spend_public_key: RistrettoPublic,
}

impl PublicAddress {
    /// Create a public address from its two component keys.
    pub fn new(view_public_key: &RistrettoPublic, spend_public_key: &RistrettoPublic) -> Self {
        Self {
            view_public_key: *view_public_key,
            spend_public_key: *spend_public_key,
        }
    }

    /// The public view key.
    pub fn view_public_key(&self) -> &RistrettoPublic {
        &self.view_public_key
    }

    /// The public spend key.
    pub fn spend_public_key(&self) -> &RistrettoPublic {
        &self.spend_public_key
    }
}

impl fmt::Display for PublicAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut payload = [0u8; 64];
        payload[..32].copy_from_slice(&self.view_public_key.to_bytes());
        payload[32..].copy_from_slice(&self.spend_public_key.to_bytes());
        write!(f, "{ADDRESS_PREFIX}{}", bs58::encode(payload).into_string())
    }
}

impl fmt::Debug for PublicAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicAddress({self})")
    }
}

impl FromStr for PublicAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let payload = s
            .trim()
            .strip_prefix(ADDRESS_PREFIX)
            .ok_or(AddressError::InvalidPrefix)?;
        let bytes = bs58::decode(payload)
            .into_vec()
            .map_err(|_| AddressError::InvalidBase58)?;
        if bytes.len() != 64 {
            return Err(AddressError::InvalidLength(bytes.len()));
        }
        let view_public_key = RistrettoPublic::try_from(&bytes[..32])?;
        let spend_public_key = RistrettoPublic::try_from(&bytes[32..])?;
        Ok(Self {
            view_public_key,
            spend_public_key,
        })
    }
}

/// A complete account: the public address plus both secret keys.
///
/// This should only exist in client code and for embedded identities such
/// as the governance account.
#[derive(Clone, Debug)]
pub struct AccountKeys {
    /// The public address (A, B).
    pub address: PublicAddress,
    /// The view secret key `a`.
    pub view_secret_key: RistrettoPrivate,
    /// The spend secret key `b`.
    pub spend_secret_key: RistrettoPrivate,
}

impl AccountKeys {
    /// Assemble an account from its two secret keys.
    pub fn from_secrets(
        view_secret_key: RistrettoPrivate,
        spend_secret_key: RistrettoPrivate,
    ) -> Self {
        let address = PublicAddress::new(
            &RistrettoPublic::from(&view_secret_key),
            &RistrettoPublic::from(&spend_secret_key),
        );
        Self {
            address,
            view_secret_key,
            spend_secret_key,
        }
    }

    /// Sample a fresh random account.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self::from_secrets(
            RistrettoPrivate::from_random(rng),
            RistrettoPrivate::from_random(rng),
        )
    }
}
