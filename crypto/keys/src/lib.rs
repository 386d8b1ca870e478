// Copyright (c) 2025 The Quill Project

//! Ristretto key types for Quill.
//!
//! Every key the consensus core touches is one of the types defined here:
//! a private scalar, a public Ristretto point, or the 32-byte compressed
//! wire form of a public point. Decompression is the only fallible
//! conversion; everything downstream operates on already-validated points.
//!
//! The [`stealth`] module holds the one-time output key primitives
//! (derivation, per-index output keys) built on these types.

#![deny(missing_docs)]

pub mod stealth;

use core::{
    fmt,
    hash::{Hash, Hasher},
};
use curve25519_dalek::{
    constants::RISTRETTO_BASEPOINT_POINT,
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
};
use displaydoc::Display;
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Errors which can occur when handling key material.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum KeyError {
    /// the bytes are not a valid ristretto point
    InvalidPoint,
    /// expected 32 bytes of key material, got `{0}`
    LengthMismatch(usize),
}

impl std::error::Error for KeyError {}

/// A private key: a Ristretto scalar.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct RistrettoPrivate(Scalar);

impl RistrettoPrivate {
    /// Sample a fresh private key from a cryptographic rng.
    pub fn from_random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 64];
        rng.fill_bytes(&mut bytes);
        let scalar = Scalar::from_bytes_mod_order_wide(&bytes);
        bytes.zeroize();
        Self(scalar)
    }

    /// Derive a private key deterministically from a seed.
    ///
    /// Used for identities that are fixed at build time, such as the
    /// governance account. The seed is domain-separated before hashing.
    pub fn from_seed(seed: &[u8]) -> Self {
        Self(hash_to_scalar(b"quill-key-seed", &[seed]))
    }

    /// The canonical 32-byte little-endian form of the scalar.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    pub(crate) fn scalar(&self) -> &Scalar {
        &self.0
    }

    pub(crate) fn from_scalar(scalar: Scalar) -> Self {
        Self(scalar)
    }
}

impl fmt::Debug for RistrettoPrivate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RistrettoPrivate(<redacted>)")
    }
}

/// A public key: a Ristretto point.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct RistrettoPublic(RistrettoPoint);

impl RistrettoPublic {
    /// The 32-byte compressed form of the point.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.compress().to_bytes()
    }

    pub(crate) fn point(&self) -> &RistrettoPoint {
        &self.0
    }

    pub(crate) fn from_point(point: RistrettoPoint) -> Self {
        Self(point)
    }
}

impl From<&RistrettoPrivate> for RistrettoPublic {
    fn from(private: &RistrettoPrivate) -> Self {
        Self(RISTRETTO_BASEPOINT_POINT * private.0)
    }
}

impl TryFrom<&[u8; 32]> for RistrettoPublic {
    type Error = KeyError;

    fn try_from(bytes: &[u8; 32]) -> Result<Self, Self::Error> {
        CompressedRistretto(*bytes)
            .decompress()
            .map(Self)
            .ok_or(KeyError::InvalidPoint)
    }
}

impl TryFrom<&[u8]> for RistrettoPublic {
    type Error = KeyError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let bytes: &[u8; 32] = bytes
            .try_into()
            .map_err(|_| KeyError::LengthMismatch(bytes.len()))?;
        Self::try_from(bytes)
    }
}

impl TryFrom<&CompressedPublicKey> for RistrettoPublic {
    type Error = KeyError;

    fn try_from(compressed: &CompressedPublicKey) -> Result<Self, Self::Error> {
        Self::try_from(&compressed.0)
    }
}

// Hashed via the compressed form so that equal points always collide.
impl Hash for RistrettoPublic {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_bytes().hash(state)
    }
}

impl fmt::Debug for RistrettoPublic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RistrettoPublic(")?;
        for byte in self.to_bytes() {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

/// The 32-byte compressed wire form of a public key.
///
/// This is what transactions carry. It is not validated on construction;
/// conversion to [`RistrettoPublic`] is where decompression can fail.
#[derive(
    Clone, Copy, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct CompressedPublicKey(pub [u8; 32]);

impl From<&RistrettoPublic> for CompressedPublicKey {
    fn from(public: &RistrettoPublic) -> Self {
        Self(public.to_bytes())
    }
}

impl AsRef<[u8]> for CompressedPublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for CompressedPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for CompressedPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompressedPublicKey({self})")
    }
}

/// An ephemeral (secret, public) key pair.
#[derive(Clone, Debug)]
pub struct KeyPair {
    /// The public half, `secret * G`.
    pub public_key: RistrettoPublic,
    /// The secret half.
    pub secret_key: RistrettoPrivate,
}

impl KeyPair {
    /// Generate a fresh key pair from a cryptographic rng.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let secret_key = RistrettoPrivate::from_random(rng);
        let public_key = RistrettoPublic::from(&secret_key);
        Self {
            public_key,
            secret_key,
        }
    }
}

/// Hash arbitrary data to a scalar, with a domain separator.
pub(crate) fn hash_to_scalar(domain: &[u8], data: &[&[u8]]) -> Scalar {
    let mut hasher = Sha512::new();
    hasher.update(domain);
    for piece in data {
        hasher.update(piece);
    }
    let mut wide = [0u8; 64];
    wide.copy_from_slice(&hasher.finalize());
    Scalar::from_bytes_mod_order_wide(&wide)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn public_key_compression_round_trip() {
        let mut rng: StdRng = SeedableRng::from_seed([7u8; 32]);
        let pair = KeyPair::generate(&mut rng);

        let compressed = CompressedPublicKey::from(&pair.public_key);
        let recovered = RistrettoPublic::try_from(&compressed).unwrap();
        assert_eq!(recovered, pair.public_key);
    }

    #[test]
    fn invalid_point_rejected() {
        // 2^255 - 1 is not a canonical field element, so this cannot
        // decompress.
        let bytes = [0xffu8; 32];
        assert_eq!(
            RistrettoPublic::try_from(&bytes),
            Err(KeyError::InvalidPoint)
        );
    }

    #[test]
    fn wrong_length_rejected() {
        let bytes = [0u8; 31];
        assert_eq!(
            RistrettoPublic::try_from(&bytes[..]),
            Err(KeyError::LengthMismatch(31))
        );
    }

    #[test]
    fn seed_derivation_is_deterministic() {
        let a = RistrettoPrivate::from_seed(b"governance");
        let b = RistrettoPrivate::from_seed(b"governance");
        let c = RistrettoPrivate::from_seed(b"other");

        assert_eq!(a.to_bytes(), b.to_bytes());
        assert_ne!(a.to_bytes(), c.to_bytes());
    }

    #[test]
    fn distinct_seeds_distinct_public_keys() {
        let a = RistrettoPublic::from(&RistrettoPrivate::from_seed(b"a"));
        let b = RistrettoPublic::from(&RistrettoPrivate::from_seed(b"b"));
        assert_ne!(a, b);
    }
}
