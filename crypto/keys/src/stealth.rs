// Copyright (c) 2025 The Quill Project

//! One-time output key primitives.
//!
//! Quill coinbase outputs are stealth outputs. For a recipient with public
//! address (C, D), where C is the view public key and D the spend public
//! key, the sender:
//!
//! - picks an ephemeral transaction key pair (r, R = r * G),
//! - computes the shared derivation `r * C`,
//! - derives the output key at index i as `P_i = Hs(r * C || i) * G + D`.
//!
//! The recipient recomputes the derivation as `a * R` (with view secret a,
//! by Diffie-Hellman symmetry), recognises outputs by recomputing `P_i`,
//! and recovers the spend scalar as `Hs(a * R || i) + d`.

use crate::{hash_to_scalar, RistrettoPrivate, RistrettoPublic};
use curve25519_dalek::{constants::RISTRETTO_BASEPOINT_POINT, ristretto::RistrettoPoint};

/// Domain separator for the per-output hash-to-scalar.
const OUTPUT_KEY_DOMAIN: &[u8] = b"quill-output-key";

/// The Diffie-Hellman shared point between a transaction key and an
/// address key.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct KeyDerivation(RistrettoPoint);

impl KeyDerivation {
    /// The 32-byte compressed form of the derivation point.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.compress().to_bytes()
    }
}

/// Compute the shared derivation between `public` and `secret`.
///
/// `generate_key_derivation(B, a) == generate_key_derivation(A, b)` when
/// `A = a * G` and `B = b * G`.
pub fn generate_key_derivation(
    public: &RistrettoPublic,
    secret: &RistrettoPrivate,
) -> KeyDerivation {
    KeyDerivation(public.point() * secret.scalar())
}

/// Derive the one-time public key for output `output_index`,
/// `Hs(derivation || i) * G + spend_public`.
pub fn derive_public_key(
    derivation: &KeyDerivation,
    output_index: u64,
    spend_public: &RistrettoPublic,
) -> RistrettoPublic {
    let scalar = hash_to_scalar(
        OUTPUT_KEY_DOMAIN,
        &[&derivation.to_bytes(), &output_index.to_le_bytes()],
    );
    RistrettoPublic::from_point(RISTRETTO_BASEPOINT_POINT * scalar + spend_public.point())
}

/// Derive the one-time secret key for output `output_index`,
/// `Hs(derivation || i) + spend_secret`.
///
/// Only the recipient can compute this; it is the spending counterpart of
/// [`derive_public_key`].
pub fn derive_secret_key(
    derivation: &KeyDerivation,
    output_index: u64,
    spend_secret: &RistrettoPrivate,
) -> RistrettoPrivate {
    let scalar = hash_to_scalar(
        OUTPUT_KEY_DOMAIN,
        &[&derivation.to_bytes(), &output_index.to_le_bytes()],
    );
    RistrettoPrivate::from_scalar(scalar + spend_secret.scalar())
}
