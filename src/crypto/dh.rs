// Custodian — Finite-field Diffie–Hellman
//
// Classic DH over a fixed prime group. The desktop side draws a fresh
// ephemeral exponent per handshake, sends `G^A mod P`, and combines the
// module's public value into the shared secret `B^A mod P`.

use std::fmt;

use num_bigint::BigUint;
use rand::RngCore;
use zeroize::Zeroizing;

use super::CryptoError;

/// Size of the ephemeral exponent in bits.
pub const EPHEMERAL_SECRET_BITS: usize = 2048;

const EPHEMERAL_SECRET_LEN: usize = EPHEMERAL_SECRET_BITS / 8;

/// The (generator, modulus) pair both sides agree on out of band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupParameters {
    generator: BigUint,
    modulus: BigUint,
}

impl GroupParameters {
    /// Build a group, rejecting parameters that would make exponentiation
    /// meaningless (tiny or even modulus, generator outside `[2, P-2]`).
    pub fn new(generator: BigUint, modulus: BigUint) -> Result<Self, CryptoError> {
        if modulus < BigUint::from(5u8) || !modulus.bit(0) {
            return Err(CryptoError::InvalidGroup(
                "modulus must be an odd integer greater than 3".to_string(),
            ));
        }
        let upper = &modulus - 2u8;
        if generator < BigUint::from(2u8) || generator > upper {
            return Err(CryptoError::InvalidGroup(
                "generator must lie in [2, P-2]".to_string(),
            ));
        }
        Ok(Self { generator, modulus })
    }

    /// Parse a group from a decimal generator and a hex modulus.
    pub fn from_hex(generator: u32, modulus_hex: &str) -> Result<Self, CryptoError> {
        let modulus = BigUint::parse_bytes(modulus_hex.trim().as_bytes(), 16)
            .ok_or_else(|| CryptoError::InvalidGroup("modulus is not valid hex".to_string()))?;
        Self::new(BigUint::from(generator), modulus)
    }

    pub fn generator(&self) -> &BigUint {
        &self.generator
    }

    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }
}

/// Per-handshake DH exponent. Lives only for the duration of one call.
pub struct EphemeralSecret {
    exponent: BigUint,
}

impl EphemeralSecret {
    /// Draw a uniformly random 2048-bit exponent from the OS-seeded RNG.
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new(vec![0u8; EPHEMERAL_SECRET_LEN]);
        rand::rng().fill_bytes(&mut bytes);
        Self {
            exponent: BigUint::from_bytes_be(&bytes),
        }
    }

    /// Use a caller-chosen exponent. Intended for known-answer tests.
    pub fn from_exponent(exponent: BigUint) -> Self {
        Self { exponent }
    }

    /// `G^A mod P`.
    pub fn public_value(&self, params: &GroupParameters) -> BigUint {
        dh_public_value(&self.exponent, params)
    }

    /// `B^A mod P`, after rejecting degenerate peer values.
    pub fn agree(
        &self,
        peer_public_value: &BigUint,
        params: &GroupParameters,
    ) -> Result<BigUint, CryptoError> {
        dh_shared_secret(peer_public_value, &self.exponent, params)
    }
}

impl fmt::Debug for EphemeralSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EphemeralSecret([REDACTED])")
    }
}

pub fn dh_public_value(secret: &BigUint, params: &GroupParameters) -> BigUint {
    params.generator.modpow(secret, &params.modulus)
}

/// Compute `peer^own mod P`.
///
/// Peer values of 0, 1, `P-1` (and anything not reduced mod `P`) confine the
/// shared secret to a trivial subgroup and are refused.
pub fn dh_shared_secret(
    peer_public_value: &BigUint,
    own_secret: &BigUint,
    params: &GroupParameters,
) -> Result<BigUint, CryptoError> {
    let upper = &params.modulus - 1u8;
    if *peer_public_value <= BigUint::from(1u8) || *peer_public_value >= upper {
        return Err(CryptoError::DegeneratePeerValue);
    }
    Ok(peer_public_value.modpow(own_secret, &params.modulus))
}

/// Minimal two's-complement big-endian encoding of a non-negative integer.
///
/// This is the representation the module hashes and measures: a leading
/// `0x00` is present whenever the top bit of the magnitude is set, and zero
/// encodes as a single `0x00` byte.
pub fn encode_signed_be(value: &BigUint) -> Vec<u8> {
    let mut bytes = value.to_bytes_be();
    if bytes.first().is_some_and(|b| b & 0x80 != 0) {
        bytes.insert(0, 0);
    }
    bytes
}

// ─── Tests ───────────────────────────────────────────────────────────────────
