// Custodian — Vault slot identifiers
//
// The module stores keys in numbered slots 1..=999. Desktop vaults carry a
// base64url identifier of their own, which is folded onto a slot by taking
// its first two decoded bytes as a big-endian integer.

use std::fmt;
use std::str::FromStr;

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

use super::ParseError;

pub const VAULT_ID_MIN: u16 = 1;
pub const VAULT_ID_MAX: u16 = 999;

const URL_SAFE_ANY_PADDING: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A module vault slot in `[1, 999]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VaultId(u16);

impl VaultId {
    pub fn new(slot: u16) -> Result<Self, ParseError> {
        if !(VAULT_ID_MIN..=VAULT_ID_MAX).contains(&slot) {
            return Err(ParseError::VaultSlotOutOfRange(u64::from(slot)));
        }
        Ok(Self(slot))
    }

    /// Map a desktop vault identifier (base64url) onto a module slot:
    /// `1 + (u16::from_be_bytes(first two bytes) % 999)`.
    pub fn from_vault_identifier(identifier: &str) -> Result<Self, ParseError> {
        let bytes = URL_SAFE_ANY_PADDING
            .decode(identifier.trim())
            .map_err(|e| ParseError::InvalidVaultIdentifier(e.to_string()))?;
        if bytes.len() < 2 {
            return Err(ParseError::InvalidVaultIdentifier(format!(
                "decodes to {} bytes, need at least 2",
                bytes.len()
            )));
        }
        let folded = u16::from_be_bytes([bytes[0], bytes[1]]) % VAULT_ID_MAX;
        Ok(Self(VAULT_ID_MIN + folded))
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for VaultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VaultId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let slot: u64 = s
            .trim()
            .parse()
            .map_err(|_| ParseError::InvalidVaultIdentifier(format!("'{}' is not a slot number", s)))?;
        let slot = u16::try_from(slot).map_err(|_| ParseError::VaultSlotOutOfRange(slot))?;
        Self::new(slot)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
