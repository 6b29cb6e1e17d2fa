// Custodian — Configuration Module
//
// `HandshakeConfig` is the immutable input of every handshake: the DH group
// and the pinned module authority key. The protocol values are process-wide
// constants, parsed once. `Settings` layers an optional TOML file on top for
// the proxy location, timeout, and test or rotation overrides.

mod error;
mod settings;

use std::sync::LazyLock;

use num_bigint::BigUint;

use crate::crypto::{GroupParameters, TrustedModuleKey};

pub use error::ConfigError;
pub use settings::{Settings, MAX_TIMEOUT_SECS};

/// DH generator shared with the module.
pub const PROTOCOL_GENERATOR: u32 = 2;

/// DH modulus shared with the module (hex).
pub const PROTOCOL_MODULUS_HEX: &str = "008b3413e6cde53095290320e1bc37c198bb9ef023308c5ff5ef98b4afb0f429224ceee1ed42f32b290fe49f8f68a81f2e4b0d28998d5842f363da73c2858932148da345aec40b5122142404146e397861b92c597ea134729311673f18fa3e965d9476635173f3479d5438883a3a95dbe31dd2954ec7ee8d0da418effd683063e07";

/// Uncompressed secp256k1 point of the module authority.
pub const PROTOCOL_TRUSTED_KEY_HEX: &str = "0404e02e7c3a6c2013f67a2cc98be3d0b7824afff7d4f1b4deda3c111550f47d7184cbf869d5430ecc772b2cbb91ee185972138ad08c1ea4adc1518c8ccb6d6ac1";

static PROTOCOL_GROUP: LazyLock<GroupParameters> = LazyLock::new(|| {
    GroupParameters::from_hex(PROTOCOL_GENERATOR, PROTOCOL_MODULUS_HEX)
        .expect("protocol DH constants are valid")
});

static PROTOCOL_TRUSTED_KEY: LazyLock<TrustedModuleKey> = LazyLock::new(|| {
    TrustedModuleKey::from_sec1_hex(PROTOCOL_TRUSTED_KEY_HEX)
        .expect("protocol module key is a valid secp256k1 point")
});

/// Read-only parameters shared by every handshake.
#[derive(Debug, Clone)]
pub struct HandshakeConfig {
    group: GroupParameters,
    trusted_key: TrustedModuleKey,
}

impl HandshakeConfig {
    pub fn new(group: GroupParameters, trusted_key: TrustedModuleKey) -> Self {
        Self { group, trusted_key }
    }

    /// The constants every deployed module speaks.
    pub fn protocol_default() -> Self {
        Self {
            group: PROTOCOL_GROUP.clone(),
            trusted_key: PROTOCOL_TRUSTED_KEY.clone(),
        }
    }

    pub fn group(&self) -> &GroupParameters {
        &self.group
    }

    pub fn trusted_key(&self) -> &TrustedModuleKey {
        &self.trusted_key
    }

    pub fn with_group(mut self, group: GroupParameters) -> Self {
        self.group = group;
        self
    }

    pub fn with_trusted_key(mut self, trusted_key: TrustedModuleKey) -> Self {
        self.trusted_key = trusted_key;
        self
    }
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self::protocol_default()
    }
}

/// The protocol modulus, for callers that only override the generator.
pub(crate) fn protocol_modulus() -> BigUint {
    PROTOCOL_GROUP.modulus().clone()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
