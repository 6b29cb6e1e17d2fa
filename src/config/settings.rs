// Custodian — Settings file
//
// Optional TOML file, by default `<config_dir>/custodian/config.toml`:
//
//   proxy_executable = "/opt/module/comm-middleware"
//   proxy_working_dir = "/opt/module"
//   timeout_secs = 30
//   # Overrides for test benches or a rotated authority key:
//   trusted_key = "04..."
//   generator = 2
//   modulus = "00ff..."

use std::path::{Path, PathBuf};
use std::time::Duration;

use num_bigint::BigUint;
use serde::Deserialize;

use super::{protocol_modulus, ConfigError, HandshakeConfig};
use crate::crypto::{GroupParameters, TrustedModuleKey};
use crate::transport::{ProcessTransport, DEFAULT_PROXY_EXECUTABLE, DEFAULT_TIMEOUT};

/// Upper bound on `timeout_secs`, from the file or the command line.
pub const MAX_TIMEOUT_SECS: u64 = 3600;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Module proxy executable.
    pub proxy_executable: PathBuf,
    /// Directory the proxy is started from.
    pub proxy_working_dir: Option<PathBuf>,
    /// Upper bound on one exchange with the proxy.
    pub timeout_secs: u64,
    /// Uncompressed SEC1 hex of the module authority key.
    pub trusted_key: Option<String>,
    pub generator: Option<u32>,
    /// DH modulus in hex.
    pub modulus: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            proxy_executable: PathBuf::from(DEFAULT_PROXY_EXECUTABLE),
            proxy_working_dir: None,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            trusted_key: None,
            generator: None,
            modulus: None,
        }
    }
}

impl Settings {
    /// `<config_dir>/custodian/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs_next::config_dir().map(|dir| dir.join("custodian").join("config.toml"))
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(text)?;
        Self::check_timeout(settings.timeout_secs)?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Load an explicitly requested file, or the default file if present,
    /// or fall back to built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            tracing::debug!(path = %path.display(), "Loading settings");
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => {
                tracing::debug!(path = %path.display(), "Loading settings");
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Reject timeouts of zero or above [`MAX_TIMEOUT_SECS`].
    pub fn check_timeout(secs: u64) -> Result<(), ConfigError> {
        match secs {
            0 => Err(ConfigError::ZeroTimeout),
            secs if secs > MAX_TIMEOUT_SECS => Err(ConfigError::TimeoutTooLarge {
                secs,
                max: MAX_TIMEOUT_SECS,
            }),
            _ => Ok(()),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Protocol constants with any overrides from this file applied.
    pub fn handshake_config(&self) -> Result<HandshakeConfig, ConfigError> {
        let mut config = HandshakeConfig::protocol_default();

        if self.generator.is_some() || self.modulus.is_some() {
            let generator = BigUint::from(self.generator.unwrap_or(super::PROTOCOL_GENERATOR));
            let modulus = match self.modulus {
                Some(ref hex_modulus) => BigUint::parse_bytes(hex_modulus.trim().as_bytes(), 16)
                    .ok_or_else(|| {
                        crate::crypto::CryptoError::InvalidGroup(
                            "modulus is not valid hex".to_string(),
                        )
                    })?,
                None => protocol_modulus(),
            };
            tracing::warn!("Using non-default DH group from settings");
            config = config.with_group(GroupParameters::new(generator, modulus)?);
        }

        if let Some(ref key) = self.trusted_key {
            tracing::warn!("Using non-default module authority key from settings");
            config = config.with_trusted_key(TrustedModuleKey::from_sec1_hex(key)?);
        }

        Ok(config)
    }

    pub fn transport(&self) -> ProcessTransport {
        let transport = ProcessTransport::new(&self.proxy_executable).with_timeout(self.timeout());
        match self.proxy_working_dir {
            Some(ref dir) => transport.with_working_dir(dir),
            None => transport,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
