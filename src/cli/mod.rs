// Custodian — CLI Module
//
// Command-line interface using clap derive macros.
// Subcommands: create-key, retrieve-key, vault-slot.

mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::protocol::{ParseError, VaultId};

pub use commands::execute;

/// Custodian — obtain vault keys from a hardware key custodian.
#[derive(Parser, Debug)]
#[command(name = "custodian")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Settings file (defaults to <config dir>/custodian/config.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask the module to generate and store a new key for a vault.
    CreateKey(KeyArgs),

    /// Fetch the stored key of an existing vault from the module.
    RetrieveKey(KeyArgs),

    /// Print the module slot a desktop vault identifier maps to.
    VaultSlot {
        /// The vault identifier (base64url).
        identifier: String,
    },
}

#[derive(Args, Debug)]
pub struct KeyArgs {
    /// Serial number of the module to talk to.
    #[arg(long)]
    pub serial: String,

    #[command(flatten)]
    pub vault: VaultArgs,

    /// Module PIN. Prefer the environment variable to keep it out of shell history.
    #[arg(long, env = "CUSTODIAN_PIN", hide_env_values = true)]
    pub pin: String,

    /// Module proxy executable (overrides the settings file).
    #[arg(long)]
    pub proxy: Option<PathBuf>,

    /// Exchange timeout in seconds (overrides the settings file).
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

/// Exactly one way of naming the vault.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct VaultArgs {
    /// Module slot number, 1..=999.
    #[arg(long)]
    pub slot: Option<VaultId>,

    /// Desktop vault identifier (base64url), folded onto a slot.
    #[arg(long)]
    pub vault_id: Option<String>,
}

impl VaultArgs {
    /// The slot named on the command line, folding a vault identifier if
    /// that is what was given.
    pub fn resolve(&self) -> Result<VaultId, ParseError> {
        match (self.slot, self.vault_id.as_deref()) {
            (Some(slot), _) => Ok(slot),
            (None, Some(identifier)) => VaultId::from_vault_identifier(identifier),
            (None, None) => Err(ParseError::InvalidVaultIdentifier(
                "either --slot or --vault-id is required".to_string(),
            )),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
