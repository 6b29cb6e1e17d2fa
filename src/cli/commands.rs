// Custodian — CLI Command Handlers
//
// `create-key` and `retrieve-key` run one handshake through the configured
// module proxy and print the released key as hex on stdout. `vault-slot`
// is an offline helper.

use std::path::Path;

use crate::config::Settings;
use crate::error::CustodianError;
use crate::handshake::{Handshake, KeyRequest};
use crate::protocol::VaultId;
use crate::transport::{KeyMode, Pin};

use super::{Cli, Commands, KeyArgs};

/// Execute the parsed CLI command.
pub fn execute(cli: Cli) -> Result<(), CustodianError> {
    match cli.command {
        Commands::CreateKey(args) => cmd_key(KeyMode::CreateKey, args, cli.config.as_deref()),
        Commands::RetrieveKey(args) => cmd_key(KeyMode::RetrieveKey, args, cli.config.as_deref()),
        Commands::VaultSlot { identifier } => cmd_vault_slot(&identifier),
    }
}

fn cmd_key(mode: KeyMode, args: KeyArgs, config_path: Option<&Path>) -> Result<(), CustodianError> {
    let settings = apply_overrides(Settings::resolve(config_path)?, &args)?;
    let vault = args.vault.resolve()?;
    let request = KeyRequest::new(mode, args.serial, Pin::new(args.pin), vault);

    let handshake = Handshake::new(settings.handshake_config()?, settings.transport());
    let key = handshake.run(&request)?;

    println!("{}", key.to_hex().as_str());
    Ok(())
}

fn cmd_vault_slot(identifier: &str) -> Result<(), CustodianError> {
    let slot = VaultId::from_vault_identifier(identifier)?;
    println!("{}", slot);
    Ok(())
}

/// Command-line flags win over the settings file.
fn apply_overrides(mut settings: Settings, args: &KeyArgs) -> Result<Settings, CustodianError> {
    if let Some(ref proxy) = args.proxy {
        settings.proxy_executable = proxy.clone();
    }
    if let Some(secs) = args.timeout_secs {
        Settings::check_timeout(secs)?;
        settings.timeout_secs = secs;
    }
    Ok(settings)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
