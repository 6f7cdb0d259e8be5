// src/cli_commands.rs

use cardano_derive_lib::{
    AddressKind, CredentialSource, DerivationPath, DisplayFormat, Engine, EngineConfig, MnemonicRootKey,
    NativeScript, NetworkDescriptor, SecurityPolicy,
};

use crate::cli::{Cli, Commands};

fn read_mnemonic(cli: &Cli) -> Result<String, String> {
    if let Some(mnemonic) = cli.mnemonic.clone() {
        Ok(mnemonic)
    } else if let Some(mnemonic_file) = cli.mnemonic_file.as_ref() {
        std::fs::read_to_string(mnemonic_file).map_err(|e| format!("Could not read mnemonic from file: {}", e))
    } else {
        Err("Provide '--mnemonic' or '--mnemonic-file'.".to_string())
    }
}

fn load_config(cli: &Cli) -> Result<EngineConfig, String> {
    match cli.config.as_ref() {
        Some(path) => EngineConfig::load(path).map_err(|e| e.to_string()),
        None => Ok(EngineConfig::default()),
    }
}

fn build_engine(cli: &Cli) -> Result<Engine<MnemonicRootKey>, String> {
    let config = load_config(cli)?;
    let mnemonic = read_mnemonic(cli)?;
    let keys = MnemonicRootKey::from_mnemonic(&mnemonic, &cli.passphrase).map_err(|e| e.to_string())?;
    Ok(Engine::new(keys, config))
}

fn print_policy(policy: SecurityPolicy) {
    if policy == SecurityPolicy::PromptWarnUnusual {
        println!("WARNING: unusual derivation path, the device would ask for confirmation.");
    }
}

fn parse_path(text: &str) -> Result<DerivationPath, String> {
    text.parse::<DerivationPath>().map_err(|e| e.to_string())
}

fn source(kind: AddressKind, staking: bool, text: Option<&String>) -> Result<CredentialSource, String> {
    match text {
        Some(t) => CredentialSource::parse_for(kind, staking, t).map_err(|e| e.to_string()),
        None => Ok(CredentialSource::None),
    }
}

pub fn run_command(cli: &Cli) -> Result<(), String> {
    let engine = build_engine(cli)?;

    match &cli.command {
        Commands::Address { kind, network, payment, staking } => {
            let kind = kind.parse::<AddressKind>().map_err(|e| e.to_string())?;
            let network = match network {
                Some(n) => n.parse::<NetworkDescriptor>().map_err(|e| e.to_string())?,
                None => engine.config().default_network,
            };
            let payment = source(kind, false, payment.as_ref())?;
            let staking = source(kind, true, staking.as_ref())?;

            let response = engine
                .derive_address(network, kind, &payment, &staking)
                .map_err(|e| e.to_string())?;
            print_policy(response.policy);
            println!("{}", response.address);
        }
        Commands::KeyHash { path } => {
            let path = parse_path(path)?;
            let hash = engine.derive_key_hash(&path).map_err(|e| e.to_string())?;
            println!("{}", hash);
        }
        Commands::Xpub { path } => {
            let path = parse_path(path)?;
            let response = engine.extended_public_key(&path).map_err(|e| e.to_string())?;
            print_policy(response.policy);
            println!("{}", response.xpub.to_hex());
        }
        Commands::ScriptHash { script, format } => {
            let text = std::fs::read_to_string(script).map_err(|e| format!("Could not read script file: {}", e))?;
            let script = NativeScript::from_json(&text).map_err(|e| e.to_string())?;
            let format = format.parse::<DisplayFormat>().map_err(|e| e.to_string())?;
            let output = engine.hash_script(&script, format).map_err(|e| e.to_string())?;
            println!("{}", output.to_hex());
            println!("{}", output.text);
        }
    }
    Ok(())
}
