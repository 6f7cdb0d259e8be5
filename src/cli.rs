// src/cli.rs

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "Derive Cardano addresses and native script hashes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// BIP-39 mnemonic phrase used as the root key.
    #[arg(long, global = true, conflicts_with = "mnemonic_file")]
    pub mnemonic: Option<String>,

    /// File containing the BIP-39 mnemonic phrase.
    #[arg(long, global = true)]
    pub mnemonic_file: Option<String>,

    /// Optional BIP-39 passphrase.
    #[arg(long, global = true, default_value = "")]
    pub passphrase: String,

    /// JSON engine configuration (script limits, default network).
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Derives a Byron or Shelley address.
    Address {
        /// Address kind: byron, base-key-key, base-script-key, base-key-script,
        /// base-script-script, pointer-key, pointer-script, enterprise-key,
        /// enterprise-script, reward-key, reward-script (or the header nibble).
        #[arg(long)]
        kind: String,

        /// mainnet, testnet, preprod, preview or ID:MAGIC. Defaults to the configured network.
        #[arg(long)]
        network: Option<String>,

        /// Payment credential: a derivation path or a 28 byte script hash in hex.
        #[arg(long)]
        payment: Option<String>,

        /// Staking credential: a derivation path, a 28 byte hash in hex, or a pointer BLOCK:TX:CERT.
        #[arg(long)]
        staking: Option<String>,
    },

    /// Prints the Blake2b-224 hash of the public key at a Shelley path.
    KeyHash {
        #[arg(long)]
        path: String,
    },

    /// Prints the extended public key (public key and chain code) at a path.
    Xpub {
        #[arg(long)]
        path: String,
    },

    /// Hashes a native script described in a JSON file.
    ScriptHash {
        #[arg(long)]
        script: String,

        /// bech32 (script1...) or policy-id (policy1...).
        #[arg(long, default_value = "bech32")]
        format: String,
    },
}
