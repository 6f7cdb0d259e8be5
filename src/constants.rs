// src/constants.rs

// BIP-44 style path layout
pub const HARDENED_BIP32: u32 = 1 << 31;
pub const BIP44_MAX_PATH_LENGTH: usize = 10;
pub const BIP44_MIN_ADDRESS_PATH_LENGTH: usize = 5;

pub const PURPOSE_BYRON: u32 = 44;
pub const PURPOSE_SHELLEY: u32 = 1852;
pub const PURPOSE_MULTISIG: u32 = 1854;
pub const ADA_COIN_TYPE: u32 = 1815;

pub const CHAIN_EXTERNAL: u32 = 0;
pub const CHAIN_INTERNAL: u32 = 1;
pub const CHAIN_STAKING: u32 = 2;

// Beyond these the device asks for explicit confirmation.
pub const MAX_REASONABLE_ACCOUNT: u32 = 100;
pub const MAX_REASONABLE_ADDRESS: u32 = 1_000_000;

// Key material
pub const ED25519_SEED_KEY: &[u8] = b"ed25519 seed";
pub const PUBLIC_KEY_SIZE: usize = 32;
pub const CHAIN_CODE_SIZE: usize = 32;
pub const XPUB_SIZE: usize = PUBLIC_KEY_SIZE + CHAIN_CODE_SIZE;
pub const XPRV_SIZE: usize = 96;

/// Blake2b-224 output width; every key/script credential has this size.
pub const ADDRESS_KEY_HASH_LENGTH: usize = 28;

// Networks
pub const MAINNET_NETWORK_ID: u8 = 1;
pub const TESTNET_NETWORK_ID: u8 = 0;
pub const MAX_NETWORK_ID: u8 = 0b1111;

pub const MAINNET_PROTOCOL_MAGIC: u32 = 764_824_073;
pub const LEGACY_TESTNET_PROTOCOL_MAGIC: u32 = 1_097_911_063;
pub const PREPROD_PROTOCOL_MAGIC: u32 = 1;
pub const PREVIEW_PROTOCOL_MAGIC: u32 = 2;

// Byron address attribute keys
pub const BYRON_ATTRIBUTE_PROTOCOL_MAGIC: u8 = 2;

// Bech32 human readable prefixes
pub const HRP_ADDR: &str = "addr";
pub const HRP_ADDR_TEST: &str = "addr_test";
pub const HRP_STAKE: &str = "stake";
pub const HRP_STAKE_TEST: &str = "stake_test";
pub const HRP_SCRIPT_HASH: &str = "script";
pub const HRP_POLICY_ID: &str = "policy";

// Native scripts
pub const NATIVE_SCRIPT_LANGUAGE_TAG: u8 = 0x00;

pub const DEFAULT_MAX_SCRIPT_DEPTH: usize = 8;
pub const DEFAULT_MAX_SCRIPT_CHILDREN: usize = 64;
pub const DEFAULT_MAX_SCRIPT_NODES: usize = 256;
