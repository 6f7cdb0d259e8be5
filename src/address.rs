// src/address.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::byron;
use crate::constants::{
    LEGACY_TESTNET_PROTOCOL_MAGIC, MAINNET_NETWORK_ID, MAINNET_PROTOCOL_MAGIC, MAX_NETWORK_ID,
    PREPROD_PROTOCOL_MAGIC, PREVIEW_PROTOCOL_MAGIC, TESTNET_NETWORK_ID,
};
use crate::credential::Credential;
use crate::error::{EngineError, Result};
use crate::shelley;

/// Address type as carried in the upper nibble of the Shelley header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum AddressKind {
    BasePaymentKeyStakeKey = 0x0,
    BasePaymentScriptStakeKey = 0x1,
    BasePaymentKeyStakeScript = 0x2,
    BasePaymentScriptStakeScript = 0x3,
    PointerKey = 0x4,
    PointerScript = 0x5,
    EnterpriseKey = 0x6,
    EnterpriseScript = 0x7,
    Byron = 0x8,
    RewardKey = 0xE,
    RewardScript = 0xF,
}

impl AddressKind {
    pub const ALL: [AddressKind; 11] = [
        AddressKind::BasePaymentKeyStakeKey,
        AddressKind::BasePaymentScriptStakeKey,
        AddressKind::BasePaymentKeyStakeScript,
        AddressKind::BasePaymentScriptStakeScript,
        AddressKind::PointerKey,
        AddressKind::PointerScript,
        AddressKind::EnterpriseKey,
        AddressKind::EnterpriseScript,
        AddressKind::Byron,
        AddressKind::RewardKey,
        AddressKind::RewardScript,
    ];

    pub fn header_nibble(&self) -> u8 {
        *self as u8
    }

    pub fn from_nibble(nibble: u8) -> Result<Self> {
        AddressKind::ALL
            .iter()
            .copied()
            .find(|k| k.header_nibble() == nibble)
            .ok_or_else(|| EngineError::Encoding(format!("unknown address type {:#x}", nibble)))
    }

    pub fn is_byron(&self) -> bool {
        matches!(self, AddressKind::Byron)
    }

    pub fn is_reward(&self) -> bool {
        matches!(self, AddressKind::RewardKey | AddressKind::RewardScript)
    }

    /// Short name used on the command line and in logs.
    pub fn name(&self) -> &'static str {
        match self {
            AddressKind::BasePaymentKeyStakeKey => "base-key-key",
            AddressKind::BasePaymentScriptStakeKey => "base-script-key",
            AddressKind::BasePaymentKeyStakeScript => "base-key-script",
            AddressKind::BasePaymentScriptStakeScript => "base-script-script",
            AddressKind::PointerKey => "pointer-key",
            AddressKind::PointerScript => "pointer-script",
            AddressKind::EnterpriseKey => "enterprise-key",
            AddressKind::EnterpriseScript => "enterprise-script",
            AddressKind::Byron => "byron",
            AddressKind::RewardKey => "reward-key",
            AddressKind::RewardScript => "reward-script",
        }
    }
}

impl fmt::Display for AddressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AddressKind {
    type Err = EngineError;

    /// Accepts the short name or the numeric header nibble.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(kind) = AddressKind::ALL.iter().find(|k| k.name().eq_ignore_ascii_case(s)) {
            return Ok(*kind);
        }
        let nibble = if let Some(hex) = s.strip_prefix("0x") {
            u8::from_str_radix(hex, 16).ok()
        } else {
            s.parse::<u8>().ok()
        };
        match nibble {
            Some(n) => AddressKind::from_nibble(n),
            None => Err(EngineError::Encoding(format!("unknown address kind '{}'", s))),
        }
    }
}

/// Shelley network id plus the Byron protocol magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkDescriptor {
    pub network_id: u8,
    pub protocol_magic: u32,
}

impl NetworkDescriptor {
    pub const MAINNET: NetworkDescriptor =
        NetworkDescriptor { network_id: MAINNET_NETWORK_ID, protocol_magic: MAINNET_PROTOCOL_MAGIC };
    pub const LEGACY_TESTNET: NetworkDescriptor = NetworkDescriptor {
        network_id: TESTNET_NETWORK_ID,
        protocol_magic: LEGACY_TESTNET_PROTOCOL_MAGIC,
    };
    pub const PREPROD: NetworkDescriptor =
        NetworkDescriptor { network_id: TESTNET_NETWORK_ID, protocol_magic: PREPROD_PROTOCOL_MAGIC };
    pub const PREVIEW: NetworkDescriptor =
        NetworkDescriptor { network_id: TESTNET_NETWORK_ID, protocol_magic: PREVIEW_PROTOCOL_MAGIC };

    /// The network id must fit in the header's low nibble.
    pub fn new(network_id: u8, protocol_magic: u32) -> Result<Self> {
        if network_id > MAX_NETWORK_ID {
            return Err(EngineError::InvalidNetwork(format!(
                "network id {} does not fit in four bits",
                network_id
            )));
        }
        Ok(NetworkDescriptor { network_id, protocol_magic })
    }

    pub fn is_mainnet_magic(&self) -> bool {
        self.protocol_magic == MAINNET_PROTOCOL_MAGIC
    }

    pub fn is_testnet_id(&self) -> bool {
        self.network_id == TESTNET_NETWORK_ID
    }
}

impl FromStr for NetworkDescriptor {
    type Err = EngineError;

    /// A preset name or `ID:MAGIC`.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(NetworkDescriptor::MAINNET),
            "testnet" => Ok(NetworkDescriptor::LEGACY_TESTNET),
            "preprod" => Ok(NetworkDescriptor::PREPROD),
            "preview" => Ok(NetworkDescriptor::PREVIEW),
            other => {
                let invalid = || EngineError::InvalidNetwork(format!("expected a preset or ID:MAGIC, got '{}'", s));
                let (id, magic) = other.split_once(':').ok_or_else(invalid)?;
                let id = id.parse::<u8>().map_err(|_| invalid())?;
                let magic = magic.parse::<u32>().map_err(|_| invalid())?;
                NetworkDescriptor::new(id, magic)
            }
        }
    }
}

/// Fully resolved request. Built by the credential resolver, which enforces
/// the kind/credential pairing; the codecs only check what they need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressSpec {
    pub network: NetworkDescriptor,
    pub kind: AddressKind,
    pub payment: Credential,
    pub staking: Credential,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedAddress {
    pub kind: AddressKind,
    pub bytes: Vec<u8>,
    pub text: String,
}

impl DerivedAddress {
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

impl fmt::Display for DerivedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Byron and Shelley share nothing past this point.
pub fn encode_address(spec: &AddressSpec) -> Result<DerivedAddress> {
    let (bytes, text) = if spec.kind.is_byron() {
        let xpub = match &spec.payment {
            Credential::ExtendedKey(xpub) => xpub,
            other => {
                return Err(EngineError::InvalidCredentialCombination {
                    kind: spec.kind,
                    reason: format!("Byron addresses embed an extended key, got {}", other.describe()),
                });
            }
        };
        let bytes = byron::encode(xpub, &spec.network)?;
        let text = byron::to_base58(&bytes);
        (bytes, text)
    } else {
        let bytes = shelley::encode(spec)?;
        let text = shelley::to_bech32(spec.kind, &spec.network, &bytes)?;
        (bytes, text)
    };

    debug!(kind = %spec.kind, network_id = spec.network.network_id, len = bytes.len(), "encoded address");
    Ok(DerivedAddress { kind: spec.kind, bytes, text })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_and_nibbles() {
        for kind in AddressKind::ALL {
            assert_eq!(kind.name().parse::<AddressKind>().unwrap(), kind);
            assert_eq!(AddressKind::from_nibble(kind.header_nibble()).unwrap(), kind);
        }
        assert_eq!("14".parse::<AddressKind>().unwrap(), AddressKind::RewardKey);
        assert_eq!("0xf".parse::<AddressKind>().unwrap(), AddressKind::RewardScript);
        assert!("0x9".parse::<AddressKind>().is_err());
        assert!("franken".parse::<AddressKind>().is_err());
    }

    #[test]
    fn test_network_presets() {
        assert_eq!("mainnet".parse::<NetworkDescriptor>().unwrap(), NetworkDescriptor::MAINNET);
        assert_eq!("Preprod".parse::<NetworkDescriptor>().unwrap().protocol_magic, 1);
        let custom: NetworkDescriptor = "3:47".parse().unwrap();
        assert_eq!(custom, NetworkDescriptor { network_id: 3, protocol_magic: 47 });
        assert!(matches!("16:1".parse::<NetworkDescriptor>(), Err(EngineError::InvalidNetwork(_))));
        assert!(matches!("moon".parse::<NetworkDescriptor>(), Err(EngineError::InvalidNetwork(_))));
    }

    #[test]
    fn test_byron_requires_extended_key() {
        let spec = AddressSpec {
            network: NetworkDescriptor::MAINNET,
            kind: AddressKind::Byron,
            payment: Credential::KeyHash(pallas_crypto::hash::Hash::new([0u8; 28])),
            staking: Credential::Absent,
        };
        assert!(matches!(
            encode_address(&spec),
            Err(EngineError::InvalidCredentialCombination { .. })
        ));
    }
}
