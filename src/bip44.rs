// src/bip44.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    ADA_COIN_TYPE, BIP44_MAX_PATH_LENGTH, BIP44_MIN_ADDRESS_PATH_LENGTH, CHAIN_EXTERNAL,
    CHAIN_INTERNAL, CHAIN_STAKING, HARDENED_BIP32, MAX_REASONABLE_ACCOUNT,
    MAX_REASONABLE_ADDRESS, PURPOSE_BYRON, PURPOSE_MULTISIG, PURPOSE_SHELLEY,
};
use crate::error::{EngineError, PathError, Result};

// Indexes into a path
pub const BIP44_I_PURPOSE: usize = 0;
pub const BIP44_I_COIN_TYPE: usize = 1;
pub const BIP44_I_ACCOUNT: usize = 2;
pub const BIP44_I_CHAIN: usize = 3;
pub const BIP44_I_ADDRESS: usize = 4;

pub fn is_hardened(value: u32) -> bool {
    value & HARDENED_BIP32 != 0
}

pub fn harden(index: u32) -> u32 {
    index | HARDENED_BIP32
}

/// A single path segment: the lower 31 bits plus the hardening flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChildIndex(u32);

impl ChildIndex {
    /// Fails if `index` does not fit in 31 bits.
    pub fn new(index: u32, hardened: bool) -> Result<Self> {
        if index >= HARDENED_BIP32 {
            return Err(EngineError::DerivationFailure(format!(
                "path segment {} is out of range (must be below 2^31)",
                index
            )));
        }
        Ok(ChildIndex(if hardened { harden(index) } else { index }))
    }

    pub fn hardened(index: u32) -> Result<Self> {
        Self::new(index, true)
    }

    pub fn normal(index: u32) -> Result<Self> {
        Self::new(index, false)
    }

    /// Raw value as fed to the key derivation (hardening bit included).
    pub fn raw(&self) -> u32 {
        self.0
    }

    pub fn index(&self) -> u32 {
        self.0 & !HARDENED_BIP32
    }

    pub fn is_hardened(&self) -> bool {
        is_hardened(self.0)
    }
}

impl From<ChildIndex> for u32 {
    fn from(c: ChildIndex) -> u32 {
        c.0
    }
}

impl fmt::Display for ChildIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_hardened() {
            write!(f, "{}'", self.index())
        } else {
            write!(f, "{}", self.index())
        }
    }
}

/// What a path is going to be used for. Each role fixes the purpose and chain rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRole {
    ByronPayment,
    ShelleyPayment,
    ShelleyStaking,
    /// Key of a device-owned pubkey leaf inside a native script.
    ScriptKey,
}

impl PathRole {
    fn purposes(&self) -> &'static [u32] {
        match self {
            PathRole::ByronPayment => &[PURPOSE_BYRON],
            PathRole::ShelleyPayment | PathRole::ShelleyStaking => &[PURPOSE_SHELLEY],
            PathRole::ScriptKey => &[PURPOSE_SHELLEY, PURPOSE_MULTISIG],
        }
    }

    fn chains(&self) -> &'static [u32] {
        match self {
            PathRole::ByronPayment | PathRole::ShelleyPayment => &[CHAIN_EXTERNAL, CHAIN_INTERNAL],
            PathRole::ShelleyStaking => &[CHAIN_STAKING],
            PathRole::ScriptKey => &[CHAIN_EXTERNAL, CHAIN_INTERNAL, CHAIN_STAKING],
        }
    }
}

fn list_hardened(values: &[u32]) -> String {
    values.iter().map(|v| format!("{}'", v)).collect::<Vec<_>>().join(" or ")
}

fn list_plain(values: &[u32]) -> String {
    values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" or ")
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DerivationPath {
    segments: Vec<ChildIndex>,
}

impl DerivationPath {
    pub fn new(segments: Vec<ChildIndex>) -> Self {
        DerivationPath { segments }
    }

    pub fn segments(&self) -> &[ChildIndex] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    fn raw_at(&self, i: usize) -> Option<u32> {
        self.segments.get(i).map(|c| c.raw())
    }

    pub fn purpose(&self) -> Option<ChildIndex> {
        self.segments.get(BIP44_I_PURPOSE).copied()
    }

    pub fn account(&self) -> Option<ChildIndex> {
        self.segments.get(BIP44_I_ACCOUNT).copied()
    }

    pub fn chain(&self) -> Option<ChildIndex> {
        self.segments.get(BIP44_I_CHAIN).copied()
    }

    pub fn address(&self) -> Option<ChildIndex> {
        self.segments.get(BIP44_I_ADDRESS).copied()
    }

    pub fn is_byron(&self) -> bool {
        self.raw_at(BIP44_I_PURPOSE) == Some(harden(PURPOSE_BYRON))
    }

    /// Validates the path for the given role. Pure; never derives anything.
    pub fn validate(&self, role: PathRole) -> std::result::Result<(), PathError> {
        let depth = self.len();
        if depth < BIP44_MIN_ADDRESS_PATH_LENGTH {
            return Err(PathError::TooShort { depth, min: BIP44_MIN_ADDRESS_PATH_LENGTH });
        }
        if depth > BIP44_MAX_PATH_LENGTH {
            return Err(PathError::TooLong { depth, max: BIP44_MAX_PATH_LENGTH });
        }

        let purpose = self.segments[BIP44_I_PURPOSE];
        if !role.purposes().iter().any(|p| purpose.raw() == harden(*p)) {
            return Err(PathError::WrongPurpose {
                expected: list_hardened(role.purposes()),
                found: purpose.to_string(),
            });
        }

        let coin_type = self.segments[BIP44_I_COIN_TYPE];
        if coin_type.raw() != harden(ADA_COIN_TYPE) {
            return Err(PathError::WrongCoinType(coin_type.to_string()));
        }

        let account = self.segments[BIP44_I_ACCOUNT];
        if !account.is_hardened() {
            return Err(PathError::AccountNotHardened(account.to_string()));
        }

        let chain = self.segments[BIP44_I_CHAIN];
        if chain.is_hardened() || !role.chains().contains(&chain.raw()) {
            return Err(PathError::WrongChain {
                expected: list_plain(role.chains()),
                found: chain.to_string(),
            });
        }

        Ok(())
    }

    /// Whether the device would show the derived key without an extra warning.
    /// Expects a path that already passed `validate`.
    pub fn is_usual(&self, role: PathRole) -> bool {
        let reasonable_account = self
            .account()
            .is_some_and(|a| a.index() <= MAX_REASONABLE_ACCOUNT);

        let reasonable_address = match role {
            // legacy wallets used hardened address indices
            PathRole::ByronPayment => true,
            _ => self
                .address()
                .is_some_and(|a| !a.is_hardened() && a.index() <= MAX_REASONABLE_ADDRESS),
        };

        reasonable_account && reasonable_address && self.len() == BIP44_MIN_ADDRESS_PATH_LENGTH
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

fn parse_segment(elem: &str, text: &str) -> Result<ChildIndex> {
    let malformed = || EngineError::InvalidPath(PathError::Malformed(text.to_string()));
    if elem.is_empty() {
        return Err(malformed());
    }
    let hardened = elem.ends_with('\'') || elem.ends_with('h') || elem.ends_with('H');
    let digits = if hardened { &elem[..elem.len() - 1] } else { elem };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    let index: u64 = digits.parse().map_err(|_| malformed())?;
    let index = u32::try_from(index).map_err(|_| {
        EngineError::DerivationFailure(format!("path segment {} is out of range", digits))
    })?;
    ChildIndex::new(index, hardened)
}

impl FromStr for DerivationPath {
    type Err = EngineError;

    /// Parses "m/1852'/1815'/0'/0/1". The leading "m" is optional.
    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        if text.is_empty() {
            return Err(EngineError::InvalidPath(PathError::Malformed(s.to_string())));
        }
        let mut parts = text.split('/').peekable();
        if matches!(parts.peek(), Some(&"m") | Some(&"M")) {
            parts.next();
        }
        let segments = parts
            .map(|elem| parse_segment(elem, text))
            .collect::<Result<Vec<_>>>()?;
        Ok(DerivationPath { segments })
    }
}

impl TryFrom<String> for DerivationPath {
    type Error = EngineError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<DerivationPath> for String {
    fn from(path: DerivationPath) -> String {
        path.to_string()
    }
}
