// src/credential.rs

use pallas_crypto::hash::Hash;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::address::{AddressKind, AddressSpec, NetworkDescriptor};
use crate::bip44::{DerivationPath, PathRole};
use crate::constants::ADDRESS_KEY_HASH_LENGTH;
use crate::error::{EngineError, Result};
use crate::keys::{ExtendedPublicKey, RootKeyProvider};

/// On-chain reference to a stake registration certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pointer {
    pub block_index: u64,
    pub tx_index: u64,
    pub cert_index: u64,
}

impl std::str::FromStr for Pointer {
    type Err = EngineError;

    /// `block:tx:cert`
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || EngineError::Encoding(format!("expected pointer as BLOCK:TX:CERT, got '{}'", s));
        let parts = s
            .trim()
            .split(':')
            .map(|p| p.parse::<u64>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>>>()?;
        match parts.as_slice() {
            [block_index, tx_index, cert_index] => Ok(Pointer {
                block_index: *block_index,
                tx_index: *tx_index,
                cert_index: *cert_index,
            }),
            _ => Err(invalid()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    KeyHash(Hash<28>),
    ScriptHash(Hash<28>),
    Pointer(Pointer),
    /// Byron addresses embed the whole extended public key instead of a hash.
    ExtendedKey(ExtendedPublicKey),
    Absent,
}

impl Credential {
    pub fn describe(&self) -> &'static str {
        match self {
            Credential::KeyHash(_) => "key hash",
            Credential::ScriptHash(_) => "script hash",
            Credential::Pointer(_) => "pointer",
            Credential::ExtendedKey(_) => "extended key",
            Credential::Absent => "nothing",
        }
    }
}

/// What the caller hands in for one side of an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Path(DerivationPath),
    KeyHash(Vec<u8>),
    ScriptHash(Vec<u8>),
    Pointer(Pointer),
    None,
}

impl CredentialSource {
    /// Reads command line text for one side of a `kind` address: paths start
    /// with `m`, pointers are `BLOCK:TX:CERT`, anything else is a hex hash. A
    /// payment hash is a script hash; a staking hash is a key hash when the
    /// kind stakes to a key.
    pub fn parse_for(kind: AddressKind, staking: bool, text: &str) -> Result<Self> {
        let text = text.trim();
        if text.starts_with('m') || text.starts_with('M') {
            return Ok(CredentialSource::Path(text.parse()?));
        }
        if text.contains(':') {
            return Ok(CredentialSource::Pointer(text.parse()?));
        }
        let bytes = crate::encoding::decode_hex(text)?;
        let key_staking = matches!(
            kind,
            AddressKind::BasePaymentKeyStakeKey | AddressKind::BasePaymentScriptStakeKey | AddressKind::RewardKey
        );
        if staking && key_staking {
            Ok(CredentialSource::KeyHash(bytes))
        } else {
            Ok(CredentialSource::ScriptHash(bytes))
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            CredentialSource::Path(_) => "path",
            CredentialSource::KeyHash(_) => "key hash",
            CredentialSource::ScriptHash(_) => "script hash",
            CredentialSource::Pointer(_) => "pointer",
            CredentialSource::None => "nothing",
        }
    }
}

/// Validates a caller supplied hash as a 28 byte Blake2b-224 digest.
pub fn hash_from_slice(bytes: &[u8]) -> Result<Hash<28>> {
    let array: [u8; ADDRESS_KEY_HASH_LENGTH] = bytes.try_into().map_err(|_| EngineError::InvalidHashLength {
        expected: ADDRESS_KEY_HASH_LENGTH,
        actual: bytes.len(),
    })?;
    Ok(Hash::new(array))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    ByronPath,
    PaymentPath,
    StakingPath,
    StakingPathOrKeyHash,
    ScriptHash,
    Pointer,
    Nothing,
}

impl Expect {
    fn accepts(&self, source: &CredentialSource) -> bool {
        matches!(
            (self, source),
            (Expect::ByronPath, CredentialSource::Path(_))
                | (Expect::PaymentPath, CredentialSource::Path(_))
                | (Expect::StakingPath, CredentialSource::Path(_))
                | (Expect::StakingPathOrKeyHash, CredentialSource::Path(_))
                | (Expect::StakingPathOrKeyHash, CredentialSource::KeyHash(_))
                | (Expect::ScriptHash, CredentialSource::ScriptHash(_))
                | (Expect::Pointer, CredentialSource::Pointer(_))
                | (Expect::Nothing, CredentialSource::None)
        )
    }

    fn describe(&self) -> &'static str {
        match self {
            Expect::ByronPath => "a Byron path",
            Expect::PaymentPath => "a Shelley payment path",
            Expect::StakingPath => "a Shelley staking path",
            Expect::StakingPathOrKeyHash => "a Shelley staking path or a key hash",
            Expect::ScriptHash => "a script hash",
            Expect::Pointer => "a pointer",
            Expect::Nothing => "nothing",
        }
    }
}

/// The one pairing each kind allows, as (payment, staking).
fn pairing(kind: AddressKind) -> (Expect, Expect) {
    use AddressKind::*;
    match kind {
        Byron => (Expect::ByronPath, Expect::Nothing),
        BasePaymentKeyStakeKey => (Expect::PaymentPath, Expect::StakingPathOrKeyHash),
        BasePaymentScriptStakeKey => (Expect::ScriptHash, Expect::StakingPath),
        BasePaymentKeyStakeScript => (Expect::PaymentPath, Expect::ScriptHash),
        BasePaymentScriptStakeScript => (Expect::ScriptHash, Expect::ScriptHash),
        PointerKey => (Expect::PaymentPath, Expect::Pointer),
        PointerScript => (Expect::ScriptHash, Expect::Pointer),
        EnterpriseKey => (Expect::PaymentPath, Expect::Nothing),
        EnterpriseScript => (Expect::ScriptHash, Expect::Nothing),
        RewardKey => (Expect::Nothing, Expect::StakingPath),
        RewardScript => (Expect::Nothing, Expect::ScriptHash),
    }
}

fn check_pairing(kind: AddressKind, payment: &CredentialSource, staking: &CredentialSource) -> Result<()> {
    let (want_payment, want_staking) = pairing(kind);

    if kind == AddressKind::BasePaymentScriptStakeKey && matches!(staking, CredentialSource::KeyHash(_)) {
        return Err(EngineError::InvalidCredentialCombination {
            kind,
            reason: "a script payment credential cannot be paired with a supplied staking key hash".to_string(),
        });
    }

    for (slot, want, got) in [("payment", want_payment, payment), ("staking", want_staking, staking)] {
        if !want.accepts(got) {
            return Err(EngineError::InvalidCredentialCombination {
                kind,
                reason: format!("{} credential must be {}, got {}", slot, want.describe(), got.describe()),
            });
        }
    }
    Ok(())
}

/// Returns the path and the role it will be validated against, if the source is a path.
fn path_role(expect: Expect, source: &CredentialSource) -> Option<(&DerivationPath, PathRole)> {
    let role = match expect {
        Expect::ByronPath => PathRole::ByronPayment,
        Expect::PaymentPath => PathRole::ShelleyPayment,
        Expect::StakingPath | Expect::StakingPathOrKeyHash => PathRole::ShelleyStaking,
        _ => return None,
    };
    match source {
        CredentialSource::Path(path) => Some((path, role)),
        _ => None,
    }
}

fn resolve_one<K: RootKeyProvider + ?Sized>(keys: &K, expect: Expect, source: &CredentialSource) -> Result<Credential> {
    if let Some((path, role)) = path_role(expect, source) {
        return if role == PathRole::ByronPayment {
            Ok(Credential::ExtendedKey(keys.derive_xpub_for(path, role)?))
        } else {
            Ok(Credential::KeyHash(keys.derive_key_hash_for(path, role)?))
        };
    }
    match source {
        CredentialSource::KeyHash(bytes) => Ok(Credential::KeyHash(hash_from_slice(bytes)?)),
        CredentialSource::ScriptHash(bytes) => Ok(Credential::ScriptHash(hash_from_slice(bytes)?)),
        CredentialSource::Pointer(p) => Ok(Credential::Pointer(*p)),
        CredentialSource::None => Ok(Credential::Absent),
        // accepts() already ruled this out
        CredentialSource::Path(_) => Err(EngineError::DerivationFailure(
            "path given where no key is derived".to_string(),
        )),
    }
}

/// Checks that `kind` allows the given sources, validates every path and hash
/// before deriving anything, then resolves both sides. Fails as a whole.
pub fn resolve<K: RootKeyProvider + ?Sized>(
    keys: &K,
    network: NetworkDescriptor,
    kind: AddressKind,
    payment: &CredentialSource,
    staking: &CredentialSource,
) -> Result<AddressSpec> {
    // --- 1. Shape: the one pairing this kind allows ---
    check_pairing(kind, payment, staking)?;

    // --- 2. Validate both sides before touching any key ---
    let (want_payment, want_staking) = pairing(kind);
    for (want, source) in [(want_payment, payment), (want_staking, staking)] {
        if let Some((path, role)) = path_role(want, source) {
            path.validate(role)?;
        }
        if let CredentialSource::KeyHash(bytes) | CredentialSource::ScriptHash(bytes) = source {
            hash_from_slice(bytes)?;
        }
    }

    // --- 3. Derive ---
    let payment = resolve_one(keys, want_payment, payment)?;
    let staking = resolve_one(keys, want_staking, staking)?;
    debug!(%kind, payment = payment.describe(), staking = staking.describe(), "resolved credentials");

    Ok(AddressSpec { network, kind, payment, staking })
}

/// Every path in the request, paired with the role it was validated for.
pub fn request_paths<'a>(
    kind: AddressKind,
    payment: &'a CredentialSource,
    staking: &'a CredentialSource,
) -> Vec<(&'a DerivationPath, PathRole)> {
    let (want_payment, want_staking) = pairing(kind);
    [path_role(want_payment, payment), path_role(want_staking, staking)]
        .into_iter()
        .flatten()
        .collect()
}
