// src/keys.rs

use bip39::Mnemonic;
use ed25519_bip32::{DerivationScheme, XPrv, XPub};
use hmac::{Hmac, Mac};
use pallas_crypto::hash::{Hash, Hasher};
use sha2::{Sha256, Sha512};
use tracing::{debug, trace};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::bip44::{ChildIndex, DerivationPath, PathRole};
use crate::constants::{CHAIN_CODE_SIZE, ED25519_SEED_KEY, PUBLIC_KEY_SIZE, XPRV_SIZE, XPUB_SIZE};
use crate::error::{EngineError, Result};

type HmacSha512 = Hmac<Sha512>;
type HmacSha256 = Hmac<Sha256>;

pub type KeyHash = Hash<28>;

/// Blake2b-224 of a 32 byte Ed25519 public key.
pub fn key_hash(public_key: &[u8]) -> KeyHash {
    Hasher::<224>::hash(public_key)
}

fn derivation_failure(what: &str, e: impl std::fmt::Debug) -> EngineError {
    EngineError::DerivationFailure(format!("{}: {:?}", what, e))
}

/// 32 byte public key followed by the 32 byte chain code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtendedPublicKey([u8; XPUB_SIZE]);

impl ExtendedPublicKey {
    pub fn from_bytes(bytes: [u8; XPUB_SIZE]) -> Self {
        ExtendedPublicKey(bytes)
    }

    fn from_xpub(xpub: &XPub) -> Result<Self> {
        let bytes: [u8; XPUB_SIZE] = xpub
            .as_ref()
            .try_into()
            .map_err(|e| derivation_failure("unexpected xpub size", e))?;
        Ok(ExtendedPublicKey(bytes))
    }

    pub fn public_key(&self) -> &[u8] {
        &self.0[..PUBLIC_KEY_SIZE]
    }

    pub fn chain_code(&self) -> &[u8] {
        &self.0[PUBLIC_KEY_SIZE..PUBLIC_KEY_SIZE + CHAIN_CODE_SIZE]
    }

    pub fn as_bytes(&self) -> &[u8; XPUB_SIZE] {
        &self.0
    }

    pub fn key_hash(&self) -> KeyHash {
        key_hash(self.public_key())
    }

    /// Derives a child using only public material. Hardened segments are refused.
    pub fn derive_public(&self, segments: &[ChildIndex]) -> Result<ExtendedPublicKey> {
        let mut xpub = XPub::from_bytes(self.0);
        for segment in segments {
            if segment.is_hardened() {
                return Err(EngineError::DerivationFailure(format!(
                    "cannot derive hardened segment {} from a public key",
                    segment
                )));
            }
            xpub = xpub
                .derive(DerivationScheme::V2, segment.raw())
                .map_err(|e| derivation_failure("public derivation", e))?;
        }
        ExtendedPublicKey::from_xpub(&xpub)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// Source of the root key material. The device keeps its seed elsewhere; the
/// engine only ever asks for the root extended private key.
pub trait RootKeyProvider {
    fn root_xprv(&self) -> Result<XPrv>;

    /// Walks the path from the root, always through the private branch.
    fn derive_xprv(&self, path: &DerivationPath) -> Result<XPrv> {
        let mut key = self.root_xprv()?;
        for segment in path.segments() {
            key = key.derive(DerivationScheme::V2, segment.raw());
        }
        trace!(path = %path, "derived private key");
        Ok(key)
    }

    fn derive_xpub(&self, path: &DerivationPath) -> Result<ExtendedPublicKey> {
        let xprv = self.derive_xprv(path)?;
        ExtendedPublicKey::from_xpub(&xprv.public())
    }

    fn derive_key_hash(&self, path: &DerivationPath) -> Result<KeyHash> {
        Ok(self.derive_xpub(path)?.key_hash())
    }

    /// Validates the path for `role` before deriving anything.
    fn derive_xpub_for(&self, path: &DerivationPath, role: PathRole) -> Result<ExtendedPublicKey> {
        path.validate(role)?;
        self.derive_xpub(path)
    }

    fn derive_key_hash_for(&self, path: &DerivationPath, role: PathRole) -> Result<KeyHash> {
        Ok(self.derive_xpub_for(path, role)?.key_hash())
    }
}

fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> Result<Zeroizing<[u8; 64]>> {
    let mut mac = HmacSha512::new_from_slice(key).map_err(|e| derivation_failure("hmac key", e))?;
    for part in parts {
        mac.update(part);
    }
    let mut out = Zeroizing::new([0u8; 64]);
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

fn hmac_sha256(key: &[u8], parts: &[&[u8]]) -> Result<Zeroizing<[u8; 32]>> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|e| derivation_failure("hmac key", e))?;
    for part in parts {
        mac.update(part);
    }
    let mut out = Zeroizing::new([0u8; 32]);
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

/// Root key generated from a BIP-39 mnemonic the way the hardware wallet does it.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MnemonicRootKey {
    root: [u8; XPRV_SIZE],
}

impl MnemonicRootKey {
    pub fn from_mnemonic(phrase: &str, passphrase: &str) -> Result<Self> {
        let normalized = phrase.split_whitespace().collect::<Vec<_>>().join(" ");
        let mnemonic = Mnemonic::parse_normalized(&normalized)
            .map_err(|e| EngineError::DerivationFailure(format!("invalid mnemonic: {}", e)))?;
        let seed = Zeroizing::new(mnemonic.to_seed_normalized(passphrase));
        debug!(words = mnemonic.word_count(), "root key from mnemonic");
        Self::from_seed(&seed[..])
    }

    /// I = HMAC-SHA512("ed25519 seed", seed), re-hashed until bit 5 of I[31] is
    /// clear, then clamped; the chain code is HMAC-SHA256("ed25519 seed", 1 || seed).
    pub fn from_seed(seed: &[u8]) -> Result<Self> {
        let mut i = hmac_sha512(ED25519_SEED_KEY, &[seed])?;
        while i[31] & 0x20 != 0 {
            i = hmac_sha512(ED25519_SEED_KEY, &[&i[..]])?;
        }

        let mut root = [0u8; XPRV_SIZE];
        root[..64].copy_from_slice(&i[..]);
        root[0] &= 0xf8;
        root[31] &= 0x7f;
        root[31] |= 0x40;

        let chain_code = hmac_sha256(ED25519_SEED_KEY, &[&[0x01], seed])?;
        root[64..].copy_from_slice(&chain_code[..]);

        let key = MnemonicRootKey { root };
        // reject anything ed25519-bip32 would not accept as a root
        key.root_xprv()?;
        Ok(key)
    }
}

impl RootKeyProvider for MnemonicRootKey {
    fn root_xprv(&self) -> Result<XPrv> {
        XPrv::from_bytes_verified(self.root).map_err(|e| derivation_failure("invalid root key", e))
    }
}
