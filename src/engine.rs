// src/engine.rs

use tracing::{debug, info};

use crate::address::{AddressKind, DerivedAddress, NetworkDescriptor, encode_address};
use crate::bip44::{DerivationPath, PathRole};
use crate::config::EngineConfig;
use crate::constants::{CHAIN_STAKING, PURPOSE_MULTISIG};
use crate::credential::{CredentialSource, resolve};
use crate::error::{EngineError, Result};
use crate::keys::{ExtendedPublicKey, KeyHash, RootKeyProvider};
use crate::native_script::{
    ComplexScript, DisplayFormat, NativeScript, ScriptBuilder, ScriptHashOutput, SessionState, SimpleScript,
    feed_script,
};
use crate::policy::{SecurityPolicy, policy_for_address, policy_for_path};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressResponse {
    pub address: DerivedAddress,
    pub policy: SecurityPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyResponse {
    pub xpub: ExtendedPublicKey,
    pub policy: SecurityPolicy,
}

/// Single-threaded front door: one key provider, one configuration and at
/// most one open script session.
pub struct Engine<K: RootKeyProvider> {
    keys: K,
    config: EngineConfig,
    session: Option<ScriptBuilder>,
}

impl<K: RootKeyProvider> Engine<K> {
    pub fn new(keys: K, config: EngineConfig) -> Self {
        Engine { keys, config, session: None }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn derive_address(
        &self,
        network: NetworkDescriptor,
        kind: AddressKind,
        payment: &CredentialSource,
        staking: &CredentialSource,
    ) -> Result<AddressResponse> {
        // 1. pairing, validation and derivation; nothing is encoded on failure
        let spec = resolve(&self.keys, network, kind, payment, staking)?;

        // 2. Byron or Shelley bytes and text
        let address = encode_address(&spec)?;

        // 3. only successful requests are classified
        let policy = policy_for_address(kind, payment, staking);
        info!(%kind, ?policy, "address derived");
        Ok(AddressResponse { address, policy })
    }

    /// Key hash of a Shelley payment, staking or script key path.
    pub fn derive_key_hash(&self, path: &DerivationPath) -> Result<KeyHash> {
        let role = shelley_role(path)?;
        self.keys.derive_key_hash_for(path, role)
    }

    /// Extended public key for any path that passes validation for its role.
    pub fn extended_public_key(&self, path: &DerivationPath) -> Result<PublicKeyResponse> {
        let role = if path.is_byron() { PathRole::ByronPayment } else { shelley_role(path)? };
        let xpub = self.keys.derive_xpub_for(path, role)?;
        Ok(PublicKeyResponse { xpub, policy: policy_for_path(path, role) })
    }

    pub fn script_state(&self) -> Option<SessionState> {
        self.session.as_ref().map(|s| s.state())
    }

    pub fn begin_script(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Err(EngineError::ScriptSessionInProgress);
        }
        self.session = Some(ScriptBuilder::new(self.config.script_limits));
        debug!("script session started");
        Ok(())
    }

    fn session_mut(&mut self) -> Result<&mut ScriptBuilder> {
        self.session.as_mut().ok_or(EngineError::NoScriptSession)
    }

    pub fn script_add_simple(&mut self, leaf: &SimpleScript) -> Result<()> {
        let session = self.session.as_mut().ok_or(EngineError::NoScriptSession)?;
        session.add_simple(&self.keys, leaf)
    }

    pub fn script_start_complex(&mut self, kind: ComplexScript) -> Result<()> {
        self.session_mut()?.start_complex(kind)
    }

    pub fn script_close_complex(&mut self) -> Result<()> {
        self.session_mut()?.close_complex()
    }

    /// Ends the session on success; on failure it stays open for fixing or `script_reset`.
    pub fn script_finish(&mut self, format: DisplayFormat) -> Result<ScriptHashOutput> {
        let output = self.session_mut()?.finish(format)?;
        self.session = None;
        Ok(output)
    }

    /// Drops any session, open or not.
    pub fn script_reset(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.reset();
        }
    }

    /// Hashes a whole tree without touching the open session, if any.
    pub fn hash_script(&self, script: &NativeScript, format: DisplayFormat) -> Result<ScriptHashOutput> {
        let mut builder = ScriptBuilder::new(self.config.script_limits);
        feed_script(&mut builder, &self.keys, script)?;
        builder.finish(format)
    }
}

/// Picks the role from the purpose and chain segments, then validates against it.
fn shelley_role(path: &DerivationPath) -> Result<PathRole> {
    let chain = path.chain().map(|c| c.raw());
    let role = match path.purpose().map(|p| p.index()) {
        Some(PURPOSE_MULTISIG) => PathRole::ScriptKey,
        _ if chain == Some(CHAIN_STAKING) => PathRole::ShelleyStaking,
        _ => PathRole::ShelleyPayment,
    };
    path.validate(role)?;
    Ok(role)
}
