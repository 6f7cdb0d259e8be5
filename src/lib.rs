// src/lib.rs

pub mod address;
pub mod bip44;
pub mod byron;
pub mod config;
pub mod constants;
pub mod credential;
pub mod encoding;
pub mod engine;
pub mod error;
pub mod keys;
pub mod native_script;
pub mod policy;
pub mod shelley;

pub use address::{AddressKind, AddressSpec, DerivedAddress, NetworkDescriptor};
pub use bip44::{ChildIndex, DerivationPath, PathRole};
pub use config::{EngineConfig, ScriptLimits};
pub use credential::{Credential, CredentialSource, Pointer};
pub use engine::{AddressResponse, Engine, PublicKeyResponse};
pub use error::{EngineError, PathError, Result};
pub use keys::{ExtendedPublicKey, KeyHash, MnemonicRootKey, RootKeyProvider};
pub use native_script::{ComplexScript, DisplayFormat, NativeScript, ScriptHashOutput, SimpleScript};
pub use policy::SecurityPolicy;
