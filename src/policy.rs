// src/policy.rs

use crate::address::AddressKind;
use crate::bip44::{DerivationPath, PathRole};
use crate::credential::{CredentialSource, request_paths};

/// What the device does before revealing a derived address or key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityPolicy {
    Allow,
    PromptWarnUnusual,
}

impl SecurityPolicy {
    fn from_usual(usual: bool) -> Self {
        if usual { SecurityPolicy::Allow } else { SecurityPolicy::PromptWarnUnusual }
    }
}

/// Classifies a request that already resolved successfully.
pub fn policy_for_address(kind: AddressKind, payment: &CredentialSource, staking: &CredentialSource) -> SecurityPolicy {
    let usual = request_paths(kind, payment, staking)
        .into_iter()
        .all(|(path, role)| path.is_usual(role));
    SecurityPolicy::from_usual(usual)
}

pub fn policy_for_path(path: &DerivationPath, role: PathRole) -> SecurityPolicy {
    SecurityPolicy::from_usual(path.is_usual(role))
}
