// src/error.rs

use std::convert::Infallible;

use thiserror::Error;

use crate::address::AddressKind;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Why a derivation path was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("malformed path '{0}'")]
    Malformed(String),

    #[error("path has {depth} segments, at least {min} required")]
    TooShort { depth: usize, min: usize },

    #[error("path has {depth} segments, at most {max} allowed")]
    TooLong { depth: usize, max: usize },

    #[error("purpose segment {found} does not match the expected {expected}")]
    WrongPurpose { expected: String, found: String },

    #[error("coin type segment {0} is not 1815'")]
    WrongCoinType(String),

    #[error("account segment {0} must be hardened")]
    AccountNotHardened(String),

    #[error("chain segment {found} is not valid here (expected {expected})")]
    WrongChain { expected: String, found: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid path: {0}")]
    InvalidPath(#[from] PathError),

    #[error("Invalid hash length: expected {expected} bytes, got {actual}")]
    InvalidHashLength { expected: usize, actual: usize },

    #[error("Invalid credential combination for {kind}: {reason}")]
    InvalidCredentialCombination { kind: AddressKind, reason: String },

    #[error("Derivation failure: {0}")]
    DerivationFailure(String),

    #[error("Script too complex: {0}")]
    ScriptTooComplex(String),

    #[error("Script is incomplete: {0}")]
    IncompleteScript(String),

    #[error("Composite script closed without children")]
    EmptyComposite,

    #[error("N-of-K script requires {required} signatures but has only {children} sub-scripts")]
    InvalidRequiredCount { required: u32, children: usize },

    #[error("Invalid script sequence: {0}")]
    InvalidScriptSequence(String),

    #[error("A script session is already in progress")]
    ScriptSessionInProgress,

    #[error("No script session in progress")]
    NoScriptSession,

    #[error("Invalid network: {0}")]
    InvalidNetwork(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("CBOR encoding error: {0}")]
    Cbor(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<minicbor::encode::Error<Infallible>> for EngineError {
    fn from(e: minicbor::encode::Error<Infallible>) -> Self {
        EngineError::Cbor(e.to_string())
    }
}
