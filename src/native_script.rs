// src/native_script.rs

//! Native (multisig / timelock) scripts, built incrementally one node at a time.
//!
//! The tree lives in an arena; open composites are tracked on an explicit
//! frame stack so a session of any depth can be dropped with `reset`.
//! Serialization walks the arena with its own stack, never recursing.

use std::fmt;
use std::str::FromStr;

use minicbor::Encoder;
use pallas_crypto::hash::{Hash, Hasher};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, trace};

use crate::bip44::{DerivationPath, PathRole};
use crate::config::ScriptLimits;
use crate::constants::{HRP_POLICY_ID, HRP_SCRIPT_HASH, NATIVE_SCRIPT_LANGUAGE_TAG};
use crate::credential::hash_from_slice;
use crate::encoding::bech32_encode;
use crate::error::{EngineError, Result};
use crate::keys::RootKeyProvider;

pub type ScriptHash = Hash<28>;

// Ledger tags, the first element of every serialized node
const TAG_PUBKEY: u8 = 0;
const TAG_ALL: u8 = 1;
const TAG_ANY: u8 = 2;
const TAG_N_OF_K: u8 = 3;
const TAG_INVALID_BEFORE: u8 = 4;
const TAG_INVALID_HEREAFTER: u8 = 5;

mod hex_bytes {
    use super::*;

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Vec<u8>, D::Error> {
        let text = String::deserialize(d)?;
        hex::decode(text.trim()).map_err(serde::de::Error::custom)
    }
}

/// Whole script tree as a caller would describe it, e.g. in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NativeScript {
    PubkeyOwned {
        path: DerivationPath,
    },
    PubkeyThirdParty {
        #[serde(with = "hex_bytes")]
        key_hash: Vec<u8>,
    },
    All {
        scripts: Vec<NativeScript>,
    },
    Any {
        scripts: Vec<NativeScript>,
    },
    #[serde(rename = "n_of_k")]
    NOfK {
        required: u32,
        scripts: Vec<NativeScript>,
    },
    InvalidBefore {
        slot: u64,
    },
    InvalidHereafter {
        slot: u64,
    },
}

impl NativeScript {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| EngineError::Encoding(format!("invalid script JSON: {}", e)))
    }
}

/// A leaf handed to `add_simple`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleScript {
    PubkeyOwned(DerivationPath),
    PubkeyThirdParty(Vec<u8>),
    InvalidBefore(u64),
    InvalidHereafter(u64),
}

/// A composite opened by `start_complex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplexScript {
    All,
    Any,
    NOfK(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayFormat {
    #[default]
    Bech32,
    PolicyId,
}

impl DisplayFormat {
    pub fn hrp(&self) -> &'static str {
        match self {
            DisplayFormat::Bech32 => HRP_SCRIPT_HASH,
            DisplayFormat::PolicyId => HRP_POLICY_ID,
        }
    }
}

impl FromStr for DisplayFormat {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "bech32" => Ok(DisplayFormat::Bech32),
            "policy-id" | "policy" => Ok(DisplayFormat::PolicyId),
            other => Err(EngineError::Encoding(format!("unknown display format '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptHashOutput {
    pub hash: ScriptHash,
    pub format: DisplayFormat,
    /// Bech32 text under the format's prefix.
    pub text: String,
}

impl ScriptHashOutput {
    pub fn new(hash: ScriptHash, format: DisplayFormat) -> Result<Self> {
        let text = bech32_encode(format.hrp(), &hash[..])?;
        Ok(ScriptHashOutput { hash, format, text })
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.hash[..])
    }
}

impl fmt::Display for ScriptHashOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Pubkey(Hash<28>),
    All(Vec<usize>),
    Any(Vec<usize>),
    NOfK(u32, Vec<usize>),
    InvalidBefore(u64),
    InvalidHereafter(u64),
}

impl Node {
    fn children(&self) -> Option<&Vec<usize>> {
        match self {
            Node::All(c) | Node::Any(c) | Node::NOfK(_, c) => Some(c),
            _ => None,
        }
    }

    fn children_mut(&mut self) -> Option<&mut Vec<usize>> {
        match self {
            Node::All(c) | Node::Any(c) | Node::NOfK(_, c) => Some(c),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// At least one composite is open; `depth` is how many.
    Building { depth: usize },
    Complete,
}

/// Incremental script builder. One instance is one session.
#[derive(Debug, Clone)]
pub struct ScriptBuilder {
    limits: ScriptLimits,
    nodes: Vec<Node>,
    open: Vec<usize>,
    root: Option<usize>,
}

impl ScriptBuilder {
    pub fn new(limits: ScriptLimits) -> Self {
        ScriptBuilder { limits, nodes: Vec::new(), open: Vec::new(), root: None }
    }

    pub fn state(&self) -> SessionState {
        match (self.root, self.open.len()) {
            (None, _) => SessionState::Idle,
            (Some(_), 0) => SessionState::Complete,
            (Some(_), depth) => SessionState::Building { depth },
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn reset(&mut self) {
        if !self.nodes.is_empty() {
            debug!(nodes = self.nodes.len(), open = self.open.len(), "script session reset");
        }
        self.nodes.clear();
        self.open.clear();
        self.root = None;
    }

    /// Checks that one more node may be attached at the current position.
    fn check_room(&self) -> Result<()> {
        if self.state() == SessionState::Complete {
            return Err(EngineError::InvalidScriptSequence(
                "the script is already complete; finish or reset it first".to_string(),
            ));
        }
        if self.nodes.len() >= self.limits.max_nodes {
            return Err(EngineError::ScriptTooComplex(format!(
                "more than {} nodes",
                self.limits.max_nodes
            )));
        }
        if let Some(&parent) = self.open.last() {
            let count = self.nodes[parent].children().map_or(0, |c| c.len());
            if count >= self.limits.max_children {
                return Err(EngineError::ScriptTooComplex(format!(
                    "more than {} children in one composite",
                    self.limits.max_children
                )));
            }
        }
        Ok(())
    }

    fn attach(&mut self, node: Node) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(node);
        match self.open.last() {
            Some(&parent) => {
                if let Some(children) = self.nodes[parent].children_mut() {
                    children.push(idx);
                }
            }
            None => self.root = Some(idx),
        }
        idx
    }

    /// Adds a leaf under the open composite, or as the whole script if none is open.
    pub fn add_simple<K: RootKeyProvider + ?Sized>(&mut self, keys: &K, leaf: &SimpleScript) -> Result<()> {
        self.check_room()?;
        let node = match leaf {
            SimpleScript::PubkeyOwned(path) => {
                path.validate(PathRole::ScriptKey)?;
                Node::Pubkey(keys.derive_key_hash(path)?)
            }
            SimpleScript::PubkeyThirdParty(bytes) => Node::Pubkey(hash_from_slice(bytes)?),
            SimpleScript::InvalidBefore(slot) => Node::InvalidBefore(*slot),
            SimpleScript::InvalidHereafter(slot) => Node::InvalidHereafter(*slot),
        };
        trace!(depth = self.open.len(), "script leaf added");
        self.attach(node);
        Ok(())
    }

    pub fn start_complex(&mut self, kind: ComplexScript) -> Result<()> {
        self.check_room()?;
        if self.open.len() >= self.limits.max_depth {
            return Err(EngineError::ScriptTooComplex(format!(
                "nesting deeper than {}",
                self.limits.max_depth
            )));
        }
        let node = match kind {
            ComplexScript::All => Node::All(Vec::new()),
            ComplexScript::Any => Node::Any(Vec::new()),
            ComplexScript::NOfK(required) => Node::NOfK(required, Vec::new()),
        };
        let idx = self.attach(node);
        self.open.push(idx);
        debug!(?kind, depth = self.open.len(), "composite opened");
        Ok(())
    }

    pub fn close_complex(&mut self) -> Result<()> {
        let Some(&top) = self.open.last() else {
            return Err(EngineError::InvalidScriptSequence("no composite is open".to_string()));
        };
        match &self.nodes[top] {
            node if node.children().is_some_and(|c| c.is_empty()) => return Err(EngineError::EmptyComposite),
            Node::NOfK(required, children) if *required as usize > children.len() => {
                return Err(EngineError::InvalidRequiredCount { required: *required, children: children.len() });
            }
            _ => {}
        }
        self.open.pop();
        debug!(depth = self.open.len(), "composite closed");
        Ok(())
    }

    /// Pre-order, definite length CBOR of the completed tree.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let root = match (self.root, self.open.len()) {
            (None, _) => return Err(EngineError::IncompleteScript("no script nodes were added".to_string())),
            (Some(_), open) if open > 0 => {
                return Err(EngineError::IncompleteScript(format!("{} composite(s) still open", open)));
            }
            (Some(root), _) => root,
        };

        let mut out = Vec::new();
        let mut e = Encoder::new(&mut out);
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            match node {
                Node::Pubkey(hash) => {
                    e.array(2)?.u8(TAG_PUBKEY)?.bytes(&hash[..])?;
                }
                Node::All(children) => {
                    e.array(2)?.u8(TAG_ALL)?.array(children.len() as u64)?;
                }
                Node::Any(children) => {
                    e.array(2)?.u8(TAG_ANY)?.array(children.len() as u64)?;
                }
                Node::NOfK(required, children) => {
                    e.array(3)?.u8(TAG_N_OF_K)?.u32(*required)?.array(children.len() as u64)?;
                }
                Node::InvalidBefore(slot) => {
                    e.array(2)?.u8(TAG_INVALID_BEFORE)?.u64(*slot)?;
                }
                Node::InvalidHereafter(slot) => {
                    e.array(2)?.u8(TAG_INVALID_HEREAFTER)?.u64(*slot)?;
                }
            }
            if let Some(children) = node.children() {
                stack.extend(children.iter().rev());
            }
        }
        Ok(out)
    }

    /// Hashes the completed script and ends the session. On error the
    /// session is left as it was.
    pub fn finish(&mut self, format: DisplayFormat) -> Result<ScriptHashOutput> {
        let cbor = self.serialize()?;
        let output = ScriptHashOutput::new(script_hash(&cbor), format)?;
        debug!(nodes = self.nodes.len(), hash = %output.hash, "script finished");
        self.reset();
        Ok(output)
    }
}

/// Blake2b-224 over the language tag followed by the script CBOR.
pub fn script_hash(cbor: &[u8]) -> ScriptHash {
    let mut tagged = Vec::with_capacity(cbor.len() + 1);
    tagged.push(NATIVE_SCRIPT_LANGUAGE_TAG);
    tagged.extend_from_slice(cbor);
    Hasher::<224>::hash(&tagged)
}

enum Step<'a> {
    Enter(&'a NativeScript),
    Close,
}

/// Streams a whole tree through `builder`, which must be idle.
pub fn feed_script<K: RootKeyProvider + ?Sized>(
    builder: &mut ScriptBuilder,
    keys: &K,
    script: &NativeScript,
) -> Result<()> {
    let mut steps = vec![Step::Enter(script)];
    while let Some(step) = steps.pop() {
        let node = match step {
            Step::Close => {
                builder.close_complex()?;
                continue;
            }
            Step::Enter(node) => node,
        };
        let (kind, children) = match node {
            NativeScript::All { scripts } => (ComplexScript::All, scripts),
            NativeScript::Any { scripts } => (ComplexScript::Any, scripts),
            NativeScript::NOfK { required, scripts } => (ComplexScript::NOfK(*required), scripts),
            NativeScript::PubkeyOwned { path } => {
                builder.add_simple(keys, &SimpleScript::PubkeyOwned(path.clone()))?;
                continue;
            }
            NativeScript::PubkeyThirdParty { key_hash } => {
                builder.add_simple(keys, &SimpleScript::PubkeyThirdParty(key_hash.clone()))?;
                continue;
            }
            NativeScript::InvalidBefore { slot } => {
                builder.add_simple(keys, &SimpleScript::InvalidBefore(*slot))?;
                continue;
            }
            NativeScript::InvalidHereafter { slot } => {
                builder.add_simple(keys, &SimpleScript::InvalidHereafter(*slot))?;
                continue;
            }
        };
        builder.start_complex(kind)?;
        steps.push(Step::Close);
        steps.extend(children.iter().rev().map(Step::Enter));
    }
    Ok(())
}

/// Hashes a whole tree in a throwaway session.
pub fn hash_native_script<K: RootKeyProvider + ?Sized>(
    keys: &K,
    limits: ScriptLimits,
    script: &NativeScript,
    format: DisplayFormat,
) -> Result<ScriptHashOutput> {
    let mut builder = ScriptBuilder::new(limits);
    feed_script(&mut builder, keys, script)?;
    builder.finish(format)
}
