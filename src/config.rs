// src/config.rs

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::address::NetworkDescriptor;
use crate::constants::{DEFAULT_MAX_SCRIPT_CHILDREN, DEFAULT_MAX_SCRIPT_DEPTH, DEFAULT_MAX_SCRIPT_NODES};
use crate::error::{EngineError, Result};

/// Ceilings that keep a script session within fixed working memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptLimits {
    /// Open composite frames at once, the root included.
    pub max_depth: usize,
    /// Direct children of a single composite.
    pub max_children: usize,
    /// Nodes in the whole tree.
    pub max_nodes: usize,
}

impl Default for ScriptLimits {
    fn default() -> Self {
        ScriptLimits {
            max_depth: DEFAULT_MAX_SCRIPT_DEPTH,
            max_children: DEFAULT_MAX_SCRIPT_CHILDREN,
            max_nodes: DEFAULT_MAX_SCRIPT_NODES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub script_limits: ScriptLimits,
    /// Used by the CLI when `--network` is not given.
    pub default_network: NetworkDescriptor,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig { script_limits: ScriptLimits::default(), default_network: NetworkDescriptor::MAINNET }
    }
}

impl EngineConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(text).map_err(|e| EngineError::Config(format!("invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("could not read {}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<()> {
        let limits = &self.script_limits;
        if limits.max_depth == 0 || limits.max_children == 0 || limits.max_nodes == 0 {
            return Err(EngineError::Config("script limits must be at least 1".to_string()));
        }
        NetworkDescriptor::new(self.default_network.network_id, self.default_network.protocol_magic)?;
        Ok(())
    }
}
