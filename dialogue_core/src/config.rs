//! Engine configuration: entry-point convention and unset-condition policy.

use serde::{Deserialize, Serialize};
use std::path::Path;

use npc_state::AmbientState;

use crate::error::Result;

/// ID of the entry node under the fixed convention.
pub const DEFAULT_ENTRY_ID: &str = "Default";

/// How a session finds the first node of a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "convention", rename_all = "snake_case")]
pub enum EntryConvention {
    /// Always start at the node with this ID.
    Fixed {
        #[serde(default = "default_entry_id")]
        id: String,
    },
    /// Start at the node whose ID is the speaker stage's numeric index.
    ByStage,
}

fn default_entry_id() -> String {
    DEFAULT_ENTRY_ID.to_string()
}

impl Default for EntryConvention {
    fn default() -> Self {
        EntryConvention::Fixed {
            id: default_entry_id(),
        }
    }
}

impl EntryConvention {
    /// The entry node ID for the given ambient state.
    pub fn entry_id(&self, state: &AmbientState) -> String {
        match self {
            EntryConvention::Fixed { id } => id.clone(),
            EntryConvention::ByStage => state.speaker_stage.index().to_string(),
        }
    }
}

/// What the resolver does with a transition whose condition is unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingConditionPolicy {
    /// Skip the pair as if its condition evaluated false.
    #[default]
    TreatAsUnmet,
    /// Abort resolution with `DialogueError::MissingCondition`.
    FailFast,
}

/// Configuration for dialogue sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DialogueConfig {
    pub entry: EntryConvention,
    pub missing_condition: MissingConditionPolicy,
}

impl DialogueConfig {
    /// Parse a config from TOML text. Missing keys fall back to defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Set the entry convention.
    pub fn with_entry(mut self, entry: EntryConvention) -> Self {
        self.entry = entry;
        self
    }

    /// Set the unset-condition policy.
    pub fn with_missing_condition(mut self, policy: MissingConditionPolicy) -> Self {
        self.missing_condition = policy;
        self
    }
}
