//! Ambient state - the host-owned context a conversation is evaluated against.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::entities::EntityId;

/// Relationship/progress stage between the player and the speaking NPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DialogueStage {
    #[default]
    None,
    Normal,
    HasNotMet,
    HasMet,
    QuestIncomplete,
    QuestComplete,
}

impl DialogueStage {
    /// Every stage, in index order.
    pub const ALL: [DialogueStage; 6] = [
        DialogueStage::None,
        DialogueStage::Normal,
        DialogueStage::HasNotMet,
        DialogueStage::HasMet,
        DialogueStage::QuestIncomplete,
        DialogueStage::QuestComplete,
    ];

    /// Stable numeric index of the stage.
    pub fn index(self) -> usize {
        match self {
            DialogueStage::None => 0,
            DialogueStage::Normal => 1,
            DialogueStage::HasNotMet => 2,
            DialogueStage::HasMet => 3,
            DialogueStage::QuestIncomplete => 4,
            DialogueStage::QuestComplete => 5,
        }
    }

    /// Look a stage up by its index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl std::fmt::Display for DialogueStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DialogueStage::None => "None",
            DialogueStage::Normal => "Normal",
            DialogueStage::HasNotMet => "HasNotMet",
            DialogueStage::HasMet => "HasMet",
            DialogueStage::QuestIncomplete => "QuestIncomplete",
            DialogueStage::QuestComplete => "QuestComplete",
        };
        f.write_str(name)
    }
}

/// Flag value types for global state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FlagValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl FlagValue {
    /// Truthiness used by flag conditions: `false`, `0` and `""` are unset.
    pub fn is_truthy(&self) -> bool {
        match self {
            FlagValue::Bool(b) => *b,
            FlagValue::Int(i) => *i != 0,
            FlagValue::Float(f) => *f != 0.0,
            FlagValue::String(s) => !s.is_empty(),
        }
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        FlagValue::Bool(value)
    }
}

impl From<i64> for FlagValue {
    fn from(value: i64) -> Self {
        FlagValue::Int(value)
    }
}

impl From<f64> for FlagValue {
    fn from(value: f64) -> Self {
        FlagValue::Float(value)
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        FlagValue::String(value.to_string())
    }
}

impl From<String> for FlagValue {
    fn from(value: String) -> Self {
        FlagValue::String(value)
    }
}

/// The context a conversation reads but never owns.
///
/// The host keeps one of these per speaking NPC (or per conversation) and
/// updates it between sessions; the dialogue engine only borrows it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AmbientState {
    /// Stage of the relationship with the current speaker.
    pub speaker_stage: DialogueStage,

    /// The NPC being spoken to, if the host tracks one.
    pub speaker: Option<EntityId>,

    /// Global flags and variables.
    #[serde(default)]
    pub flags: HashMap<String, FlagValue>,
}

impl AmbientState {
    /// Create an ambient state at the given stage.
    pub fn new(stage: DialogueStage) -> Self {
        Self {
            speaker_stage: stage,
            ..Self::default()
        }
    }

    /// Set the speaker stage.
    pub fn with_stage(mut self, stage: DialogueStage) -> Self {
        self.speaker_stage = stage;
        self
    }

    /// Set the speaking entity.
    pub fn with_speaker(mut self, speaker: EntityId) -> Self {
        self.speaker = Some(speaker);
        self
    }

    /// Set a flag.
    pub fn with_flag(mut self, name: impl Into<String>, value: impl Into<FlagValue>) -> Self {
        self.flags.insert(name.into(), value.into());
        self
    }

    /// Get a flag by name.
    pub fn flag(&self, name: &str) -> Option<&FlagValue> {
        self.flags.get(name)
    }

    /// Check whether a flag exists and is truthy.
    pub fn flag_is_set(&self, name: &str) -> bool {
        self.flag(name).is_some_and(FlagValue::is_truthy)
    }

    /// Set or overwrite a flag in place.
    pub fn set_flag(&mut self, name: impl Into<String>, value: impl Into<FlagValue>) {
        self.flags.insert(name.into(), value.into());
    }
}
