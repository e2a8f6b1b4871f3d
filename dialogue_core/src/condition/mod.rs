//! Conditions - side-effect-free predicates over the ambient state.
//!
//! The engine only needs the [`Condition`] capability. [`ConditionKind`] is
//! the closed set of condition variants graphs are authored with, and
//! [`ConditionKind::CATALOG`] lists them for authoring tools.

use npc_state::{AmbientState, DialogueStage, EntityId, FlagValue};
use serde::{Deserialize, Serialize};

/// A boolean predicate over ambient state.
pub trait Condition {
    /// Evaluate against the given state. Must not have side effects.
    fn is_met(&self, state: &AmbientState) -> bool;
}

impl<F> Condition for F
where
    F: Fn(&AmbientState) -> bool,
{
    fn is_met(&self, state: &AmbientState) -> bool {
        self(state)
    }
}

/// The condition variants a dialogue graph can be authored with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConditionKind {
    /// Always true.
    Always,

    /// The speaker stage equals the given stage.
    StageIs(DialogueStage),

    /// The speaker stage differs from the given stage.
    StageIsNot(DialogueStage),

    /// The conversation is with the given NPC.
    SpeakerIs(EntityId),

    /// The named flag exists and is truthy.
    FlagSet(String),

    /// The named flag exists and equals the given value.
    FlagEquals { name: String, value: FlagValue },

    /// Every nested condition holds. Empty is true.
    All(Vec<ConditionKind>),

    /// At least one nested condition holds. Empty is false.
    Any(Vec<ConditionKind>),

    /// The nested condition does not hold.
    Not(Box<ConditionKind>),
}

/// An entry in the condition catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionInfo {
    /// Serialized variant tag.
    pub tag: &'static str,
    /// Human-readable name shown by authoring tools.
    pub display_name: &'static str,
}

impl ConditionInfo {
    const fn new(tag: &'static str, display_name: &'static str) -> Self {
        Self { tag, display_name }
    }
}

impl ConditionKind {
    /// Every condition variant with its display name.
    pub const CATALOG: &'static [ConditionInfo] = &[
        ConditionInfo::new("Always", "Always"),
        ConditionInfo::new("StageIs", "State Met"),
        ConditionInfo::new("StageIsNot", "State Not Met"),
        ConditionInfo::new("SpeakerIs", "Speaker Is"),
        ConditionInfo::new("FlagSet", "Flag Set"),
        ConditionInfo::new("FlagEquals", "Flag Equals"),
        ConditionInfo::new("All", "All Of"),
        ConditionInfo::new("Any", "Any Of"),
        ConditionInfo::new("Not", "Not"),
    ];

    /// Shorthand for [`ConditionKind::StageIs`].
    pub fn stage_is(stage: DialogueStage) -> Self {
        ConditionKind::StageIs(stage)
    }

    /// Shorthand for [`ConditionKind::SpeakerIs`].
    pub fn speaker_is(speaker: EntityId) -> Self {
        ConditionKind::SpeakerIs(speaker)
    }

    /// Shorthand for [`ConditionKind::FlagSet`].
    pub fn flag_set(name: impl Into<String>) -> Self {
        ConditionKind::FlagSet(name.into())
    }

    /// Shorthand for [`ConditionKind::FlagEquals`].
    pub fn flag_equals(name: impl Into<String>, value: impl Into<FlagValue>) -> Self {
        ConditionKind::FlagEquals {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Negate a condition.
    pub fn negate(self) -> Self {
        ConditionKind::Not(Box::new(self))
    }

    /// Serialized variant tag.
    pub fn tag(&self) -> &'static str {
        self.info().tag
    }

    /// Human-readable name of this variant.
    pub fn display_name(&self) -> &'static str {
        self.info().display_name
    }

    fn info(&self) -> ConditionInfo {
        let index = match self {
            ConditionKind::Always => 0,
            ConditionKind::StageIs(_) => 1,
            ConditionKind::StageIsNot(_) => 2,
            ConditionKind::SpeakerIs(_) => 3,
            ConditionKind::FlagSet(_) => 4,
            ConditionKind::FlagEquals { .. } => 5,
            ConditionKind::All(_) => 6,
            ConditionKind::Any(_) => 7,
            ConditionKind::Not(_) => 8,
        };
        Self::CATALOG[index]
    }
}

impl Condition for ConditionKind {
    fn is_met(&self, state: &AmbientState) -> bool {
        match self {
            ConditionKind::Always => true,
            ConditionKind::StageIs(stage) => state.speaker_stage == *stage,
            ConditionKind::StageIsNot(stage) => state.speaker_stage != *stage,
            ConditionKind::SpeakerIs(speaker) => state.speaker == Some(*speaker),
            ConditionKind::FlagSet(name) => state.flag_is_set(name),
            ConditionKind::FlagEquals { name, value } => state.flag(name) == Some(value),
            ConditionKind::All(conditions) => conditions.iter().all(|c| c.is_met(state)),
            ConditionKind::Any(conditions) => conditions.iter().any(|c| c.is_met(state)),
            ConditionKind::Not(condition) => !condition.is_met(state),
        }
    }
}
