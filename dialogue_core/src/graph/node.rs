//! Dialogue node definitions.

use serde::{Deserialize, Serialize};

use super::Choice;
use crate::condition::ConditionKind;

/// Discriminant of a node's variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Talk,
    End,
}

/// A single line of dialogue, keyed by an ID unique within its graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueNode {
    pub id: String,

    /// Text shown for this node.
    pub text: String,

    /// Variant-specific data.
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl DialogueNode {
    /// Create a talk node that falls through to `default_next`.
    pub fn talk(
        id: impl Into<String>,
        text: impl Into<String>,
        default_next: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            kind: NodeKind::Talk(TalkNode::new(default_next)),
        }
    }

    /// Create an end node with no choices.
    pub fn end(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            kind: NodeKind::End(EndNode::default()),
        }
    }

    /// Add a conditional transition. No effect on end nodes.
    pub fn with_transition(mut self, condition: ConditionKind, target: impl Into<String>) -> Self {
        if let NodeKind::Talk(talk) = &mut self.kind {
            talk.transitions.push(Transition::new(condition, target));
        }
        self
    }

    /// Add a choice. No effect on talk nodes.
    pub fn with_choice(mut self, choice: Choice) -> Self {
        if let NodeKind::End(end) = &mut self.kind {
            end.choices.push(choice);
        }
        self
    }

    pub fn node_type(&self) -> NodeType {
        match self.kind {
            NodeKind::Talk(_) => NodeType::Talk,
            NodeKind::End(_) => NodeType::End,
        }
    }

    pub fn as_talk(&self) -> Option<&TalkNode> {
        match &self.kind {
            NodeKind::Talk(talk) => Some(talk),
            NodeKind::End(_) => None,
        }
    }

    pub fn as_end(&self) -> Option<&EndNode> {
        match &self.kind {
            NodeKind::End(end) => Some(end),
            NodeKind::Talk(_) => None,
        }
    }
}

/// The two node variants. A node is exactly one of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    Talk(TalkNode),
    End(EndNode),
}

/// A non-terminal node with exactly one successor, picked by resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TalkNode {
    /// Conditional transitions, checked in declaration order.
    #[serde(default)]
    pub transitions: Vec<Transition>,

    /// Successor when no transition matches.
    pub default_next: String,
}

impl TalkNode {
    pub fn new(default_next: impl Into<String>) -> Self {
        Self {
            transitions: Vec::new(),
            default_next: default_next.into(),
        }
    }
}

/// A (condition, target) pair on a talk node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// `None` when the authoring tool left the condition unset.
    #[serde(default)]
    pub condition: Option<ConditionKind>,
    pub target: String,
}

impl Transition {
    pub fn new(condition: ConditionKind, target: impl Into<String>) -> Self {
        Self {
            condition: Some(condition),
            target: target.into(),
        }
    }

    /// A transition with no condition attached.
    pub fn unconditioned(target: impl Into<String>) -> Self {
        Self {
            condition: None,
            target: target.into(),
        }
    }
}

/// A terminal node offering mutually exclusive player choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EndNode {
    #[serde(default)]
    pub choices: Vec<Choice>,
}
