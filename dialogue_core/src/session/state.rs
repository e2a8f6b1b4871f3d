//! Session lifecycle states.

use crate::graph::{Choice, DialogueNode};

/// Where a session is in its conversation.
///
/// `Displaying` always holds a talk node and `Choices` always holds an end
/// node; the session never constructs them otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SessionState<'g> {
    /// No conversation is running.
    #[default]
    Idle,
    /// Showing a talk node, waiting for `advance`.
    Displaying(&'g DialogueNode),
    /// Showing an end node's choices, waiting for `choose`.
    Choices(&'g DialogueNode),
}

impl<'g> SessionState<'g> {
    /// Short name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "Idle",
            SessionState::Displaying(_) => "Displaying",
            SessionState::Choices(_) => "Choices",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }

    /// The node being shown, if any.
    pub fn node(&self) -> Option<&'g DialogueNode> {
        match *self {
            SessionState::Idle => None,
            SessionState::Displaying(node) | SessionState::Choices(node) => Some(node),
        }
    }

    /// Choices on offer. Empty outside `Choices`.
    pub fn choices(&self) -> &'g [Choice] {
        match *self {
            SessionState::Choices(node) => node
                .as_end()
                .map(|end| end.choices.as_slice())
                .unwrap_or_default(),
            _ => &[],
        }
    }
}

impl std::fmt::Display for SessionState<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.node() {
            Some(node) => write!(f, "{}({})", self.name(), node.id),
            None => f.write_str(self.name()),
        }
    }
}
