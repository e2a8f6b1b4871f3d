//! Error types for the dialogue engine.

use thiserror::Error;

/// Errors surfaced to the host by graphs, the resolver and sessions.
#[derive(Debug, Error)]
pub enum DialogueError {
    /// A referenced node (entry point or transition target) is not in the graph.
    #[error("dialogue node not found: {id}")]
    NodeNotFound { id: String },

    /// The requested operation is not valid in the session's current state.
    #[error("cannot {action} while session is {state}")]
    InvalidTransition { action: &'static str, state: String },

    /// `choose` was called with an index that addresses no choice.
    #[error("choice index {index} out of range ({available} choices available)")]
    ChoiceOutOfRange { index: usize, available: usize },

    /// A transition pair has no condition and the policy is fail-fast.
    #[error("transition {index} of node '{node}' has no condition")]
    MissingCondition { node: String, index: usize },

    /// An end node offers no choices, so a session reaching it could never finish.
    #[error("end node '{node}' has no choices")]
    NoChoices { node: String },

    /// Two nodes in one graph share an ID.
    #[error("duplicate dialogue node id: {id}")]
    DuplicateNode { id: String },

    /// Another session is already running against this graph.
    #[error("dialogue graph is already in use by another session")]
    GraphBusy,

    #[error("invalid dialogue config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DialogueError {
    /// Whether this error ends the running session.
    ///
    /// Lookup, missing-condition and empty-end-node failures terminate the
    /// session; invalid transitions leave it where it was.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DialogueError::NodeNotFound { .. }
                | DialogueError::MissingCondition { .. }
                | DialogueError::NoChoices { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DialogueError>;
