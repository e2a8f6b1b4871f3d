//! Dialogue graph - the complete set of nodes for one conversation.
//!
//! Graphs are built once (by hand or by deserializing an authoring tool's
//! export) and are read-only afterwards. Node IDs are unique; this is
//! checked at construction time.

mod choice;
mod node;

pub use choice::*;
pub use node::*;

use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{DialogueError, Result};

/// A structural problem found by [`DialogueGraph::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphIssue {
    /// A conditional transition points at a node that does not exist.
    DanglingTarget { node: String, target: String },
    /// A talk node's default points at a node that does not exist.
    DanglingDefault { node: String, target: String },
    /// A transition has no condition attached.
    MissingCondition { node: String, index: usize },
    /// An end node offers no choices.
    NoChoices { node: String },
}

impl std::fmt::Display for GraphIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphIssue::DanglingTarget { node, target } => {
                write!(f, "node '{node}' transitions to missing node '{target}'")
            }
            GraphIssue::DanglingDefault { node, target } => {
                write!(f, "node '{node}' defaults to missing node '{target}'")
            }
            GraphIssue::MissingCondition { node, index } => {
                write!(f, "node '{node}' transition {index} has no condition")
            }
            GraphIssue::NoChoices { node } => write!(f, "end node '{node}' has no choices"),
        }
    }
}

/// Nodes keyed by ID, kept in authoring order.
#[derive(Debug, Deserialize)]
#[serde(try_from = "Vec<DialogueNode>")]
pub struct DialogueGraph {
    nodes: Vec<DialogueNode>,

    /// Index: node ID -> position in `nodes`.
    by_id: HashMap<String, usize>,

    /// Set while a session is running against this graph.
    occupied: AtomicBool,
}

impl DialogueGraph {
    /// Build a graph, rejecting duplicate node IDs.
    pub fn from_nodes(nodes: impl IntoIterator<Item = DialogueNode>) -> Result<Self> {
        let nodes: Vec<DialogueNode> = nodes.into_iter().collect();
        let mut by_id = HashMap::with_capacity(nodes.len());

        for (position, node) in nodes.iter().enumerate() {
            if by_id.insert(node.id.clone(), position).is_some() {
                return Err(DialogueError::DuplicateNode {
                    id: node.id.clone(),
                });
            }
        }

        Ok(Self {
            nodes,
            by_id,
            occupied: AtomicBool::new(false),
        })
    }

    /// Get a node by ID.
    pub fn node(&self, id: &str) -> Option<&DialogueNode> {
        self.by_id.get(id).map(|&position| &self.nodes[position])
    }

    /// Get a node by ID, failing with `NodeNotFound` if it is absent.
    pub fn get(&self, id: &str) -> Result<&DialogueNode> {
        self.node(id)
            .ok_or_else(|| DialogueError::NodeNotFound { id: id.into() })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// All nodes in authoring order.
    pub fn nodes(&self) -> impl Iterator<Item = &DialogueNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Report every dangling target, unset condition and end node without
    /// choices.
    ///
    /// Issues are listed in node order, then transition order.
    pub fn validate(&self) -> Vec<GraphIssue> {
        let mut issues = Vec::new();

        for node in &self.nodes {
            let talk = match &node.kind {
                NodeKind::Talk(talk) => talk,
                NodeKind::End(end) => {
                    if end.choices.is_empty() {
                        issues.push(GraphIssue::NoChoices {
                            node: node.id.clone(),
                        });
                    }
                    continue;
                }
            };

            for (index, transition) in talk.transitions.iter().enumerate() {
                if transition.condition.is_none() {
                    issues.push(GraphIssue::MissingCondition {
                        node: node.id.clone(),
                        index,
                    });
                }
                if !self.contains(&transition.target) {
                    issues.push(GraphIssue::DanglingTarget {
                        node: node.id.clone(),
                        target: transition.target.clone(),
                    });
                }
            }

            if !self.contains(&talk.default_next) {
                issues.push(GraphIssue::DanglingDefault {
                    node: node.id.clone(),
                    target: talk.default_next.clone(),
                });
            }
        }

        issues
    }

    /// Claim the graph for a session. Returns false if already claimed.
    pub(crate) fn try_occupy(&self) -> bool {
        self.occupied
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn release(&self) {
        self.occupied.store(false, Ordering::Release);
    }

    /// Whether a session is currently running against this graph.
    pub fn is_occupied(&self) -> bool {
        self.occupied.load(Ordering::Acquire)
    }
}

impl Clone for DialogueGraph {
    /// Clones the nodes. The clone is never occupied.
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            by_id: self.by_id.clone(),
            occupied: AtomicBool::new(false),
        }
    }
}

impl TryFrom<Vec<DialogueNode>> for DialogueGraph {
    type Error = DialogueError;

    fn try_from(nodes: Vec<DialogueNode>) -> Result<Self> {
        Self::from_nodes(nodes)
    }
}

impl Serialize for DialogueGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.nodes)
    }
}
