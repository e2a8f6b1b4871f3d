//! Transition resolution for talk nodes.
//!
//! Transitions are scanned in declaration order and the first one whose
//! condition holds wins. Order is the only tie-break. If nothing matches,
//! or the node has no transitions, the node's default is used.

use npc_state::AmbientState;

use crate::condition::Condition;
use crate::config::MissingConditionPolicy;
use crate::error::{DialogueError, Result};
use crate::graph::TalkNode;

/// Pick the next node ID for a talk node.
///
/// `node_id` is only used to label a `MissingCondition` error.
pub fn resolve_next<'a>(
    node_id: &str,
    talk: &'a TalkNode,
    state: &AmbientState,
    policy: MissingConditionPolicy,
) -> Result<&'a str> {
    for (index, transition) in talk.transitions.iter().enumerate() {
        match &transition.condition {
            Some(condition) if condition.is_met(state) => {
                tracing::trace!(
                    node = node_id,
                    index,
                    target = transition.target.as_str(),
                    "transition matched"
                );
                return Ok(&transition.target);
            }
            Some(_) => {}
            None => match policy {
                MissingConditionPolicy::TreatAsUnmet => {
                    tracing::debug!(
                        node = node_id,
                        index,
                        "skipping transition without condition"
                    );
                }
                MissingConditionPolicy::FailFast => {
                    return Err(DialogueError::MissingCondition {
                        node: node_id.to_string(),
                        index,
                    });
                }
            },
        }
    }

    Ok(&talk.default_next)
}
