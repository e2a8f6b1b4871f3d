//! Choice event discriminants.

use serde::{Deserialize, Serialize};

/// What a player's choice means to the rest of the game.
///
/// The engine defines only this discriminant set; quest, inventory and
/// trade systems subscribe to the kinds they care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DialogueEventKind {
    #[default]
    None,
    AcceptQuest,
    RejectQuest,
    GiveItem,
    StartTrade,
    EndConversation,
}

impl DialogueEventKind {
    /// Every kind, in declaration order.
    pub const ALL: [DialogueEventKind; 6] = [
        DialogueEventKind::None,
        DialogueEventKind::AcceptQuest,
        DialogueEventKind::RejectQuest,
        DialogueEventKind::GiveItem,
        DialogueEventKind::StartTrade,
        DialogueEventKind::EndConversation,
    ];
}

impl std::fmt::Display for DialogueEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DialogueEventKind::None => "None",
            DialogueEventKind::AcceptQuest => "AcceptQuest",
            DialogueEventKind::RejectQuest => "RejectQuest",
            DialogueEventKind::GiveItem => "GiveItem",
            DialogueEventKind::StartTrade => "StartTrade",
            DialogueEventKind::EndConversation => "EndConversation",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_serialized_name() {
        for kind in DialogueEventKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }

    #[test]
    fn test_all_lists_each_kind_once() {
        let mut seen = std::collections::HashSet::new();
        for kind in DialogueEventKind::ALL {
            assert!(seen.insert(kind), "{kind} listed twice");
        }
        assert!(seen.contains(&DialogueEventKind::default()));
    }
}
