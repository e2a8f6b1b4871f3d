//! Player choices offered by end nodes.

use npc_state::{Item, ItemData};
use serde::{Deserialize, Serialize};

use crate::dispatch::DialogueEventKind;

/// An option presented at an end node.
///
/// When chosen, exactly one payload is published for `event_kind`: the
/// object payload if one is set, otherwise the string parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Text shown to the player.
    pub text: String,

    pub event_kind: DialogueEventKind,

    /// String payload, e.g. a quest key.
    #[serde(default)]
    pub parameter: Option<String>,

    /// Object payload. Takes precedence over `parameter`.
    #[serde(default)]
    pub object: Option<ChoiceObject>,
}

impl Choice {
    pub fn new(text: impl Into<String>, event_kind: DialogueEventKind) -> Self {
        Self {
            text: text.into(),
            event_kind,
            parameter: None,
            object: None,
        }
    }

    /// Attach a string payload.
    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = Some(parameter.into());
        self
    }

    /// Attach an object payload.
    pub fn with_object(mut self, object: impl Into<ChoiceObject>) -> Self {
        self.object = Some(object.into());
        self
    }
}

/// Concrete object payloads a choice can carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChoiceObject {
    Item(Item),
    ItemData(ItemData),
}

impl ChoiceObject {
    /// Name of the concrete payload type.
    pub fn type_name(&self) -> &'static str {
        match self {
            ChoiceObject::Item(_) => "Item",
            ChoiceObject::ItemData(_) => "ItemData",
        }
    }
}

impl From<Item> for ChoiceObject {
    fn from(item: Item) -> Self {
        ChoiceObject::Item(item)
    }
}

impl From<ItemData> for ChoiceObject {
    fn from(data: ItemData) -> Self {
        ChoiceObject::ItemData(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_builder() {
        let choice = Choice::new("I'll help you.", DialogueEventKind::AcceptQuest)
            .with_parameter("lost_ring");

        assert_eq!(choice.event_kind, DialogueEventKind::AcceptQuest);
        assert_eq!(choice.parameter.as_deref(), Some("lost_ring"));
        assert!(choice.object.is_none());
    }

    #[test]
    fn test_object_payload() {
        let choice = Choice::new("Take this.", DialogueEventKind::GiveItem)
            .with_object(ItemData::new("herb", "Healing Herb"));
        assert_eq!(
            choice.object.as_ref().map(ChoiceObject::type_name),
            Some("ItemData")
        );
    }

    #[test]
    fn test_choice_from_json() {
        let json = r#"{
            "text": "Show me your wares.",
            "event_kind": "StartTrade",
            "object": {
                "Item": {
                    "id": "00000000-0000-0000-0000-000000000000",
                    "name": "Lantern",
                    "quantity": 1
                }
            }
        }"#;
        let choice: Choice = serde_json::from_str(json).unwrap();
        assert_eq!(choice.event_kind, DialogueEventKind::StartTrade);
        assert!(choice.parameter.is_none());
        match choice.object {
            Some(ChoiceObject::Item(item)) => assert_eq!(item.name, "Lantern"),
            other => panic!("expected an item payload, got {other:?}"),
        }
    }
}
