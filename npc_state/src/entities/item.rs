//! Item payloads a dialogue choice can hand to the inventory or trade systems.

use serde::{Deserialize, Serialize};

use super::EntityId;

/// A concrete item instance, e.g. the reward handed over by a quest giver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: EntityId,
    pub name: String,
    pub quantity: u32,
}

impl Item {
    /// Create a single item with a fresh ID.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            quantity: 1,
        }
    }

    /// Set the stack size.
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }
}

/// Static item definition, referenced by key rather than by instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemData {
    /// Catalog key, e.g. `"herb_bundle"`.
    pub key: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stackable: bool,
}

impl ItemData {
    /// Create an item definition.
    pub fn new(key: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            display_name: display_name.into(),
            description: String::new(),
            stackable: false,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark the item as stackable.
    pub fn stackable(mut self) -> Self {
        self.stackable = true;
        self
    }
}
