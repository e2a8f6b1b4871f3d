//! # NPC State
//!
//! The world-facing half of the dialogue system: the ambient state that
//! conversation conditions read, and the payload types that choices carry
//! out to quest, inventory and trade systems.
//! This crate holds no dialogue logic.

pub mod ambient;
pub mod entities;

pub use ambient::*;
pub use entities::*;
