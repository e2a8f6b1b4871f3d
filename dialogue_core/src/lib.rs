//! # Dialogue Core
//!
//! Branching NPC conversations as a graph of nodes. A session walks the
//! graph, picking each talk node's successor by evaluating per-transition
//! conditions against the host's ambient state, and publishes the player's
//! final choice through a typed event registry.
//!
//! ## Core Components
//!
//! - **condition**: Predicates over [`npc_state::AmbientState`]
//! - **graph**: Talk/End nodes keyed by unique ID
//! - **resolver**: First-match-wins transition resolution
//! - **dispatch**: Type-indexed publish/subscribe for choice events
//! - **session**: The start/advance/choose lifecycle
//!
//! Rendering, graph authoring and persistence are the host's business.

pub mod condition;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod graph;
pub mod resolver;
pub mod session;

pub use condition::*;
pub use config::*;
pub use dispatch::*;
pub use error::*;
pub use graph::*;
pub use resolver::*;
pub use session::*;
