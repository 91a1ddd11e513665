//! `arbor-memory` – scratch memory shared between behaviour tree callbacks.
//!
//! The tree engine never reads the blackboard itself; services write what
//! they perceive and decorators / actions read it back in the same pass.
//!
//! # Modules
//!
//! - [`blackboard`] – [`Blackboard`][blackboard::Blackboard]: a typed-key
//!   heterogeneous map with strict (`get_*`) and lenient (`try_get_*`)
//!   accessors.
//! - [`manager`] – [`BlackboardManager`][manager::BlackboardManager]: hands out
//!   one individual board per agent and shared boards per numeric id.

pub mod blackboard;
pub mod manager;

pub use blackboard::{Blackboard, BlackboardError, BlackboardValue, ValueKind};
pub use manager::{BlackboardManager, SharedBlackboard};
