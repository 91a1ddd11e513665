//! `arbor-sim` – headless collaborators for driving behaviour trees.
//!
//! Nothing here touches a renderer or a physics engine: agents are points
//! that walk in straight lines and perception is whatever the caller reports.
//! That is enough to run the guard behaviour end-to-end in tests and from the
//! `arbor` binary.
//!
//! # Modules
//!
//! - [`agent`] – [`CharacterAgent`][agent::CharacterAgent]: position,
//!   destination and seeded wander-point picking.
//! - [`awareness`] – [`AwarenessSystem`][awareness::AwarenessSystem]: tracked
//!   targets with decaying awareness.
//! - [`guard`] – the wander / chase tree ([`install`][guard::install]) and
//!   [`GuardWorld`][guard::GuardWorld], which steps one guard.

pub mod agent;
pub mod awareness;
pub mod guard;

pub use agent::{AgentState, CharacterAgent};
pub use awareness::{AwarenessSystem, DetectableTarget, TrackedTarget};
pub use guard::{GuardHandles, GuardKey, GuardSettings, GuardWorld};
