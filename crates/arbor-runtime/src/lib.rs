//! `arbor-runtime` – the behaviour tree engine.
//!
//! Trees are built from [`Node`]s, gated by [`Decorator`]s, fed by
//! [`Service`]s and driven one step at a time by a [`BehaviourTree`].
//! Evaluation is synchronous: every [`BehaviourTree::advance`] call runs to
//! completion before returning.
//!
//! # Modules
//!
//! - [`element`] – [`Element`][element::Element]: the name + debug-text
//!   contract shared by nodes, decorators and services.
//! - [`decorator`] – [`Decorator`][decorator::Decorator]: boolean gates that
//!   block a node for the current pass.  A gate that re-opens restarts its
//!   node and aborts lower-priority siblings.
//! - [`service`] – [`Service`][service::Service]: per-visit callbacks that run
//!   before the node's own logic.
//! - [`node`] – [`Node`][node::Node]: the tick state machine plus the
//!   Sequence, Selector, Condition, ReturnResult and Parallel composites.
//! - [`tree`] – [`BehaviourTree`][tree::BehaviourTree]: owns the `ROOT` node,
//!   starts it, advances it and renders the debug dump.
//! - [`snapshot`] – [`NodeSnapshot`][snapshot::NodeSnapshot]: the debug dump
//!   as serializable data.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: global
//!   `tracing` subscriber with optional OTLP export.

mod composite;
pub mod decorator;
pub mod element;
pub mod node;
pub mod service;
pub mod snapshot;
pub mod telemetry;
pub mod tree;

pub use arbor_types::{Status, TreeError};
pub use decorator::Decorator;
pub use element::Element;
pub use node::Node;
pub use service::Service;
pub use snapshot::{DecoratorSnapshot, NodeSnapshot};
pub use telemetry::{TracerProviderGuard, init_tracing};
pub use tree::BehaviourTree;
