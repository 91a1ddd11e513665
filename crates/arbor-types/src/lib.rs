//! `arbor-types` – shared vocabulary for the Arbor workspace.
//!
//! Holds the node [`Status`] enumeration used by every behaviour tree, the
//! small geometry and identity types exchanged between the engine and its
//! collaborators, and the error types surfaced by tree construction.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ─────────────────────────────────────────────────────────────────────────────
// Status
// ─────────────────────────────────────────────────────────────────────────────

/// Evaluation state of a behaviour tree node.
///
/// `Unknown` means the node has not been entered since its last reset.  Once a
/// node is `InProgress` it stays there until it resolves to `Failed` or
/// `Succeeded`, and it holds that terminal value until reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Unknown,
    InProgress,
    Failed,
    Succeeded,
}

impl Status {
    /// `true` for `Failed` and `Succeeded`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Failed | Status::Succeeded)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Unknown => "Unknown",
            Status::InProgress => "InProgress",
            Status::Failed => "Failed",
            Status::Succeeded => "Succeeded",
        };
        f.write_str(label)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Geometry
// ─────────────────────────────────────────────────────────────────────────────

/// A 3-D vector in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }

    pub fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }

    pub fn scale(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Euclidean distance between two points.
    pub fn distance(self, other: Self) -> f32 {
        self.sub(other).length()
    }

    /// Step from `self` toward `target` by at most `max_delta`, never
    /// overshooting.
    pub fn move_towards(self, target: Self, max_delta: f32) -> Self {
        let offset = target.sub(self);
        let remaining = offset.length();
        if remaining <= max_delta || remaining == 0.0 {
            return target;
        }
        self.add(offset.scale(max_delta / remaining))
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Identity
// ─────────────────────────────────────────────────────────────────────────────

/// Opaque reference to a world object (a detectable target, a prop, …).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of an agent owning an individual blackboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub Uuid);

impl AgentId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Misuse of the tree construction or driver API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("cannot attach an ordinary child to parallel node '{parent}'; use set_primary or set_secondary")]
    ParallelChildAttach { parent: String },

    #[error("node '{node}' is not a parallel node")]
    NotParallel { node: String },

    #[error("parallel node '{node}' has no primary child")]
    MissingPrimary { node: String },

    #[error("behaviour tree advanced before start()")]
    NotStarted,
}

/// Umbrella error for binaries that drive trees end-to-end.
#[derive(Error, Debug)]
pub enum ArborError {
    #[error("Behaviour tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Blackboard error: {0}")]
    Blackboard(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}
