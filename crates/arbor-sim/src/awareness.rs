//! [`AwarenessSystem`] – what an agent currently perceives.
//!
//! Sensors report targets with an awareness level; awareness fades over time
//! once a target stops being observed, and a target whose awareness reaches
//! zero is forgotten.

use arbor_types::{ObjectId, Vector3};
use serde::Serialize;
use tracing::debug;

/// Awareness lost per second while a target is not observed.
pub const DEFAULT_DECAY_RATE: f32 = 0.5;

/// Something the agent can notice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectableTarget {
    pub id: ObjectId,
    pub position: Vector3,
}

impl DetectableTarget {
    pub fn new(position: Vector3) -> Self {
        Self {
            id: ObjectId::new_v4(),
            position,
        }
    }
}

/// A target together with how sure the agent is about it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackedTarget {
    pub target: DetectableTarget,
    pub awareness: f32,
}

#[derive(Debug)]
pub struct AwarenessSystem {
    tracked: Vec<TrackedTarget>,
    decay_rate: f32,
}

impl Default for AwarenessSystem {
    fn default() -> Self {
        Self::new(DEFAULT_DECAY_RATE)
    }
}

impl AwarenessSystem {
    pub fn new(decay_rate: f32) -> Self {
        Self {
            tracked: Vec::new(),
            decay_rate,
        }
    }

    /// Record a sighting.  Refreshes the position and raises awareness to at
    /// least `awareness`.
    pub fn observe(&mut self, target: DetectableTarget, awareness: f32) {
        match self.tracked.iter_mut().find(|t| t.target.id == target.id) {
            Some(tracked) => {
                tracked.target.position = target.position;
                tracked.awareness = tracked.awareness.max(awareness);
            }
            None => {
                debug!(object = %target.id, awareness, "target detected");
                self.tracked.push(TrackedTarget { target, awareness });
            }
        }
    }

    /// Drop a target immediately.  Returns `true` if it was tracked.
    pub fn forget(&mut self, id: ObjectId) -> bool {
        let before = self.tracked.len();
        self.tracked.retain(|t| t.target.id != id);
        before != self.tracked.len()
    }

    /// Fade every tracked target by `decay_rate * delta_time`.
    pub fn decay(&mut self, delta_time: f32) {
        let amount = self.decay_rate * delta_time;
        self.tracked.retain_mut(|tracked| {
            tracked.awareness -= amount;
            if tracked.awareness <= 0.0 {
                debug!(object = %tracked.target.id, "target forgotten");
                return false;
            }
            true
        });
    }

    pub fn active_targets(&self) -> &[TrackedTarget] {
        &self.tracked
    }

    pub fn get(&self, id: ObjectId) -> Option<&TrackedTarget> {
        self.tracked.iter().find(|t| t.target.id == id)
    }
}
