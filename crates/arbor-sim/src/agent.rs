//! [`CharacterAgent`] – a point-mass character that walks toward a
//! destination.
//!
//! Tree actions never move the agent directly; they set a destination with
//! [`CharacterAgent::move_to`] and the world advances the agent once per step
//! with [`CharacterAgent::update`].

use arbor_types::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::trace;

/// Distance under which the agent counts as arrived.
pub const ARRIVAL_TOLERANCE: f32 = 0.1;

pub struct CharacterAgent {
    position: Vector3,
    destination: Option<Vector3>,
    speed: f32,
    rng: StdRng,
}

/// Plain-data view of an agent, for printing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AgentState {
    pub position: Vector3,
    pub destination: Option<Vector3>,
}

impl CharacterAgent {
    /// Create an agent at `position` moving `speed` units per second.  `seed`
    /// drives [`pick_location_in_range`][Self::pick_location_in_range].
    pub fn new(position: Vector3, speed: f32, seed: u64) -> Self {
        Self {
            position,
            destination: None,
            speed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn position(&self) -> Vector3 {
        self.position
    }

    pub fn destination(&self) -> Option<Vector3> {
        self.destination
    }

    pub fn state(&self) -> AgentState {
        AgentState {
            position: self.position,
            destination: self.destination,
        }
    }

    pub fn move_to(&mut self, destination: Vector3) {
        trace!(%destination, "agent destination set");
        self.destination = Some(destination);
    }

    /// Cancel the current destination.
    pub fn stop(&mut self) {
        self.destination = None;
    }

    /// A random point on the ground plane within `range` of the agent.
    pub fn pick_location_in_range(&mut self, range: f32) -> Vector3 {
        if range <= 0.0 {
            return self.position;
        }
        let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
        let distance = range * self.rng.gen_range(0.0f32..=1.0).sqrt();
        self.position
            .add(Vector3::new(angle.cos() * distance, 0.0, angle.sin() * distance))
    }

    /// `true` when there is no destination or it has been reached.
    pub fn at_destination(&self) -> bool {
        match self.destination {
            Some(destination) => self.position.distance(destination) <= ARRIVAL_TOLERANCE,
            None => true,
        }
    }

    /// Walk toward the destination for `delta_time` seconds.
    pub fn update(&mut self, delta_time: f32) {
        if let Some(destination) = self.destination {
            self.position = self
                .position
                .move_towards(destination, self.speed * delta_time);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_agent_is_at_destination() {
        let agent = CharacterAgent::new(Vector3::zero(), 1.0, 1);
        assert!(agent.at_destination());
        assert_eq!(agent.destination(), None);
    }

    #[test]
    fn update_walks_at_speed_without_overshooting() {
        let mut agent = CharacterAgent::new(Vector3::zero(), 2.0, 1);
        agent.move_to(Vector3::new(3.0, 0.0, 0.0));

        agent.update(1.0);
        assert!((agent.position().x - 2.0).abs() < 1e-5);
        assert!(!agent.at_destination());

        agent.update(1.0);
        assert_eq!(agent.position(), Vector3::new(3.0, 0.0, 0.0));
        assert!(agent.at_destination());
    }

    #[test]
    fn picked_locations_stay_in_range_on_the_ground() {
        let origin = Vector3::new(5.0, 1.0, -5.0);
        let mut agent = CharacterAgent::new(origin, 1.0, 7);
        for _ in 0..100 {
            let point = agent.pick_location_in_range(10.0);
            assert!(point.distance(origin) <= 10.0 + 1e-4);
            assert_eq!(point.y, origin.y);
        }
    }

    #[test]
    fn same_seed_picks_same_locations() {
        let mut a = CharacterAgent::new(Vector3::zero(), 1.0, 99);
        let mut b = CharacterAgent::new(Vector3::zero(), 1.0, 99);
        assert_eq!(a.pick_location_in_range(4.0), b.pick_location_in_range(4.0));
    }

    #[test]
    fn stop_clears_destination() {
        let mut agent = CharacterAgent::new(Vector3::zero(), 1.0, 1);
        agent.move_to(Vector3::new(1.0, 0.0, 0.0));
        agent.stop();
        agent.update(1.0);
        assert_eq!(agent.position(), Vector3::zero());
    }
}
