//! Guard behaviour – wander around until something is noticed, then chase it.
//!
//! [`install`] wires this shape under the tree's root:
//!
//! ```text
//! ROOT
//!   Base Logic            (selector, service "Search for target")
//!     Chase Logic         (sequence, decorator "Can Chase?")
//!       Chase Target
//!     Wander              (sequence)
//!       Wander Logic      (parallel)
//!         Perform Wander  (primary)
//!         Random Yell     (secondary, service "Yell Cooldown")
//! ```
//!
//! The search service keeps `GuardKey::CurrentTarget` on the guard's
//! blackboard up to date.  As soon as a target is acquired the chase gate
//! opens and preempts wandering.
//!
//! [`GuardWorld`] bundles one guard with its tree for headless runs.

use std::sync::Arc;

use arbor_memory::{Blackboard, BlackboardManager, SharedBlackboard};
use arbor_runtime::{BehaviourTree, Node};
use arbor_types::{AgentId, ArborError, ObjectId, Status, TreeError, Vector3};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::agent::{AgentState, CharacterAgent};
use crate::awareness::{AwarenessSystem, DetectableTarget};

pub type SharedAgent = Arc<Mutex<CharacterAgent>>;
pub type SharedSensors = Arc<Mutex<AwarenessSystem>>;

/// Keys of the guard's individual blackboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardKey {
    CurrentTarget,
}

/// Tuning knobs for one guard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuardSettings {
    /// Radius around the guard in which wander points are picked.
    pub wander_range: f32,
    /// Awareness needed before a target is acquired.
    pub chase_min_awareness: f32,
    /// A chased target is dropped once awareness falls below this.
    pub chase_stop_awareness: f32,
    pub yell_cooldown_min: f32,
    pub yell_cooldown_max: f32,
    pub agent_speed: f32,
    pub seed: u64,
}

impl Default for GuardSettings {
    fn default() -> Self {
        Self {
            wander_range: 10.0,
            chase_min_awareness: 1.5,
            chase_stop_awareness: 1.0,
            yell_cooldown_min: 1.0,
            yell_cooldown_max: 3.0,
            agent_speed: 3.5,
            seed: 42,
        }
    }
}

/// Shared state the guard's callbacks capture.
#[derive(Clone)]
pub struct GuardHandles {
    pub agent: SharedAgent,
    pub sensors: SharedSensors,
    pub memory: SharedBlackboard<GuardKey>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Wiring
// ─────────────────────────────────────────────────────────────────────────────

/// Build the guard logic under `tree`'s root.  The tree still has to be
/// started.
///
/// # Errors
///
/// Propagates [`TreeError`] from the construction API.
pub fn install(tree: &mut BehaviourTree, handles: &GuardHandles, settings: &GuardSettings) -> Result<(), TreeError> {
    handles.memory.lock().set_object(GuardKey::CurrentTarget, None);

    let base = tree.root_mut().add_child(Node::selector("Base Logic"))?;
    {
        let sensors = handles.sensors.clone();
        let memory = handles.memory.clone();
        let settings = *settings;
        base.add_service("Search for target", move |_| {
            search_for_target(&sensors.lock(), &mut memory.lock(), &settings);
        });
    }

    let chase = base.add_child(Node::sequence("Chase Logic"))?;
    {
        let memory = handles.memory.clone();
        chase.add_decorator("Can Chase?", move || current_target(&memory.lock()).is_some());
    }
    chase.add_child(chase_target(handles))?;

    let wander = base
        .add_child(Node::sequence("Wander"))?
        .add_child(Node::parallel("Wander Logic"))?;
    wander.set_primary(perform_wander(handles, settings.wander_range))?;
    wander.set_secondary(random_yell(settings))?;

    Ok(())
}

fn current_target(memory: &Blackboard<GuardKey>) -> Option<ObjectId> {
    memory.try_get_object(&GuardKey::CurrentTarget).flatten()
}

/// Keep the current target while it stays above the stop threshold,
/// otherwise acquire the most noticed target above the chase threshold.
fn search_for_target(sensors: &AwarenessSystem, memory: &mut Blackboard<GuardKey>, settings: &GuardSettings) {
    let candidates = sensors.active_targets();
    if candidates.is_empty() {
        memory.set_object(GuardKey::CurrentTarget, None);
        return;
    }

    if let Some(current) = current_target(memory)
        && candidates
            .iter()
            .any(|c| c.target.id == current && c.awareness >= settings.chase_stop_awareness)
    {
        return;
    }

    let mut acquired = None;
    let mut highest_awareness = settings.chase_min_awareness;
    for candidate in candidates {
        if candidate.awareness >= highest_awareness {
            acquired = Some(candidate.target.id);
            highest_awareness = candidate.awareness;
        }
    }

    if acquired != current_target(memory) {
        debug!(object = ?acquired, "guard target changed");
    }
    memory.set_object(GuardKey::CurrentTarget, acquired);
}

fn chase_target(handles: &GuardHandles) -> Node {
    let on_enter = handles.clone();
    let on_tick = handles.clone();
    Node::action(
        "Chase Target",
        move || chase_step(&on_enter),
        move || chase_step(&on_tick),
    )
}

fn chase_step(handles: &GuardHandles) -> Status {
    let Some(id) = current_target(&handles.memory.lock()) else {
        return Status::Failed;
    };
    let Some(position) = handles.sensors.lock().get(id).map(|t| t.target.position) else {
        return Status::Failed;
    };
    handles.agent.lock().move_to(position);
    Status::InProgress
}

fn perform_wander(handles: &GuardHandles, range: f32) -> Node {
    let enter_agent = handles.agent.clone();
    let tick_agent = handles.agent.clone();
    Node::action(
        "Perform Wander",
        move || {
            let mut agent = enter_agent.lock();
            let location = agent.pick_location_in_range(range);
            agent.move_to(location);
            Status::InProgress
        },
        move || {
            if tick_agent.lock().at_destination() {
                Status::Succeeded
            } else {
                Status::InProgress
            }
        },
    )
}

fn random_yell(settings: &GuardSettings) -> Node {
    let remaining = Arc::new(Mutex::new(0.0_f32));
    let countdown = remaining.clone();
    let mut rng = StdRng::seed_from_u64(settings.seed.wrapping_add(1));
    let (min, max) = (settings.yell_cooldown_min, settings.yell_cooldown_max.max(settings.yell_cooldown_min));

    let mut node = Node::action(
        "Random Yell",
        || Status::InProgress,
        move || {
            let mut remaining = remaining.lock();
            if *remaining <= 0.0 {
                info!("I am wandering!");
                *remaining = rng.gen_range(min..=max);
            }
            Status::InProgress
        },
    );
    node.add_service("Yell Cooldown", move |delta_time| *countdown.lock() -= delta_time);
    node
}

// ─────────────────────────────────────────────────────────────────────────────
// GuardWorld
// ─────────────────────────────────────────────────────────────────────────────

/// One guard, its senses and its tree.
pub struct GuardWorld {
    agent_id: AgentId,
    handles: GuardHandles,
    tree: BehaviourTree,
}

impl GuardWorld {
    /// Spawn a guard at `spawn`, register its blackboard with `manager` and
    /// start its tree.
    pub fn new(manager: &mut BlackboardManager, spawn: Vector3, settings: GuardSettings) -> Result<Self, ArborError> {
        let agent_id = AgentId::new_v4();
        let handles = GuardHandles {
            agent: Arc::new(Mutex::new(CharacterAgent::new(spawn, settings.agent_speed, settings.seed))),
            sensors: Arc::new(Mutex::new(AwarenessSystem::default())),
            memory: manager.individual::<GuardKey>(agent_id)?,
        };

        let mut tree = BehaviourTree::new();
        install(&mut tree, &handles, &settings)?;
        tree.start()?;
        info!(agent = %agent_id, %spawn, "guard spawned");

        Ok(Self {
            agent_id,
            handles,
            tree,
        })
    }

    /// Advance the tree, then move the agent and fade its awareness.
    ///
    /// # Errors
    ///
    /// Propagates [`TreeError`] from [`BehaviourTree::advance`].
    pub fn step(&mut self, delta_time: f32) -> Result<bool, TreeError> {
        let worked = self.tree.advance(delta_time)?;
        self.handles.agent.lock().update(delta_time);
        self.handles.sensors.lock().decay(delta_time);
        Ok(worked)
    }

    /// Report a sighting to the guard's sensors.
    pub fn observe(&self, target: DetectableTarget, awareness: f32) {
        self.handles.sensors.lock().observe(target, awareness);
    }

    pub fn agent_id(&self) -> AgentId {
        self.agent_id
    }

    pub fn agent_state(&self) -> AgentState {
        self.handles.agent.lock().state()
    }

    pub fn current_target(&self) -> Option<ObjectId> {
        current_target(&self.handles.memory.lock())
    }

    pub fn handles(&self) -> &GuardHandles {
        &self.handles
    }

    pub fn tree(&self) -> &BehaviourTree {
        &self.tree
    }
}
