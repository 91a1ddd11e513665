//! [`BehaviourTree`] – the per-agent driver.
//!
//! Owns a single `"ROOT"` placeholder node.  Wiring code populates the root
//! with exactly one top-level child, calls [`BehaviourTree::start`] once, then
//! [`BehaviourTree::advance`] once per simulation step.
//!
//! # Example
//!
//! ```rust
//! use arbor_runtime::{BehaviourTree, Node};
//! use arbor_types::Status;
//!
//! let mut tree = BehaviourTree::new();
//! let logic = tree.root_mut().add_child(Node::selector("Base Logic")).unwrap();
//! logic.add_child(Node::action("Idle", || Status::InProgress, || Status::InProgress)).unwrap();
//!
//! tree.start().unwrap();
//! tree.advance(1.0 / 30.0).unwrap();
//!
//! assert!(tree.debug_snapshot().contains("Idle [InProgress]"));
//! ```

use std::fmt;

use arbor_types::TreeError;
use tracing::{debug, info};

use crate::element::Element;
use crate::node::Node;
use crate::snapshot::NodeSnapshot;

/// Name of the placeholder root every tree starts with.
pub const ROOT_NAME: &str = "ROOT";

/// Drives one root node once per external step.
pub struct BehaviourTree {
    root: Node,
    started: bool,
    steps: u64,
}

impl Default for BehaviourTree {
    fn default() -> Self {
        Self::new()
    }
}

impl BehaviourTree {
    pub fn new() -> Self {
        Self {
            root: Node::new(ROOT_NAME),
            started: false,
            steps: 0,
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Mutable access to the root for wiring.
    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    /// Validate the wired structure and reset the root before the first
    /// step.  Calling it again restarts evaluation from scratch.
    ///
    /// # Errors
    ///
    /// [`TreeError::MissingPrimary`] when a parallel node lacks its primary.
    pub fn start(&mut self) -> Result<(), TreeError> {
        self.root.validate()?;
        self.root.reset();
        self.started = true;
        self.steps = 0;
        info!(top_level = self.root.children().len(), "behaviour tree started");
        Ok(())
    }

    /// Tick the root once.  Returns whether any node did work; a tree that did
    /// nothing has already been reset and restarts on the next step.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotStarted`] before [`start`][BehaviourTree::start].
    pub fn advance(&mut self, delta_time: f32) -> Result<bool, TreeError> {
        if !self.started {
            return Err(TreeError::NotStarted);
        }

        let ticked_any_nodes = self.root.tick(delta_time);
        self.steps += 1;

        if !ticked_any_nodes {
            debug!(step = self.steps, "behaviour tree stalled; restarting from root");
        }

        Ok(ticked_any_nodes)
    }

    /// Indented text dump of the whole tree.
    pub fn debug_snapshot(&self) -> String {
        self.root.debug_text(0)
    }

    /// Structured dump of the whole tree.
    pub fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot::capture(&self.root)
    }

    /// Number of successful [`advance`][BehaviourTree::advance] calls since
    /// the last start.
    pub fn step_count(&self) -> u64 {
        self.steps
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}

impl fmt::Display for BehaviourTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.debug_snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_types::Status;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn leaf(name: &str, result: Status) -> Node {
        Node::new(name).with_on_enter(move || result)
    }

    /// A tick callback that replays `script`, repeating its last value.
    fn scripted(script: &[Status]) -> impl FnMut() -> Status + Send + 'static {
        let mut queue: VecDeque<Status> = script.iter().copied().collect();
        let mut last = Status::InProgress;
        move || {
            if let Some(next) = queue.pop_front() {
                last = next;
            }
            last
        }
    }

    #[test]
    fn new_tree_has_plain_root() {
        let tree = BehaviourTree::new();
        assert_eq!(tree.root().name(), ROOT_NAME);
        assert_eq!(tree.root().kind_label(), "plain");
        assert!(!tree.is_started());
    }

    #[test]
    fn advance_before_start_is_rejected() {
        let mut tree = BehaviourTree::new();
        assert_eq!(tree.advance(0.1), Err(TreeError::NotStarted));
    }

    #[test]
    fn start_rejects_parallel_without_primary() {
        let mut tree = BehaviourTree::new();
        tree.root_mut()
            .add_child(Node::sequence("Wander"))
            .unwrap()
            .add_child(Node::parallel("Wander Logic"))
            .unwrap();

        assert_eq!(
            tree.start(),
            Err(TreeError::MissingPrimary {
                node: "Wander Logic".to_string()
            })
        );
    }

    #[test]
    fn first_successful_branch_resolves_root() {
        let mut tree = BehaviourTree::new();
        let selector = tree.root_mut().add_child(Node::selector("Base")).unwrap();

        let s1 = selector.add_child(Node::sequence("S1")).unwrap();
        s1.add_child(leaf("cond_true", Status::Succeeded)).unwrap();
        s1.add_child(leaf("action_succeeds", Status::Succeeded)).unwrap();

        let s2 = selector.add_child(Node::sequence("S2")).unwrap();
        s2.add_child(leaf("cond_true", Status::Succeeded)).unwrap();
        s2.add_child(leaf("action_fails", Status::Failed)).unwrap();

        tree.start().unwrap();
        assert!(tree.advance(0.1).unwrap());

        let snapshot = tree.snapshot();
        assert_eq!(snapshot.status, Status::Succeeded);
        assert_eq!(snapshot.find("Base").unwrap().status, Status::Succeeded);
        assert_eq!(snapshot.find("S2").unwrap().status, Status::Unknown);
        assert!(snapshot.active_path().is_empty());
    }

    #[test]
    fn resolved_tree_restarts_on_following_step() {
        let entries = Arc::new(AtomicUsize::new(0));
        let entries_ref = entries.clone();

        let mut tree = BehaviourTree::new();
        tree.root_mut()
            .add_child(Node::new("once").with_on_enter(move || {
                entries_ref.fetch_add(1, Ordering::SeqCst);
                Status::Succeeded
            }))
            .unwrap();

        tree.start().unwrap();
        assert!(tree.advance(0.1).unwrap());
        assert_eq!(tree.root().last_status(), Status::Succeeded);

        // nothing left to do: the driver resets
        assert!(!tree.advance(0.1).unwrap());
        assert_eq!(tree.root().last_status(), Status::Unknown);
        assert_eq!(tree.root().children()[0].last_status(), Status::Unknown);

        assert!(tree.advance(0.1).unwrap());
        assert_eq!(entries.load(Ordering::SeqCst), 2);
        assert_eq!(tree.step_count(), 3);
    }

    #[test]
    fn scripted_run_matches_expected_dump() {
        let mut tree = BehaviourTree::new();
        let sequence = tree.root_mut().add_child(Node::sequence("Patrol")).unwrap();
        sequence
            .add_child(Node::action(
                "Walk",
                || Status::InProgress,
                scripted(&[Status::InProgress, Status::Succeeded]),
            ))
            .unwrap();
        sequence
            .add_child(Node::action("Look", || Status::InProgress, scripted(&[Status::Failed])))
            .unwrap();

        tree.start().unwrap();
        let mut dumps = Vec::new();
        for _ in 0..4 {
            tree.advance(0.1).unwrap();
            dumps.push(tree.to_string());
        }

        assert_eq!(
            dumps[0],
            "ROOT [InProgress]\n  Patrol [InProgress]\n    Walk [InProgress]\n    Look [Unknown]"
        );
        assert_eq!(
            dumps[1],
            "ROOT [InProgress]\n  Patrol [InProgress]\n    Walk [Succeeded]\n    Look [Unknown]"
        );
        assert_eq!(
            dumps[2],
            "ROOT [InProgress]\n  Patrol [Failed]\n    Walk [Succeeded]\n    Look [Failed]"
        );
        // fully resolved: the step performs no work and everything restarts
        assert_eq!(
            dumps[3],
            "ROOT [Unknown]\n  Patrol [Unknown]\n    Walk [Unknown]\n    Look [Unknown]"
        );
    }

    #[test]
    fn services_feed_gates_in_the_same_pass() {
        let sensed = Arc::new(Mutex::new(false));
        let writer = sensed.clone();
        let reader = sensed.clone();

        let mut tree = BehaviourTree::new();
        let base = tree.root_mut().add_child(Node::selector("Base Logic")).unwrap();
        base.add_service("Search for target", move |_| *writer.lock().unwrap() = true);
        base.add_child(Node::action("Chase", || Status::InProgress, || Status::InProgress))
            .unwrap()
            .add_decorator("Can Chase?", move || *reader.lock().unwrap());

        tree.start().unwrap();
        tree.advance(0.1).unwrap();

        let snapshot = tree.snapshot();
        assert_eq!(snapshot.find("Chase").unwrap().status, Status::InProgress);
        assert!(snapshot.find("Chase").unwrap().decorators[0].passing);
    }
}
