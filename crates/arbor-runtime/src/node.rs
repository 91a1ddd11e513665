//! [`Node`] – the behaviour tree vertex and its tick state machine.
//!
//! A node owns its children (index 0 = highest priority), decorators and
//! services.  Leaf actions are ordinary nodes built with enter/tick
//! callbacks; composites differ only by their continuation policy.
//!
//! # One evaluation pass
//!
//! 1. A node blocked by its decorators reports `Failed`.
//! 2. Services run.
//! 3. On first visit (`Unknown`) the node is entered.  Entering into `Failed`
//!    ends the pass.
//! 4. A tick callback, when present, is invoked; anything other than
//!    `InProgress` ends the pass.
//! 5. A childless node without a tick callback succeeds.
//! 6. Children are visited in priority order.  An `InProgress` child is
//!    resumed alone, already-resolved children are skipped, and a child whose
//!    gate has just opened aborts every lower-priority sibling.
//!
//! # Example
//!
//! ```rust
//! use arbor_runtime::node::Node;
//! use arbor_types::Status;
//!
//! let mut sequence = Node::sequence("Patrol");
//! sequence.add_child(Node::action("Look", || Status::Succeeded, || Status::Succeeded)).unwrap();
//! sequence.add_child(Node::action("Walk", || Status::InProgress, || Status::Succeeded)).unwrap();
//!
//! sequence.reset();
//! assert!(sequence.tick(0.1));
//! assert_eq!(sequence.last_status(), Status::Succeeded);
//! ```

use arbor_types::{Status, TreeError};
use tracing::{debug, trace};

use crate::composite::NodeKind;
use crate::decorator::Decorator;
use crate::element::{Element, push_indent};
use crate::service::Service;

/// Enter or tick callback of a node.
pub type StatusFn = Box<dyn FnMut() -> Status + Send>;

/// A vertex of a behaviour tree.
pub struct Node {
    name: String,
    kind: NodeKind,
    children: Vec<Node>,
    decorators: Vec<Decorator>,
    services: Vec<Service>,
    on_enter: Option<StatusFn>,
    on_tick: Option<StatusFn>,
    last_status: Status,
    decorators_permit_running: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Construction
// ─────────────────────────────────────────────────────────────────────────────

impl Node {
    fn with_kind(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            children: Vec::new(),
            decorators: Vec::new(),
            services: Vec::new(),
            on_enter: None,
            on_tick: None,
            last_status: Status::Unknown,
            decorators_permit_running: true,
        }
    }

    /// A plain node: succeeds immediately when childless, otherwise keeps
    /// visiting children regardless of their outcome.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_kind(name, NodeKind::Plain)
    }

    /// A leaf action driven by an enter and a tick callback.
    pub fn action(
        name: impl Into<String>,
        on_enter: impl FnMut() -> Status + Send + 'static,
        on_tick: impl FnMut() -> Status + Send + 'static,
    ) -> Self {
        Self::new(name).with_on_enter(on_enter).with_on_tick(on_tick)
    }

    /// Ticks children in order and fails on the first child failure.
    pub fn sequence(name: impl Into<String>) -> Self {
        Self::with_kind(name, NodeKind::Sequence)
    }

    /// Ticks children in order and succeeds on the first child success.
    pub fn selector(name: impl Into<String>) -> Self {
        Self::with_kind(name, NodeKind::Selector)
    }

    /// Runs while `predicate` holds (`InProgress`), fails otherwise.  Whenever
    /// the predicate's answer changes the children are reset.
    pub fn condition(name: impl Into<String>, predicate: impl FnMut() -> bool + Send + 'static) -> Self {
        Self::with_kind(
            name,
            NodeKind::Condition {
                predicate: Box::new(predicate),
                was_previously_able_to_run: false,
            },
        )
    }

    /// Always reports `status`.  Named `Return {status}`.
    pub fn return_result(status: Status) -> Self {
        Self::with_kind(format!("Return {status}"), NodeKind::ReturnResult(status))
    }

    pub fn return_result_named(status: Status, name: impl Into<String>) -> Self {
        let name = name.into();
        if name.is_empty() {
            return Self::return_result(status);
        }
        Self::with_kind(name, NodeKind::ReturnResult(status))
    }

    /// A two-slot composite.  Populate it with [`Node::set_primary`] and
    /// [`Node::set_secondary`].
    pub fn parallel(name: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            NodeKind::Parallel {
                primary: None,
                secondary: None,
            },
        )
    }

    pub fn with_on_enter(mut self, on_enter: impl FnMut() -> Status + Send + 'static) -> Self {
        self.on_enter = Some(Box::new(on_enter));
        self
    }

    pub fn with_on_tick(mut self, on_tick: impl FnMut() -> Status + Send + 'static) -> Self {
        self.on_tick = Some(Box::new(on_tick));
        self
    }

    /// Attach `child` as the lowest-priority child and return it for further
    /// wiring.
    ///
    /// # Errors
    ///
    /// [`TreeError::ParallelChildAttach`] when `self` is a parallel node.
    pub fn add_child(&mut self, child: Node) -> Result<&mut Node, TreeError> {
        if !self.kind.accepts_children() {
            return Err(TreeError::ParallelChildAttach {
                parent: self.name.clone(),
            });
        }
        self.children.push(child);
        let index = self.children.len() - 1;
        Ok(&mut self.children[index])
    }

    pub fn add_decorator(
        &mut self,
        name: impl Into<String>,
        predicate: impl FnMut() -> bool + Send + 'static,
    ) -> &mut Self {
        self.decorators.push(Decorator::new(name, predicate));
        self
    }

    pub fn attach_decorator(&mut self, decorator: Decorator) -> &mut Self {
        self.decorators.push(decorator);
        self
    }

    pub fn add_service(&mut self, name: impl Into<String>, callback: impl FnMut(f32) + Send + 'static) -> &mut Self {
        self.services.push(Service::new(name, callback));
        self
    }

    pub fn attach_service(&mut self, service: Service) -> &mut Self {
        self.services.push(service);
        self
    }

    /// Install the primary child of a parallel node, replacing any previous
    /// one.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotParallel`] when `self` is not a parallel node.
    pub fn set_primary(&mut self, node: Node) -> Result<&mut Node, TreeError> {
        match &mut self.kind {
            NodeKind::Parallel { primary, .. } => Ok(&mut **primary.insert(Box::new(node))),
            _ => Err(TreeError::NotParallel {
                node: self.name.clone(),
            }),
        }
    }

    /// Install the secondary child of a parallel node.  The secondary runs
    /// for side effects only.
    pub fn set_secondary(&mut self, node: Node) -> Result<&mut Node, TreeError> {
        match &mut self.kind {
            NodeKind::Parallel { secondary, .. } => Ok(&mut **secondary.insert(Box::new(node))),
            _ => Err(TreeError::NotParallel {
                node: self.name.clone(),
            }),
        }
    }

    /// Reject structures that cannot be ticked meaningfully.
    ///
    /// # Errors
    ///
    /// [`TreeError::MissingPrimary`] for a parallel node without a primary.
    pub fn validate(&self) -> Result<(), TreeError> {
        if let NodeKind::Parallel { primary: None, .. } = self.kind {
            return Err(TreeError::MissingPrimary {
                node: self.name.clone(),
            });
        }
        self.attached().try_for_each(Node::validate)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Accessors
// ─────────────────────────────────────────────────────────────────────────────

impl Node {
    pub fn last_status(&self) -> Status {
        self.last_status
    }

    pub fn decorators_permit_running(&self) -> bool {
        self.decorators_permit_running
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn decorators(&self) -> &[Decorator] {
        &self.decorators
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn primary(&self) -> Option<&Node> {
        match &self.kind {
            NodeKind::Parallel { primary, .. } => primary.as_deref(),
            _ => None,
        }
    }

    pub fn secondary(&self) -> Option<&Node> {
        match &self.kind {
            NodeKind::Parallel { secondary, .. } => secondary.as_deref(),
            _ => None,
        }
    }

    /// Short label of the node's composite kind (`"sequence"`, …).
    pub fn kind_label(&self) -> &'static str {
        self.kind.label()
    }

    /// Depth-first search for the first node called `name`.
    pub fn find(&self, name: &str) -> Option<&Node> {
        if self.name == name {
            return Some(self);
        }
        self.attached().find_map(|node| node.find(name))
    }

    /// Children followed by the parallel slots, in rendering order.
    pub(crate) fn attached(&self) -> impl Iterator<Item = &Node> + '_ {
        let slots = match &self.kind {
            NodeKind::Parallel { primary, secondary } => [primary.as_deref(), secondary.as_deref()],
            _ => [None, None],
        };
        self.children.iter().chain(slots.into_iter().flatten())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tick state machine
// ─────────────────────────────────────────────────────────────────────────────

impl Node {
    /// Forget this pass: the node and its whole subtree return to `Unknown`.
    pub fn reset(&mut self) {
        self.last_status = Status::Unknown;

        for child in &mut self.children {
            child.reset();
        }

        if let NodeKind::Parallel { primary, secondary } = &mut self.kind {
            for slot in primary.iter_mut().chain(secondary.iter_mut()) {
                slot.reset();
            }
        }
    }

    /// Interrupt a node that was running when a higher-priority sibling
    /// became eligible.
    pub fn abort(&mut self) {
        debug!(node = %self.name, status = %self.last_status, "aborting node");
        self.reset();
    }

    /// Run one evaluation pass.
    ///
    /// Returns whether any work was performed.  When nothing happened the
    /// subtree is reset so that the next pass starts from scratch.
    pub fn tick(&mut self, delta_time: f32) -> bool {
        let ticked_any_nodes = self.on_tick(delta_time);

        if !ticked_any_nodes {
            trace!(node = %self.name, "no work performed; resetting");
            self.reset();
        }

        ticked_any_nodes
    }

    /// Evaluate decorators in order, stopping at the first `false`.
    ///
    /// A node that has just become permitted again is reset so it restarts
    /// instead of resuming stale progress.
    pub fn evaluate_decorators(&mut self) -> bool {
        let can_run = self.decorators.iter_mut().all(Decorator::evaluate);

        if can_run != self.decorators_permit_running {
            self.decorators_permit_running = can_run;
            trace!(node = %self.name, can_run, "decorator gate changed");

            if can_run {
                self.reset();
            }
        }

        can_run
    }

    pub fn tick_services(&mut self, delta_time: f32) {
        for service in &mut self.services {
            service.on_tick(delta_time);
        }
    }

    fn on_tick(&mut self, delta_time: f32) -> bool {
        match self.kind {
            NodeKind::Parallel { .. } => self.on_tick_parallel(delta_time),
            NodeKind::ReturnResult(fixed) => {
                self.run_pass(delta_time);
                self.last_status = fixed;
                true
            }
            _ => self.run_pass(delta_time),
        }
    }

    fn run_pass(&mut self, delta_time: f32) -> bool {
        let mut ticked_any_nodes = false;

        if !self.decorators_permit_running {
            self.last_status = Status::Failed;
            return true;
        }

        self.tick_services(delta_time);

        if self.last_status == Status::Unknown {
            self.on_enter();
            ticked_any_nodes = true;

            if self.last_status == Status::Failed {
                return ticked_any_nodes;
            }
        }

        if let Some(status) = self.invoke_tick() {
            self.last_status = status;
            ticked_any_nodes = true;

            if status != Status::InProgress {
                return ticked_any_nodes;
            }
        }

        if self.children.is_empty() {
            if !self.has_tick_callback() {
                self.last_status = Status::Succeeded;
            }
            return ticked_any_nodes;
        }

        let continue_on_failure = self.kind.continue_if_child_failed();
        let continue_on_success = self.kind.continue_if_child_succeeded();

        for index in 0..self.children.len() {
            let child = &mut self.children[index];

            let previously_enabled = child.decorators_permit_running;
            let currently_enabled = child.evaluate_decorators();

            // resume the single active branch
            if child.last_status == Status::InProgress {
                ticked_any_nodes |= child.tick(delta_time);
                return ticked_any_nodes;
            }

            // already resolved this pass
            if child.last_status.is_terminal() {
                continue;
            }

            ticked_any_nodes |= child.tick(delta_time);
            let child_status = child.last_status;
            self.last_status = child_status;

            if !previously_enabled && currently_enabled {
                for later in &mut self.children[index + 1..] {
                    if later.last_status == Status::InProgress {
                        later.abort();
                    } else {
                        later.reset();
                    }
                }
            }

            match child_status {
                Status::InProgress => return ticked_any_nodes,
                Status::Failed if !continue_on_failure => return ticked_any_nodes,
                Status::Succeeded if !continue_on_success => return ticked_any_nodes,
                _ => {}
            }
        }

        let last_child = self.children.last().map(Node::last_status);
        if let Some(status) = self.kind.status_after_all_children(last_child) {
            self.last_status = status;
        }

        ticked_any_nodes
    }

    fn on_tick_parallel(&mut self, delta_time: f32) -> bool {
        if !self.decorators_permit_running {
            self.last_status = Status::Failed;
            return true;
        }

        if self.primary().is_none() {
            self.last_status = Status::Failed;
            return false;
        }

        self.tick_services(delta_time);

        let NodeKind::Parallel {
            primary: Some(primary),
            secondary,
        } = &mut self.kind
        else {
            return false;
        };

        let primary_was_enabled = primary.decorators_permit_running;
        let primary_is_enabled = primary.evaluate_decorators();
        if !primary_was_enabled && primary_is_enabled {
            primary.reset();
        }

        // a blocked primary resolves to Failed inside its own pass
        let ticked_any_nodes = primary.tick(delta_time);

        if let Some(secondary) = secondary.as_mut() {
            let secondary_was_enabled = secondary.decorators_permit_running;
            let secondary_is_enabled = secondary.evaluate_decorators();
            if !secondary_was_enabled && secondary_is_enabled {
                secondary.reset();
            }
            if secondary_is_enabled {
                secondary.tick(delta_time);
            }
        }

        self.last_status = primary.last_status;
        ticked_any_nodes
    }

    fn on_enter(&mut self) {
        self.last_status = if let Some(status) = self.evaluate_condition() {
            status
        } else if let Some(on_enter) = self.on_enter.as_mut() {
            on_enter()
        } else if self.children.is_empty() {
            Status::Succeeded
        } else {
            Status::InProgress
        };

        if let NodeKind::ReturnResult(fixed) = self.kind {
            self.last_status = fixed;
        }

        trace!(node = %self.name, kind = self.kind.label(), status = %self.last_status, "entered node");
    }

    fn has_tick_callback(&self) -> bool {
        self.on_tick.is_some() || matches!(self.kind, NodeKind::Condition { .. })
    }

    fn invoke_tick(&mut self) -> Option<Status> {
        if let Some(status) = self.evaluate_condition() {
            return Some(status);
        }
        self.on_tick.as_mut().map(|on_tick| on_tick())
    }

    /// Condition nodes only: query the predicate, resetting the children when
    /// its answer changed.
    fn evaluate_condition(&mut self) -> Option<Status> {
        let NodeKind::Condition {
            predicate,
            was_previously_able_to_run,
        } = &mut self.kind
        else {
            return None;
        };

        let can_run = predicate();

        if can_run != *was_previously_able_to_run {
            *was_previously_able_to_run = can_run;

            for child in &mut self.children {
                child.reset();
            }
        }

        Some(if can_run { Status::InProgress } else { Status::Failed })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Debug rendering
// ─────────────────────────────────────────────────────────────────────────────

impl Element for Node {
    fn name(&self) -> &str {
        &self.name
    }

    fn render_debug(&self, buffer: &mut String, indent_level: usize) {
        push_indent(buffer, indent_level);
        buffer.push_str(&format!("{} [{}]", self.name, self.last_status));

        for service in &self.services {
            buffer.push('\n');
            service.render_debug(buffer, indent_level + 1);
        }

        for decorator in &self.decorators {
            buffer.push('\n');
            decorator.render_debug(buffer, indent_level + 1);
        }

        for child in self.attached() {
            buffer.push('\n');
            child.render_debug(buffer, indent_level + 2);
        }
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("kind", &self.kind.label())
            .field("last_status", &self.last_status)
            .field("decorators_permit_running", &self.decorators_permit_running)
            .field("children", &self.attached().collect::<Vec<_>>())
            .finish()
    }
}
