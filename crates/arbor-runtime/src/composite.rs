//! Composite policies.
//!
//! Every node shares the same tick state machine (see [`crate::node`]); the
//! [`NodeKind`] only supplies the points where composites differ:
//!
//! | Kind           | Continue after child failed | Continue after child succeeded | All children ticked      |
//! |----------------|-----------------------------|--------------------------------|--------------------------|
//! | `Plain`        | yes                         | yes                            | keep status              |
//! | `Sequence`     | no                          | yes                            | last child's status      |
//! | `Selector`     | yes                         | no                             | last child's status      |
//! | `Condition`    | yes                         | yes                            | keep status              |
//! | `ReturnResult` | yes                         | yes                            | fixed status             |
//! | `Parallel`     | –                           | –                              | primary's status         |

use arbor_types::Status;

use crate::decorator::PredicateFn;
use crate::node::Node;

/// Node specialisation, dispatched by the shared state machine.
pub(crate) enum NodeKind {
    /// No composite behaviour: the ROOT placeholder and leaf actions.
    Plain,
    Sequence,
    Selector,
    /// Wraps `predicate` as both enter and tick callback.
    Condition {
        predicate: PredicateFn,
        was_previously_able_to_run: bool,
    },
    /// Always reports the fixed status.
    ReturnResult(Status),
    /// Two-slot composite; ordinary children are rejected.
    Parallel {
        primary: Option<Box<Node>>,
        secondary: Option<Box<Node>>,
    },
}

impl NodeKind {
    pub(crate) fn continue_if_child_failed(&self) -> bool {
        !matches!(self, NodeKind::Sequence)
    }

    pub(crate) fn continue_if_child_succeeded(&self) -> bool {
        !matches!(self, NodeKind::Selector)
    }

    /// Status to adopt once every child has been visited without an early
    /// stop, given the last child's status.  `None` keeps the current status.
    pub(crate) fn status_after_all_children(&self, last_child: Option<Status>) -> Option<Status> {
        match self {
            NodeKind::Sequence | NodeKind::Selector => last_child,
            _ => None,
        }
    }

    pub(crate) fn accepts_children(&self) -> bool {
        !matches!(self, NodeKind::Parallel { .. })
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            NodeKind::Plain => "plain",
            NodeKind::Sequence => "sequence",
            NodeKind::Selector => "selector",
            NodeKind::Condition { .. } => "condition",
            NodeKind::ReturnResult(_) => "return_result",
            NodeKind::Parallel { .. } => "parallel",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_stops_on_failure_only() {
        let kind = NodeKind::Sequence;
        assert!(!kind.continue_if_child_failed());
        assert!(kind.continue_if_child_succeeded());
    }

    #[test]
    fn selector_stops_on_success_only() {
        let kind = NodeKind::Selector;
        assert!(kind.continue_if_child_failed());
        assert!(!kind.continue_if_child_succeeded());
    }

    #[test]
    fn only_sequence_and_selector_adopt_last_child() {
        assert_eq!(
            NodeKind::Sequence.status_after_all_children(Some(Status::Succeeded)),
            Some(Status::Succeeded)
        );
        assert_eq!(
            NodeKind::Selector.status_after_all_children(Some(Status::Failed)),
            Some(Status::Failed)
        );
        assert_eq!(NodeKind::Plain.status_after_all_children(Some(Status::Failed)), None);
    }

    #[test]
    fn parallel_rejects_children() {
        let parallel = NodeKind::Parallel {
            primary: None,
            secondary: None,
        };
        assert!(!parallel.accepts_children());
        assert!(NodeKind::Plain.accepts_children());
    }
}
