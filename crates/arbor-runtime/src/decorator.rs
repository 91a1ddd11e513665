//! [`Decorator`] – a boolean gate attached to a node.
//!
//! Before a parent descends into a child it evaluates the child's decorators
//! in attachment order.  The first `false` stops evaluation and blocks the
//! child for the current pass.

use crate::element::{Element, push_indent};

/// Predicate invoked by a [`Decorator`].
pub type PredicateFn = Box<dyn FnMut() -> bool + Send>;

/// A named gate that decides whether its owning node may run.
pub struct Decorator {
    name: String,
    predicate: Option<PredicateFn>,
    last_result: bool,
}

impl Decorator {
    /// Construct a decorator backed by `predicate`.
    pub fn new(name: impl Into<String>, predicate: impl FnMut() -> bool + Send + 'static) -> Self {
        Self {
            name: name.into(),
            predicate: Some(Box::new(predicate)),
            last_result: false,
        }
    }

    /// Construct a decorator with no predicate.  It always evaluates to
    /// `false`.
    pub fn unbound(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            predicate: None,
            last_result: false,
        }
    }

    /// Invoke the predicate and remember the result for debug rendering.
    pub fn evaluate(&mut self) -> bool {
        self.last_result = match self.predicate.as_mut() {
            Some(predicate) => predicate(),
            None => false,
        };
        self.last_result
    }

    /// Result of the most recent [`evaluate`][Decorator::evaluate] call
    /// (`false` before the first call).
    pub fn last_result(&self) -> bool {
        self.last_result
    }
}

impl Element for Decorator {
    fn name(&self) -> &str {
        &self.name
    }

    fn render_debug(&self, buffer: &mut String, indent_level: usize) {
        push_indent(buffer, indent_level);
        let verdict = if self.last_result { "PASS" } else { "FAIL" };
        buffer.push_str(&format!("D: {} [{}]", self.name, verdict));
    }
}
