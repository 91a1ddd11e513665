//! [`Service`] – a background callback attached to a node.
//!
//! Services run every time their owning node is visited, before the node's
//! own enter/tick logic, so they can refresh blackboard state that the node's
//! gates read in the same pass.

use crate::element::{Element, push_indent};

/// Callback invoked by a [`Service`] with the elapsed step time in seconds.
pub type ServiceFn = Box<dyn FnMut(f32) + Send>;

/// A named, per-visit side-effecting callback.
pub struct Service {
    name: String,
    callback: Option<ServiceFn>,
}

impl Service {
    pub fn new(name: impl Into<String>, callback: impl FnMut(f32) + Send + 'static) -> Self {
        Self {
            name: name.into(),
            callback: Some(Box::new(callback)),
        }
    }

    /// A service with no callback; ticking it does nothing.
    pub fn unbound(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            callback: None,
        }
    }

    pub fn on_tick(&mut self, delta_time: f32) {
        if let Some(callback) = self.callback.as_mut() {
            callback(delta_time);
        }
    }
}

impl Element for Service {
    fn name(&self) -> &str {
        &self.name
    }

    fn render_debug(&self, buffer: &mut String, indent_level: usize) {
        push_indent(buffer, indent_level);
        buffer.push_str("S: ");
        buffer.push_str(&self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn on_tick_forwards_delta_time() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_ref = seen.clone();
        let mut service = Service::new("Cooldown", move |dt| seen_ref.lock().unwrap().push(dt));

        service.on_tick(0.5);
        service.on_tick(0.25);

        assert_eq!(*seen.lock().unwrap(), vec![0.5, 0.25]);
    }

    #[test]
    fn unbound_service_is_noop() {
        let mut service = Service::unbound("idle");
        service.on_tick(1.0);
        assert_eq!(service.debug_text(2), "  S: idle");
    }
}
