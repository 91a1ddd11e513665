//! [`Element`] – the contract shared by every tree participant.
//!
//! Nodes, decorators and services all carry a display name and know how to
//! render themselves into the indented debug dump produced by
//! [`BehaviourTree::debug_snapshot`][crate::tree::BehaviourTree::debug_snapshot].
//! Rendering never affects evaluation.

/// A named participant of a behaviour tree that can render debug text.
pub trait Element {
    /// Display name, used for diagnostics only.
    fn name(&self) -> &str;

    /// Append this element's summary line (and anything it owns, one indent
    /// level deeper) to `buffer`, prefixed by `indent_level` spaces.
    fn render_debug(&self, buffer: &mut String, indent_level: usize);

    /// Render into a fresh string.
    fn debug_text(&self, indent_level: usize) -> String {
        let mut buffer = String::new();
        self.render_debug(&mut buffer, indent_level);
        buffer
    }
}

pub(crate) fn push_indent(buffer: &mut String, indent_level: usize) {
    buffer.push_str(&" ".repeat(indent_level));
}
