//! Naming and scope stack for specialization bodies.
//!
//! Each frame's bindings are an `im::HashMap`: opening a scope clones the
//! parent's map in O(1) via structural sharing, so lookups only ever
//! consult the top frame and the innermost binding of a name wins.
//!
//! Frames also collect release obligations: values whose reference is
//! dropped when the frame closes. The stack only records them; the
//! generation context emits the unreference calls.
//!
//! Generated display names are `<dots><name>__<n>`, with one leading dot
//! per inlining level and `n` counting per prefix from 1. Counters reset
//! at the start of every specialization.

use im::HashMap;
use rustc_hash::FxHashMap;

use super::low_type::{LowType, TypedValue};
use super::value_id::ValueId;

/// How a name is bound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScopeBinding {
    /// SSA value, cannot be reassigned.
    Immutable(TypedValue),
    /// Pointer to a slot holding a value of type `ty`.
    Mutable { ptr: ValueId, ty: LowType },
}

#[derive(Clone, Default)]
struct Frame {
    bindings: HashMap<String, ScopeBinding>,
    releases: Vec<TypedValue>,
}

/// Per-specialization generator of `prefix__n` names.
#[derive(Default)]
pub struct NameGenerator {
    counters: FxHashMap<String, u32>,
}

impl NameGenerator {
    /// Next name for `prefix`: `prefix__1`, `prefix__2`, ...
    pub fn unique(&mut self, prefix: &str) -> String {
        let counter = self.counters.entry(prefix.to_string()).or_insert(0);
        *counter += 1;
        format!("{prefix}__{counter}")
    }

    pub fn reset(&mut self) {
        self.counters.clear();
    }
}

/// Stack of lexical scopes plus naming state.
#[derive(Default)]
pub struct ScopeStack {
    frames: Vec<Frame>,
    names: NameGenerator,
    inlining_depth: u32,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard all frames, counters and inlining state.
    pub fn reset(&mut self) {
        self.frames.clear();
        self.names.reset();
        self.inlining_depth = 0;
    }

    /// Push a frame inheriting every binding of the current top.
    pub fn open_scope(&mut self) {
        let bindings = self
            .frames
            .last()
            .map(|top| top.bindings.clone())
            .unwrap_or_default();
        self.frames.push(Frame {
            bindings,
            releases: Vec::new(),
        });
    }

    /// Pop the top frame, returning its release obligations in
    /// reverse registration order. `None` if no frame is open.
    pub fn close_scope(&mut self) -> Option<Vec<TypedValue>> {
        let frame = self.frames.pop()?;
        let mut releases = frame.releases;
        releases.reverse();
        Some(releases)
    }

    /// Release obligations of every open frame, innermost frame first and
    /// each frame in reverse registration order. Frames stay open.
    pub fn pending_releases(&self) -> Vec<TypedValue> {
        self.frames
            .iter()
            .rev()
            .flat_map(|frame| frame.releases.iter().rev().cloned())
            .collect()
    }

    /// Number of open frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Bind `name` in the top frame, opening one if none is open.
    pub fn bind(&mut self, name: &str, binding: ScopeBinding) {
        if self.frames.is_empty() {
            self.open_scope();
        }
        if let Some(top) = self.frames.last_mut() {
            top.bindings.insert(name.to_string(), binding);
        }
    }

    /// Innermost binding of `name`.
    pub fn lookup(&self, name: &str) -> Option<&ScopeBinding> {
        self.frames.last()?.bindings.get(name)
    }

    /// Record a value to unreference when the top frame closes.
    pub fn add_release(&mut self, value: TypedValue) {
        if self.frames.is_empty() {
            self.open_scope();
        }
        if let Some(top) = self.frames.last_mut() {
            top.releases.push(value);
        }
    }

    pub fn unique_name(&mut self, prefix: &str) -> String {
        self.names.unique(prefix)
    }

    /// Display-name prefix for the current inlining depth.
    pub fn inlining_prefix(&self) -> String {
        ".".repeat(self.inlining_depth as usize)
    }

    pub fn inlining_depth(&self) -> u32 {
        self.inlining_depth
    }

    pub(crate) fn set_inlining_depth(&mut self, depth: u32) {
        self.inlining_depth = depth;
    }

    /// Enter an inlined body: deeper names and a fresh scope.
    pub fn start_inlining(&mut self) {
        self.inlining_depth += 1;
        self.open_scope();
    }

    /// Leave an inlined body, returning the closed frame's releases.
    pub fn stop_inlining(&mut self) -> Option<Vec<TypedValue>> {
        self.inlining_depth = self.inlining_depth.saturating_sub(1);
        self.close_scope()
    }
}

#[cfg(test)]
mod tests;
