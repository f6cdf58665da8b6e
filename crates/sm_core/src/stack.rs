//! Control stack
//!
//! Owned, ordered sequence of live elements. Position 0 is the root and is
//! never removed; the last position is the active leaf. Elements are addressed
//! by position, so truncation is a plain resize of the frame vector.

use crate::catalog::Catalog;
use crate::directive::{Directive, Payload, Role};
use crate::element::Element;
use crate::error::{EngineError, Result};
use crate::snapshot::{ElementSnapshot, StackSnapshot};

struct Frame<C> {
    kind: &'static str,
    role: Role,
    payload: Payload,
    reevaluates: bool,
    element: Box<dyn Element<C>>,
}

impl<C> Frame<C> {
    fn build(catalog: &Catalog<C>, kind: &'static str, payload: Payload) -> Result<Self> {
        let element = catalog.build(kind, &payload)?;
        // `build` succeeded, so the kind is registered.
        let role = catalog.role(kind).unwrap_or(Role::Decision);
        let reevaluates = element.reevaluates();
        Ok(Self { kind, role, payload, reevaluates, element })
    }
}

pub struct ControlStack<C> {
    frames: Vec<Frame<C>>,
}

impl<C> ControlStack<C> {
    /// Create a stack holding only the root element.
    pub fn with_root(catalog: &Catalog<C>, kind: &'static str, payload: Payload) -> Result<Self> {
        let root = Frame::build(catalog, kind, payload)?;
        Ok(Self { frames: vec![root] })
    }

    /// Construct `kind` from `payload` and place it on top. Returns its position.
    pub fn push(&mut self, catalog: &Catalog<C>, kind: &'static str, payload: Payload) -> Result<usize> {
        let frame = Frame::build(catalog, kind, payload)?;
        self.frames.push(frame);
        log::debug!("push {} at {}", kind, self.top_index());
        Ok(self.top_index())
    }

    /// Remove the top element. The root cannot be popped.
    pub fn pop(&mut self) -> Result<()> {
        if self.frames.len() <= 1 {
            return Err(EngineError::RootPopped);
        }
        if let Some(frame) = self.frames.pop() {
            log::debug!("pop {} from {}", frame.kind, self.frames.len());
        }
        Ok(())
    }

    /// Destroy every element above `index`, top first. Returns how many were removed.
    ///
    /// An `index` at or past the top removes nothing.
    pub fn truncate_above(&mut self, index: usize) -> usize {
        let mut removed = 0;
        while self.frames.len() > index + 1 {
            if let Some(frame) = self.frames.pop() {
                log::debug!("drop {} from {}", frame.kind, self.frames.len());
                removed += 1;
            }
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn top_index(&self) -> usize {
        self.frames.len().saturating_sub(1)
    }

    pub fn kind_at(&self, index: usize) -> Option<&'static str> {
        self.frames.get(index).map(|f| f.kind)
    }

    pub fn payload_at(&self, index: usize) -> Option<&Payload> {
        self.frames.get(index).map(|f| &f.payload)
    }

    pub fn reevaluates_at(&self, index: usize) -> bool {
        self.frames.get(index).is_some_and(|f| f.reevaluates)
    }

    /// Kinds bottom to top.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.frames.iter().map(|f| f.kind).collect()
    }

    /// Whether `index` holds an element of `kind` built from an equal payload.
    pub fn matches(&self, index: usize, kind: &str, payload: &Payload) -> bool {
        self.frames.get(index).is_some_and(|f| f.kind == kind && f.payload == *payload)
    }

    /// Closest position below `index` whose element reevaluates.
    pub fn nearest_reevaluating_below(&self, index: usize) -> Option<usize> {
        let end = index.min(self.frames.len());
        self.frames[..end].iter().rposition(|f| f.reevaluates)
    }

    /// Step the element at `index`. Callers keep `index` within bounds.
    pub(crate) fn step(&mut self, index: usize, ctx: &mut C) -> Directive {
        let frame = &mut self.frames[index];
        let directive = frame.element.step(ctx);
        log::trace!("step {}@{} -> {:?}", frame.kind, index, directive.kind());
        directive
    }

    /// Report the element at `index`, consuming its pending debug fields.
    /// Callers keep `index` within bounds.
    pub(crate) fn snapshot_at(&mut self, index: usize) -> ElementSnapshot {
        let frame = &mut self.frames[index];
        ElementSnapshot {
            position: index,
            kind: frame.kind,
            role: frame.role,
            debug: frame.element.take_debug(),
        }
    }

    /// Report the whole stack, consuming pending debug fields.
    pub fn snapshot(&mut self) -> StackSnapshot {
        let elements = (0..self.frames.len()).map(|i| self.snapshot_at(i)).collect();
        StackSnapshot { elements }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{catalog, Lifecycle, World};

    fn stack_of(kinds: &[&'static str], lifecycle: &Lifecycle) -> ControlStack<World> {
        let catalog = catalog(lifecycle);
        let mut stack = ControlStack::with_root(&catalog, kinds[0], Payload::Null).unwrap();
        for kind in kinds[1..].iter().copied() {
            stack.push(&catalog, kind, Payload::Null).unwrap();
        }
        stack
    }

    #[test]
    fn root_cannot_be_popped() {
        let lifecycle = Lifecycle::default();
        let mut stack = stack_of(&["Root"], &lifecycle);
        assert_eq!(stack.pop(), Err(EngineError::RootPopped));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn truncate_destroys_each_element_once() {
        let lifecycle = Lifecycle::default();
        let mut stack = stack_of(&["Root", "Chooser", "Leaf", "Leaf"], &lifecycle);
        assert_eq!(stack.truncate_above(1), 2);
        assert_eq!(stack.kinds(), vec!["Root", "Chooser"]);
        assert_eq!(lifecycle.dropped(), 2);

        // past the top: nothing to do
        assert_eq!(stack.truncate_above(7), 0);
        assert_eq!(lifecycle.dropped(), 2);
    }

    #[test]
    fn matches_compares_kind_and_payload() {
        let lifecycle = Lifecycle::default();
        let catalog = catalog(&lifecycle);
        let mut stack = ControlStack::with_root(&catalog, "Root", Payload::Null).unwrap();
        stack.push(&catalog, "Leaf", serde_json::json!({"dir": 1.0})).unwrap();

        assert!(stack.matches(1, "Leaf", &serde_json::json!({"dir": 1.0})));
        assert!(!stack.matches(1, "Leaf", &serde_json::json!({"dir": 2.0})));
        assert!(!stack.matches(1, "Other", &serde_json::json!({"dir": 1.0})));
        assert!(!stack.matches(2, "Leaf", &serde_json::json!({"dir": 1.0})));
    }

    #[test]
    fn nearest_reevaluating_ancestor() {
        let lifecycle = Lifecycle::default();
        let stack = stack_of(&["Root", "Chooser", "Leaf", "Leaf"], &lifecycle);
        assert_eq!(stack.nearest_reevaluating_below(3), Some(1));
        assert_eq!(stack.nearest_reevaluating_below(1), None);
    }

    #[test]
    fn unknown_kind_leaves_stack_untouched() {
        let lifecycle = Lifecycle::default();
        let catalog = catalog(&lifecycle);
        let mut stack = ControlStack::with_root(&catalog, "Root", Payload::Null).unwrap();
        let err = stack.push(&catalog, "Kick", Payload::Null).unwrap_err();
        assert_eq!(err, EngineError::UnknownElement { kind: "Kick".into() });
        assert_eq!(stack.len(), 1);
    }
}
