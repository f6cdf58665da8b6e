//! Element contract
//!
//! Every decision and action implements [`Element`]. The engine calls `step`
//! from a single call site and reads `reevaluates` once, at push time.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::directive::{Directive, Payload};

/// A decision or action living on the control stack.
///
/// `C` is the driver's context type; the engine forwards it to every step
/// without looking inside.
pub trait Element<C>: Send {
    /// Decide what happens next. Stack changes go through the returned
    /// directive only; effects on the robot go through `ctx`.
    fn step(&mut self, ctx: &mut C) -> Directive;

    /// Whether this element is stepped every tick even when buried under
    /// other elements. Read once when the element is pushed.
    fn reevaluates(&self) -> bool {
        false
    }

    /// Hand over the debug fields captured by the last step and clear them.
    fn take_debug(&mut self) -> DebugData {
        DebugData::default()
    }
}

/// Key/value debug fields an element records while stepping.
///
/// Fields are consumed when read so a report never shows data from an earlier step.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DebugData {
    fields: BTreeMap<String, Payload>,
}

impl DebugData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Payload>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Payload> {
        self.fields.get(key)
    }

    /// Move the fields out, leaving this instance empty.
    pub fn take(&mut self) -> DebugData {
        std::mem::take(self)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Payload)> {
        self.fields.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn take_clears_fields() {
        let mut debug = DebugData::new();
        debug.set("distance", 1.5);
        debug.set("branch", "search");

        let taken = debug.take();
        assert_eq!(taken.len(), 2);
        assert_eq!(taken.get("branch"), Some(&json!("search")));
        assert!(debug.is_empty());
    }

    #[test]
    fn serializes_as_plain_map() {
        let mut debug = DebugData::new();
        debug.set("seen", true);
        assert_eq!(serde_json::to_value(&debug).unwrap(), json!({"seen": true}));
    }
}
