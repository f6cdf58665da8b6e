//! Read-only stack reports for diagnostics.

use std::fmt;

use serde::Serialize;

use crate::directive::Role;
use crate::element::DebugData;

/// One element as seen by a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementSnapshot {
    /// 0-based stack position, root = 0.
    pub position: usize,
    pub kind: &'static str,
    pub role: Role,
    pub debug: DebugData,
}

impl fmt::Display for ElementSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = serde_json::to_string(&self.debug).map_err(|_| fmt::Error)?;
        write!(f, "<{}: {}>[{}]", self.role, self.kind, data)
    }
}

/// Whole stack, bottom (root) first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StackSnapshot {
    pub elements: Vec<ElementSnapshot>,
}

impl StackSnapshot {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Element kinds, bottom first.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.elements.iter().map(|e| e.kind).collect()
    }

    pub fn top(&self) -> Option<&ElementSnapshot> {
        self.elements.last()
    }

    /// Put back the debug fields a tick report already consumed.
    ///
    /// Only applies while the executed element still sits at its position.
    pub fn restore_executed(&mut self, executed: &ElementSnapshot) {
        if let Some(slot) = self.elements.get_mut(executed.position) {
            if slot.kind == executed.kind && slot.debug.is_empty() {
                slot.debug = executed.debug.clone();
            }
        }
    }
}

impl fmt::Display for StackSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                f.write_str(" > ")?;
            }
            write!(f, "{element}")?;
        }
        Ok(())
    }
}
