//! Directives: the only way an element can change the control stack.
//!
//! An element's `step` returns one of four outcomes and the engine applies it.
//! Elements never hold a handle to the stack, so they can be unit-tested with
//! nothing but a context value.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Initialization data handed to a pushed element.
///
/// `Null` means "no init data". Two payloads are equality-compatible for the
/// substitution rule exactly when the values compare equal.
pub type Payload = serde_json::Value;

/// Role of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Selects the next element, never drives the robot itself.
    Decision,
    /// Requests robot effects through the context.
    Action,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Decision => f.write_str("Decision"),
            Role::Action => f.write_str("Action"),
        }
    }
}

/// Outcome of a single element step.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// Put a new element on top of the stepping element.
    ///
    /// With `auto_run` the new element is stepped in the same tick; without it
    /// the element stays inactive until the next tick.
    Push { kind: &'static str, payload: Payload, auto_run: bool },
    /// Remove the stepping element. Its parent resumes on the next tick.
    Pop,
    /// Unwind to `target` (a 0-based stack position). `None` unwinds to the
    /// nearest reevaluating ancestor, or the root if there is none.
    Interrupt { target: Option<usize> },
    /// Keep the stack as it is.
    Continue,
}

impl Directive {
    /// Auto-running push without init data.
    pub fn push(kind: &'static str) -> Self {
        Directive::Push { kind, payload: Payload::Null, auto_run: true }
    }

    pub fn pop() -> Self {
        Directive::Pop
    }

    pub fn cont() -> Self {
        Directive::Continue
    }

    pub fn interrupt() -> Self {
        Directive::Interrupt { target: None }
    }

    pub fn interrupt_to(target: usize) -> Self {
        Directive::Interrupt { target: Some(target) }
    }

    /// Attach init data to a push. No effect on other directives.
    pub fn with_payload(mut self, value: impl Into<Payload>) -> Self {
        if let Directive::Push { payload, .. } = &mut self {
            *payload = value.into();
        }
        self
    }

    /// Leave the pushed element unstepped until the next tick.
    pub fn deferred(mut self) -> Self {
        if let Directive::Push { auto_run, .. } = &mut self {
            *auto_run = false;
        }
        self
    }

    pub fn kind(&self) -> DirectiveKind {
        match self {
            Directive::Push { .. } => DirectiveKind::Push,
            Directive::Pop => DirectiveKind::Pop,
            Directive::Interrupt { .. } => DirectiveKind::Interrupt,
            Directive::Continue => DirectiveKind::Continue,
        }
    }
}

/// Payload-free tag of a [`Directive`], used in tick reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectiveKind {
    Push,
    Pop,
    Interrupt,
    Continue,
}

/// Decode a payload into a typed argument struct. `Null` yields `T::default()`.
pub fn decode_payload<T>(kind: &str, payload: &Payload) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if payload.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(payload.clone()).map_err(|err| EngineError::InvalidPayload {
        kind: kind.to_string(),
        reason: err.to_string(),
    })
}
