use thiserror::Error;

/// Errors raised by the catalog, the control stack and the tick engine.
///
/// Everything except [`EngineError::Faulted`] is a wiring bug in the element
/// catalog. None of them are retried: the tick that hit one is aborted and the
/// engine refuses further ticks until [`crate::Engine::reset`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Unknown element kind: {kind}")]
    UnknownElement { kind: String },

    #[error("Element kind registered twice: {kind}")]
    DuplicateElement { kind: String },

    #[error("Invalid payload for {kind}: {reason}")]
    InvalidPayload { kind: String, reason: String },

    #[error("Auto-run cycle: {kind}({payload}) pushed twice in one tick (position {position})")]
    AutoRunCycle { kind: String, payload: String, position: usize },

    #[error("Auto-run chain exceeded {limit} pushes in one tick")]
    ChainTooLong { limit: usize },

    #[error("Pop attempted on the root element")]
    RootPopped,

    #[error("Engine faulted by an earlier error: {reason}")]
    Faulted { reason: String },
}

impl EngineError {
    /// Wiring bugs in the element catalog, as opposed to engine state errors.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, EngineError::Faulted { .. })
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
