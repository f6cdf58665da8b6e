//! Engine configuration
//!
//! ```rust
//! use sm_core::EngineConfig;
//!
//! let config = EngineConfig::default();
//! assert_eq!(config.max_chain_len, 64);
//! ```

use serde::{Deserialize, Serialize};

/// Tick engine tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on pushes within a single tick, independent of the cycle guard.
    pub max_chain_len: usize,
    /// Log the full stack at `debug` level after every tick.
    pub trace_stack: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { max_chain_len: 64, trace_stack: false }
    }
}

impl EngineConfig {
    /// Short chain cap with stack tracing, for tests and CI runs.
    pub fn strict() -> Self {
        Self { max_chain_len: 16, trace_stack: true }
    }
}
