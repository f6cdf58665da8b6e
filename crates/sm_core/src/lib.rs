//! # sm_core - Stack-Based Reevaluating Behaviour Engine
//!
//! Runs a robot's behaviour as a stack of decisions and actions:
//! - Elements return [`Directive`]s; the engine is the only code that touches the stack
//! - Reevaluating elements are re-stepped every tick while buried, and replace
//!   the branch above them the moment their choice changes
//! - Unchanged choices keep the running element and its progress
//! - Catalog wiring bugs (unknown kinds, auto-run cycles, root pops) abort the tick
//!
//! ## Usage
//! ```rust
//! use sm_core::{Catalog, Directive, Element, Engine, Payload, Role};
//!
//! struct Idle;
//!
//! impl Element<u32> for Idle {
//!     fn step(&mut self, ticks: &mut u32) -> Directive {
//!         *ticks += 1;
//!         Directive::Continue
//!     }
//! }
//!
//! let mut catalog = Catalog::new();
//! catalog
//!     .register("Idle", Role::Action, |_: &Payload| -> sm_core::Result<Box<dyn Element<u32>>> {
//!         Ok(Box::new(Idle))
//!     })
//!     .unwrap();
//!
//! let mut engine = Engine::initialize(catalog, "Idle", Payload::Null).unwrap();
//! let mut ticks = 0;
//! engine.tick(&mut ticks).unwrap();
//! assert_eq!(ticks, 1);
//! ```

pub mod catalog;
pub mod config;
pub mod debug_flags;
pub mod directive;
pub mod element;
pub mod engine;
pub mod error;
pub mod sequence;
pub mod snapshot;
pub mod stack;

#[cfg(test)]
pub(crate) mod test_support;

pub use catalog::{Catalog, Factory};
pub use config::EngineConfig;
pub use directive::{decode_payload, Directive, DirectiveKind, Payload, Role};
pub use element::{DebugData, Element};
pub use engine::{Engine, TickReport};
pub use error::{EngineError, Result};
pub use sequence::{Sequence, SequenceItem, SEQUENCE_KIND};
pub use snapshot::{ElementSnapshot, StackSnapshot};
pub use stack::ControlStack;
