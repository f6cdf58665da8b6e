//! Tick engine
//!
//! Drives one step of the whole control stack per external tick:
//!
//! 1. Scan bottom-up from the root. Every element below the top that
//!    reevaluates is stepped.
//! 2. A reevaluated `Push` that matches the element directly above it (same
//!    kind, equal payload) keeps that element and its progress, and the scan
//!    goes on. Any other `Push` destroys everything above the reevaluated
//!    element and pushes the new one: the earliest divergence wins.
//! 3. Without a divergence the top element is stepped.
//! 4. Auto-run pushes step the new element in the same tick until the chain
//!    ends in `Continue`, `Pop`, `Interrupt` or a deferred push.
//!
//! Configuration errors abort the tick and fault the engine.

use fxhash::FxHashSet;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::debug_flags;
use crate::directive::{Directive, DirectiveKind, Payload};
use crate::error::{EngineError, Result};
use crate::snapshot::{ElementSnapshot, StackSnapshot};
use crate::stack::ControlStack;

/// Outcome of one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    pub tick: u64,
    /// The element whose directive ended the tick.
    pub executed: ElementSnapshot,
    pub directive: DirectiveKind,
    /// Position of the reevaluated element that replaced the branch above it.
    pub substituted_at: Option<usize>,
    /// Stack length after the tick.
    pub depth: usize,
}

/// Pushes made during one tick, keyed by kind and payload.
struct ChainGuard {
    limit: usize,
    seen: FxHashSet<(&'static str, String)>,
}

impl ChainGuard {
    fn new(limit: usize) -> Self {
        Self { limit, seen: FxHashSet::default() }
    }

    fn record(&mut self, kind: &'static str, payload: &Payload, position: usize) -> Result<()> {
        if self.seen.len() >= self.limit {
            return Err(EngineError::ChainTooLong { limit: self.limit });
        }
        let rendered = payload.to_string();
        if !self.seen.insert((kind, rendered.clone())) {
            return Err(EngineError::AutoRunCycle {
                kind: kind.to_string(),
                payload: rendered,
                position,
            });
        }
        Ok(())
    }
}

pub struct Engine<C> {
    catalog: Catalog<C>,
    stack: ControlStack<C>,
    config: EngineConfig,
    root_kind: &'static str,
    root_payload: Payload,
    ticks: u64,
    fault: Option<String>,
}

impl<C> Engine<C> {
    /// Install `root_kind` as the permanent bottom of a new stack.
    ///
    /// The root is not stepped until the first tick.
    pub fn initialize(catalog: Catalog<C>, root_kind: &'static str, root_payload: Payload) -> Result<Self> {
        Self::with_config(catalog, root_kind, root_payload, EngineConfig::default())
    }

    pub fn with_config(
        catalog: Catalog<C>,
        root_kind: &'static str,
        root_payload: Payload,
        config: EngineConfig,
    ) -> Result<Self> {
        let stack = ControlStack::with_root(&catalog, root_kind, root_payload.clone())?;
        Ok(Self { catalog, stack, config, root_kind, root_payload, ticks: 0, fault: None })
    }

    /// Run one tick against `ctx`.
    pub fn tick(&mut self, ctx: &mut C) -> Result<TickReport> {
        if let Some(reason) = &self.fault {
            return Err(EngineError::Faulted { reason: reason.clone() });
        }
        self.ticks += 1;

        let result = self.run_tick(ctx);
        match &result {
            Ok(report) => {
                debug_assert!(!self.stack.is_empty());
                if self.config.trace_stack || debug_flags::stack_debug_enabled() {
                    log::debug!(
                        "tick {}: {} ran, stack {}",
                        report.tick,
                        report.executed.kind,
                        self.stack.kinds().join(" > ")
                    );
                }
            }
            Err(err) => {
                log::error!("tick {} aborted: {}", self.ticks, err);
                self.fault = Some(err.to_string());
            }
        }
        result
    }

    fn run_tick(&mut self, ctx: &mut C) -> Result<TickReport> {
        let mut chain = ChainGuard::new(self.config.max_chain_len);

        let mut index = 0;
        while index < self.stack.top_index() {
            if !self.stack.reevaluates_at(index) {
                index += 1;
                continue;
            }
            match self.stack.step(index, ctx) {
                Directive::Continue => index += 1,
                Directive::Push { kind, payload, auto_run } => {
                    if self.stack.matches(index + 1, kind, &payload) {
                        index += 1;
                        continue;
                    }
                    let removed = self.stack.truncate_above(index);
                    log::debug!(
                        "{}@{} diverged to {}, dropped {} element(s)",
                        self.stack.kind_at(index).unwrap_or("?"),
                        index,
                        kind,
                        removed
                    );
                    let push = Directive::Push { kind, payload, auto_run };
                    let mut report = self.settle(index, push, ctx, &mut chain)?;
                    report.substituted_at = Some(index);
                    return Ok(report);
                }
                other => return self.settle(index, other, ctx, &mut chain),
            }
        }

        let top = self.stack.top_index();
        let directive = self.stack.step(top, ctx);
        self.settle(top, directive, ctx, &mut chain)
    }

    /// Apply the directive returned by the element at `position`, following
    /// auto-run pushes until the chain comes to rest.
    fn settle(
        &mut self,
        mut position: usize,
        mut directive: Directive,
        ctx: &mut C,
        chain: &mut ChainGuard,
    ) -> Result<TickReport> {
        loop {
            let applied = directive.kind();
            match directive {
                Directive::Push { kind, payload, auto_run } => {
                    chain.record(kind, &payload, position + 1)?;
                    let pushed = self.stack.push(&self.catalog, kind, payload)?;
                    if !auto_run {
                        let executed = self.stack.snapshot_at(position);
                        return Ok(self.report(executed, applied));
                    }
                    position = pushed;
                    directive = self.stack.step(position, ctx);
                }
                Directive::Continue => {
                    let executed = self.stack.snapshot_at(position);
                    return Ok(self.report(executed, applied));
                }
                Directive::Pop => {
                    if position == 0 {
                        return Err(EngineError::RootPopped);
                    }
                    let executed = self.stack.snapshot_at(position);
                    self.stack.truncate_above(position - 1);
                    return Ok(self.report(executed, applied));
                }
                Directive::Interrupt { target } => {
                    let executed = self.stack.snapshot_at(position);
                    self.interrupt(position, target);
                    return Ok(self.report(executed, applied));
                }
            }
        }
    }

    /// Unwind for an interrupt issued at `position`.
    ///
    /// A target at or above the current top is clamped to the top, leaving the
    /// stack unchanged.
    fn interrupt(&mut self, position: usize, target: Option<usize>) -> usize {
        let target = target
            .unwrap_or_else(|| self.stack.nearest_reevaluating_below(position).unwrap_or(0));
        let top = self.stack.top_index();
        if target > top {
            log::warn!(
                "interrupt from {}@{} to {} clamped to top {}",
                self.stack.kind_at(position).unwrap_or("?"),
                position,
                target,
                top
            );
            return 0;
        }
        let removed = self.stack.truncate_above(target);
        log::debug!("interrupt to {} dropped {} element(s)", target, removed);
        removed
    }

    fn report(&self, executed: ElementSnapshot, directive: DirectiveKind) -> TickReport {
        TickReport {
            tick: self.ticks,
            executed,
            directive,
            substituted_at: None,
            depth: self.stack.len(),
        }
    }

    /// Every element, bottom first. Consumes pending debug fields.
    pub fn stack_snapshot(&mut self) -> StackSnapshot {
        self.stack.snapshot()
    }

    /// Element kinds, bottom first.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.stack.kinds()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_faulted(&self) -> bool {
        self.fault.is_some()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog<C> {
        &self.catalog
    }

    /// Drop the whole stack, install a fresh root and clear any fault.
    pub fn reset(&mut self) -> Result<()> {
        self.stack.truncate_above(0);
        self.stack = ControlStack::with_root(&self.catalog, self.root_kind, self.root_payload.clone())?;
        self.fault = None;
        log::debug!("engine reset to {}", self.root_kind);
        Ok(())
    }
}
