//! Scripted elements for engine tests.
//!
//! `World` is the test context: flags steer the decisions, and every leaf
//! step is recorded so tests can follow instance identity across ticks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde::Deserialize;

use crate::catalog::Catalog;
use crate::directive::{decode_payload, Directive, Payload, Role};
use crate::element::{DebugData, Element};
use crate::error::Result;

pub struct World {
    /// Condition read by `Chooser`.
    pub x: bool,
    /// What `Root` returns when stepped.
    pub root_choice: Directive,
    /// Replaces `Chooser`'s normal choice when set.
    pub chooser_override: Option<Directive>,
    /// Condition read by `Inner`.
    pub y: bool,
    /// Replaces `Inner`'s normal choice when set.
    pub inner_override: Option<Directive>,
    /// What every leaf returns after counting its step.
    pub leaf_directive: Directive,
    pub trace: Vec<Stepped>,
}

impl Default for World {
    fn default() -> Self {
        Self {
            x: true,
            root_choice: Directive::push("Chooser"),
            chooser_override: None,
            y: true,
            inner_override: None,
            leaf_directive: Directive::Continue,
            trace: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stepped {
    pub kind: &'static str,
    pub id: usize,
    pub counter: u32,
}

#[derive(Default)]
struct Counters {
    built: AtomicUsize,
    dropped: Mutex<Vec<usize>>,
}

/// Shared construction/destruction bookkeeping.
#[derive(Clone, Default)]
pub struct Lifecycle {
    inner: Arc<Counters>,
}

impl Lifecycle {
    fn next_id(&self) -> usize {
        self.inner.built.fetch_add(1, Ordering::SeqCst)
    }

    pub fn built(&self) -> usize {
        self.inner.built.load(Ordering::SeqCst)
    }

    pub fn dropped(&self) -> usize {
        self.dropped_ids().len()
    }

    pub fn dropped_ids(&self) -> Vec<usize> {
        self.inner.dropped.lock().map(|ids| ids.clone()).unwrap_or_default()
    }
}

/// Instance identity; reports its own destruction to the lifecycle.
struct Tracker {
    lifecycle: Lifecycle,
    id: usize,
}

impl Tracker {
    fn new(lifecycle: &Lifecycle) -> Self {
        Self { lifecycle: lifecycle.clone(), id: lifecycle.next_id() }
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        if let Ok(mut ids) = self.lifecycle.inner.dropped.lock() {
            ids.push(self.id);
        }
    }
}

struct Root {
    _tracker: Tracker,
}

impl Element<World> for Root {
    fn step(&mut self, ctx: &mut World) -> Directive {
        ctx.root_choice.clone()
    }
}

struct Chooser {
    _tracker: Tracker,
    debug: DebugData,
}

impl Element<World> for Chooser {
    fn step(&mut self, ctx: &mut World) -> Directive {
        self.debug.set("x", ctx.x);
        if let Some(directive) = &ctx.chooser_override {
            return directive.clone();
        }
        if ctx.x {
            Directive::push("Leaf").deferred()
        } else {
            Directive::push("Other").deferred()
        }
    }

    fn reevaluates(&self) -> bool {
        true
    }

    fn take_debug(&mut self) -> DebugData {
        self.debug.take()
    }
}

/// Second reevaluating level, meant to sit above `Chooser`.
struct Inner {
    _tracker: Tracker,
}

impl Element<World> for Inner {
    fn step(&mut self, ctx: &mut World) -> Directive {
        if let Some(directive) = &ctx.inner_override {
            return directive.clone();
        }
        if ctx.y {
            Directive::push("Leaf").deferred()
        } else {
            Directive::push("Other").deferred()
        }
    }

    fn reevaluates(&self) -> bool {
        true
    }
}

struct Leaf {
    kind: &'static str,
    tracker: Tracker,
    counter: u32,
}

impl Element<World> for Leaf {
    fn step(&mut self, ctx: &mut World) -> Directive {
        self.counter += 1;
        ctx.trace.push(Stepped { kind: self.kind, id: self.tracker.id, counter: self.counter });
        ctx.leaf_directive.clone()
    }
}

#[derive(Debug, Default, Deserialize)]
struct RelayArgs {
    left: u32,
}

/// Pushes `left` more relays, then a deferred `Leaf`.
struct Relay {
    _tracker: Tracker,
    left: u32,
}

impl Element<World> for Relay {
    fn step(&mut self, _ctx: &mut World) -> Directive {
        if self.left > 0 {
            Directive::push("Relay").with_payload(serde_json::json!({ "left": self.left - 1 }))
        } else {
            Directive::push("Leaf").deferred()
        }
    }
}

/// Auto-runs into `next` forever.
struct Bounce {
    _tracker: Tracker,
    next: &'static str,
}

impl Element<World> for Bounce {
    fn step(&mut self, _ctx: &mut World) -> Directive {
        Directive::push(self.next)
    }
}

pub fn catalog(lifecycle: &Lifecycle) -> Catalog<World> {
    let mut catalog = Catalog::new();

    let p = lifecycle.clone();
    catalog
        .register("Root", Role::Decision, move |_: &Payload| -> Result<Box<dyn Element<World>>> {
            Ok(Box::new(Root { _tracker: Tracker::new(&p) }))
        })
        .unwrap();

    let p = lifecycle.clone();
    catalog
        .register("Chooser", Role::Decision, move |_: &Payload| -> Result<Box<dyn Element<World>>> {
            Ok(Box::new(Chooser { _tracker: Tracker::new(&p), debug: DebugData::new() }))
        })
        .unwrap();

    let p = lifecycle.clone();
    catalog
        .register("Inner", Role::Decision, move |_: &Payload| -> Result<Box<dyn Element<World>>> {
            Ok(Box::new(Inner { _tracker: Tracker::new(&p) }))
        })
        .unwrap();

    for kind in ["Leaf", "Other"] {
        let p = lifecycle.clone();
        catalog
            .register(kind, Role::Action, move |_: &Payload| -> Result<Box<dyn Element<World>>> {
                Ok(Box::new(Leaf { kind, tracker: Tracker::new(&p), counter: 0 }))
            })
            .unwrap();
    }

    let p = lifecycle.clone();
    catalog
        .register("Relay", Role::Decision, move |payload: &Payload| -> Result<Box<dyn Element<World>>> {
            let args: RelayArgs = decode_payload("Relay", payload)?;
            Ok(Box::new(Relay { _tracker: Tracker::new(&p), left: args.left }))
        })
        .unwrap();

    for (kind, next) in [("Ping", "Pong"), ("Pong", "Ping")] {
        let p = lifecycle.clone();
        catalog
            .register(kind, Role::Decision, move |_: &Payload| -> Result<Box<dyn Element<World>>> {
                Ok(Box::new(Bounce { _tracker: Tracker::new(&p), next }))
            })
            .unwrap();
    }

    catalog.register_sequence().unwrap();
    catalog
}
