//! Action sequences
//!
//! A `Sequence` runs a fixed list of elements one after another. It pushes
//! the first item, waits until that item pops, pushes the next, and pops
//! itself once the list is exhausted. A reevaluating ancestor that diverges
//! drops the sequence together with whatever item is running.
//!
//! Item kinds are resolved against the catalog when the sequence is built,
//! so an unknown kind fails the push of the sequence itself.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::directive::{decode_payload, Directive, Payload};
use crate::element::{DebugData, Element};
use crate::error::{EngineError, Result};

/// Catalog kind under which [`crate::Catalog::register_sequence`] installs sequences.
pub const SEQUENCE_KIND: &str = "Sequence";

/// One step of a sequence payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceItem {
    pub kind: String,
    #[serde(default)]
    pub payload: Payload,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SequenceArgs {
    actions: Vec<SequenceItem>,
}

pub struct Sequence {
    items: Vec<(&'static str, Payload)>,
    next: usize,
    debug: DebugData,
}

impl Sequence {
    /// Build from a `{"actions": [{"kind": .., "payload": ..}, ..]}` payload.
    /// Every kind must be one of `known`.
    pub fn from_payload(payload: &Payload, known: &[&'static str]) -> Result<Self> {
        let args: SequenceArgs = decode_payload(SEQUENCE_KIND, payload)?;
        let items = args
            .actions
            .into_iter()
            .map(|item| {
                known
                    .iter()
                    .copied()
                    .find(|kind| *kind == item.kind)
                    .map(|kind| (kind, item.payload))
                    .ok_or(EngineError::UnknownElement { kind: item.kind })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { items, next: 0, debug: DebugData::new() })
    }

    pub fn remaining(&self) -> usize {
        self.items.len() - self.next
    }
}

impl<C> Element<C> for Sequence {
    fn step(&mut self, _ctx: &mut C) -> Directive {
        let Some((kind, payload)) = self.items.get(self.next) else {
            return Directive::pop();
        };
        let directive = Directive::push(*kind).with_payload(payload.clone());
        self.debug.set("item", self.next);
        self.next += 1;
        directive
    }

    fn take_debug(&mut self) -> DebugData {
        self.debug.take()
    }
}

impl Directive {
    /// Push a [`Sequence`] running `items` in order.
    pub fn sequence<I>(items: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Payload)>,
    {
        let actions: Vec<Payload> = items
            .into_iter()
            .map(|(kind, payload)| json!({ "kind": kind, "payload": payload }))
            .collect();
        Directive::push(SEQUENCE_KIND).with_payload(json!({ "actions": actions }))
    }
}
