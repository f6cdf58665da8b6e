//! Element catalog: resolves `(kind, payload)` pairs into live elements.

use fxhash::FxHashMap;

use crate::directive::{Payload, Role};
use crate::element::Element;
use crate::error::{EngineError, Result};
use crate::sequence::{Sequence, SEQUENCE_KIND};

/// Builds an element from its init payload.
pub type Factory<C> = Box<dyn Fn(&Payload) -> Result<Box<dyn Element<C>>> + Send + Sync>;

struct Entry<C> {
    role: Role,
    factory: Factory<C>,
}

/// Registry of every element kind an engine may push.
///
/// A kind missing from the catalog is reported at push time as
/// [`EngineError::UnknownElement`].
pub struct Catalog<C> {
    entries: FxHashMap<&'static str, Entry<C>>,
}

impl<C> Default for Catalog<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Catalog<C> {
    pub fn new() -> Self {
        Self { entries: FxHashMap::default() }
    }

    /// Register a factory under `kind`. Kinds are unique per catalog.
    pub fn register<F>(&mut self, kind: &'static str, role: Role, factory: F) -> Result<()>
    where
        F: Fn(&Payload) -> Result<Box<dyn Element<C>>> + Send + Sync + 'static,
    {
        if self.entries.contains_key(kind) {
            return Err(EngineError::DuplicateElement { kind: kind.to_string() });
        }
        self.entries.insert(kind, Entry { role, factory: Box::new(factory) });
        Ok(())
    }

    /// Register [`Sequence`] under [`SEQUENCE_KIND`].
    ///
    /// Sequences may only list kinds registered before this call, plus
    /// `Sequence` itself, so call it once wiring is otherwise complete.
    pub fn register_sequence(&mut self) -> Result<()>
    where
        C: 'static,
    {
        let mut known: Vec<&'static str> = self.entries.keys().copied().collect();
        known.push(SEQUENCE_KIND);
        self.register(SEQUENCE_KIND, Role::Action, move |payload| {
            let sequence: Box<dyn Element<C>> = Box::new(Sequence::from_payload(payload, &known)?);
            Ok(sequence)
        })
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.entries.contains_key(kind)
    }

    pub fn role(&self, kind: &str) -> Option<Role> {
        self.entries.get(kind).map(|entry| entry.role)
    }

    /// Construct a fresh element of `kind`.
    pub fn build(&self, kind: &str, payload: &Payload) -> Result<Box<dyn Element<C>>> {
        let entry = self
            .entries
            .get(kind)
            .ok_or_else(|| EngineError::UnknownElement { kind: kind.to_string() })?;
        (entry.factory)(payload)
    }

    /// Registered kinds with their roles, sorted by kind.
    pub fn entries(&self) -> Vec<(&'static str, Role)> {
        let mut list: Vec<_> = self.entries.iter().map(|(kind, e)| (*kind, e.role)).collect();
        list.sort_by_key(|(kind, _)| *kind);
        list
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::Directive;

    struct Idle;

    impl Element<()> for Idle {
        fn step(&mut self, _ctx: &mut ()) -> Directive {
            Directive::Continue
        }
    }

    fn idle(_: &Payload) -> Result<Box<dyn Element<()>>> {
        Ok(Box::new(Idle))
    }

    #[test]
    fn duplicate_kind_is_rejected() {
        let mut catalog = Catalog::<()>::new();
        catalog.register("Idle", Role::Action, idle).unwrap();
        let err = catalog.register("Idle", Role::Action, idle).unwrap_err();
        assert_eq!(err, EngineError::DuplicateElement { kind: "Idle".into() });
    }

    #[test]
    fn unknown_kind_fails_to_build() {
        let catalog = Catalog::<()>::new();
        let err = catalog.build("Kick", &Payload::Null).err().unwrap();
        assert_eq!(err, EngineError::UnknownElement { kind: "Kick".into() });
    }

    #[test]
    fn entries_are_sorted() {
        let mut catalog = Catalog::<()>::new();
        catalog.register("Wait", Role::Action, idle).unwrap();
        catalog.register("Root", Role::Decision, idle).unwrap();
        assert_eq!(catalog.entries(), vec![("Root", Role::Decision), ("Wait", Role::Action)]);
        assert_eq!(catalog.role("Wait"), Some(Role::Action));
        assert!(catalog.contains("Root"));
    }

    #[test]
    fn sequence_sees_kinds_registered_before_it() {
        let mut catalog = Catalog::<()>::new();
        catalog.register("Idle", Role::Action, idle).unwrap();
        catalog.register_sequence().unwrap();
        catalog.register("Late", Role::Action, idle).unwrap();

        let ok = Directive::sequence([("Idle", Payload::Null), (SEQUENCE_KIND, Payload::Null)]);
        let late = Directive::sequence([("Late", Payload::Null)]);
        let (Directive::Push { payload: ok, .. }, Directive::Push { payload: late, .. }) = (ok, late) else {
            unreachable!("sequence builds a push");
        };
        assert!(catalog.build(SEQUENCE_KIND, &ok).is_ok());
        assert_eq!(
            catalog.build(SEQUENCE_KIND, &late).err().unwrap(),
            EngineError::UnknownElement { kind: "Late".into() }
        );
        assert_eq!(catalog.role(SEQUENCE_KIND), Some(Role::Action));
    }
}
