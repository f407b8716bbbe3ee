//! Session lookup by name
//!
//! The registry is owned by the host and handed to each session on creation.
//! Sessions remove themselves when they close or are disposed.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use tracing::warn;

use super::session::SessionHandle;

pub(crate) struct RegistryEntry {
    id: u64,
    session: SessionHandle,
}

pub(crate) type RegistryEntries = HashMap<String, RegistryEntry>;

/// Name → live session
#[derive(Clone, Default)]
pub struct SessionRegistry {
    entries: Rc<RefCell<RegistryEntries>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find a live session by name
    pub fn lookup(&self, name: &str) -> Option<SessionHandle> {
        self.entries
            .borrow()
            .get(name)
            .map(|entry| entry.session.clone())
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub(crate) fn downgrade(&self) -> Weak<RefCell<RegistryEntries>> {
        Rc::downgrade(&self.entries)
    }

    /// Register a session. A live session with the same name is replaced, not closed.
    pub(crate) fn insert(&self, name: String, id: u64, session: SessionHandle) {
        let previous = self
            .entries
            .borrow_mut()
            .insert(name.clone(), RegistryEntry { id, session });
        if previous.is_some() {
            warn!("Session name '{}' reused; previous session is no longer registered", name);
        }
    }

    /// Remove `name` if it still refers to session `id`
    pub(crate) fn remove_entry(entries: &RefCell<RegistryEntries>, name: &str, id: u64) {
        let mut entries = entries.borrow_mut();
        if entries.get(name).is_some_and(|entry| entry.id == id) {
            entries.remove(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InputMode;
    use crate::core::testing::Harness;

    #[test]
    fn test_reused_name_overwrites() {
        let first = Harness::ready(InputMode::Cooked);
        let second = Harness::in_registry(&first.registry, InputMode::Cooked);

        let found = first.registry.lookup("test").unwrap();
        assert_eq!(found.borrow().id(), second.session.borrow().id());
        assert!(first.session.borrow().is_ready());
        assert_eq!(first.registry.len(), 1);

        // Closing the replaced session leaves the newer entry alone
        first.session.borrow_mut().handle_close();
        let found = first.registry.lookup("test").unwrap();
        assert_eq!(found.borrow().id(), second.session.borrow().id());

        second.session.borrow_mut().handle_close();
        assert!(first.registry.is_empty());
    }

    #[test]
    fn test_registries_are_independent() {
        let a = Harness::ready(InputMode::Cooked);
        let b = Harness::ready(InputMode::Cooked);
        assert_eq!(a.registry.names(), vec!["test".to_string()]);
        a.session.borrow_mut().dispose();
        assert!(a.registry.lookup("test").is_none());
        assert!(b.registry.lookup("test").is_some());
    }
}
