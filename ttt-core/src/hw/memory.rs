//! In-memory control backend
//!
//! Holds an element table in process memory. Used to exercise the control
//! surface and the event loop without a sound card. A [`MemoryHandle`] shares
//! the table so a test can change sensor values and inspect writes while the
//! backend itself is owned by a surface.

use std::cell::RefCell;
use std::rc::Rc;

use super::backend::{ControlBackend, ElemRef};
use super::element::{ElementSpec, ElementValue};
use crate::error::{MixerError, Result};

#[derive(Debug)]
struct MemoryElement {
    spec: ElementSpec,
    value: ElementValue,
}

#[derive(Debug, Default)]
struct Shared {
    elements: Vec<MemoryElement>,
    pending_events: u32,
    writes: Vec<(&'static str, ElementValue)>,
    failing: Vec<&'static str>,
}

impl Shared {
    fn position(&self, name: &str) -> Option<usize> {
        self.elements.iter().position(|e| e.spec.name == name)
    }
}

/// Element table backend
#[derive(Debug, Default)]
pub struct MemoryBackend {
    shared: Rc<RefCell<Shared>>,
}

/// Shared view of a [`MemoryBackend`]'s table
#[derive(Debug, Clone)]
pub struct MemoryHandle {
    shared: Rc<RefCell<Shared>>,
}

impl MemoryBackend {
    /// A backend exposing `specs`, every value zeroed
    pub fn with_elements(specs: &[ElementSpec]) -> Self {
        let elements = specs
            .iter()
            .map(|spec| MemoryElement {
                spec: *spec,
                value: ElementValue::zeroed(spec),
            })
            .collect();
        Self {
            shared: Rc::new(RefCell::new(Shared {
                elements,
                ..Shared::default()
            })),
        }
    }

    /// A backend exposing the full tagtagtag card contract
    pub fn tagtagtag() -> Self {
        Self::with_elements(&super::card_contract())
    }

    pub fn handle(&self) -> MemoryHandle {
        MemoryHandle {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl MemoryHandle {
    /// Change an element the way the driver would and queue a notification
    pub fn set(&self, name: &str, value: ElementValue) {
        let mut shared = self.shared.borrow_mut();
        if let Some(idx) = shared.position(name) {
            shared.elements[idx].value = value;
            shared.pending_events += 1;
        }
    }

    /// Change an element without queueing a notification
    pub fn set_quiet(&self, name: &str, value: ElementValue) {
        let mut shared = self.shared.borrow_mut();
        if let Some(idx) = shared.position(name) {
            shared.elements[idx].value = value;
        }
    }

    pub fn value(&self, name: &str) -> Option<ElementValue> {
        let shared = self.shared.borrow();
        shared
            .position(name)
            .map(|idx| shared.elements[idx].value.clone())
    }

    /// Every successful write so far, oldest first
    pub fn writes(&self) -> Vec<(&'static str, ElementValue)> {
        self.shared.borrow().writes.clone()
    }

    pub fn clear_writes(&self) {
        self.shared.borrow_mut().writes.clear();
    }

    /// Make every write to `name` fail
    pub fn fail_writes(&self, name: &'static str) {
        self.shared.borrow_mut().failing.push(name);
    }

    pub fn pending_events(&self) -> u32 {
        self.shared.borrow().pending_events
    }
}

impl ControlBackend for MemoryBackend {
    fn resolve(&mut self, spec: &ElementSpec) -> Result<ElemRef> {
        let shared = self.shared.borrow();
        shared
            .elements
            .iter()
            .position(|e| {
                e.spec.name == spec.name && e.spec.namespace == spec.namespace
            })
            .map(ElemRef::new)
            .ok_or_else(|| MixerError::ElementMissing(spec.name.to_string()))
    }

    fn read(&self, elem: ElemRef) -> Result<ElementValue> {
        let shared = self.shared.borrow();
        shared
            .elements
            .get(elem.index())
            .map(|e| e.value.clone())
            .ok_or_else(|| {
                MixerError::generic(format!("Unknown element handle {}", elem.index()))
            })
    }

    fn write(&mut self, elem: ElemRef, value: &ElementValue) -> Result<()> {
        let mut shared = self.shared.borrow_mut();
        let name = shared
            .elements
            .get(elem.index())
            .map(|e| e.spec.name)
            .ok_or_else(|| {
                MixerError::generic(format!("Unknown element handle {}", elem.index()))
            })?;

        if shared.failing.contains(&name) {
            return Err(MixerError::element_write(name, "injected failure"));
        }

        shared.elements[elem.index()].value = value.clone();
        shared.writes.push((name, value.clone()));
        Ok(())
    }

    fn poll_descriptors(&self) -> Result<Vec<libc::pollfd>> {
        // Negative descriptors are ignored by poll(2)
        Ok(vec![libc::pollfd {
            fd: -1,
            events: libc::POLLIN,
            revents: 0,
        }])
    }

    fn revents(&self, _fds: &[libc::pollfd]) -> Result<bool> {
        Ok(self.shared.borrow().pending_events > 0)
    }

    fn handle_events(&mut self) -> Result<u32> {
        let mut shared = self.shared.borrow_mut();
        Ok(std::mem::take(&mut shared.pending_events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::element::{JACK, PLAYBACK_VOLUME};

    #[test]
    fn test_resolve_and_roundtrip() {
        let mut backend = MemoryBackend::with_elements(&[JACK, PLAYBACK_VOLUME]);
        let playback = backend.resolve(&PLAYBACK_VOLUME).unwrap();

        backend
            .write(playback, &ElementValue::integer(200, 2))
            .unwrap();
        assert_eq!(
            backend.read(playback).unwrap(),
            ElementValue::Integer(vec![200, 200])
        );
        assert_eq!(backend.handle().writes().len(), 1);
    }

    #[test]
    fn test_missing_element() {
        let mut backend = MemoryBackend::with_elements(&[JACK]);
        match backend.resolve(&PLAYBACK_VOLUME) {
            Err(MixerError::ElementMissing(name)) => assert_eq!(name, "Playback Volume"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_events_drain() {
        let mut backend = MemoryBackend::with_elements(&[JACK]);
        let handle = backend.handle();
        handle.set(JACK.name, ElementValue::boolean(true, 1));
        handle.set(JACK.name, ElementValue::boolean(false, 1));

        let fds = backend.poll_descriptors().unwrap();
        assert!(backend.revents(&fds).unwrap());
        assert_eq!(backend.handle_events().unwrap(), 2);
        assert!(!backend.revents(&fds).unwrap());
    }
}
