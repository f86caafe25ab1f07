//! Backend seam for the control interface
//!
//! The control surface only needs element resolution, synchronous
//! reads/writes and a poll-able notification source. Splitting "get the
//! descriptors" from "dispatch" lets the event loop own the single blocking
//! point while the backend owns the event semantics.

use super::element::{ElementSpec, ElementValue};
use crate::error::Result;

/// Handle to an element resolved by a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElemRef(usize);

impl ElemRef {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Access to a card's control elements
pub trait ControlBackend {
    /// Look up an element; fails with `ElementMissing` if the card lacks it
    fn resolve(&mut self, spec: &ElementSpec) -> Result<ElemRef>;

    /// Read every channel of an element
    fn read(&self, elem: ElemRef) -> Result<ElementValue>;

    /// Write every channel of an element
    fn write(&mut self, elem: ElemRef, value: &ElementValue) -> Result<()>;

    /// Current poll descriptor set; its size may change between calls
    fn poll_descriptors(&self) -> Result<Vec<libc::pollfd>>;

    /// Whether the returned events on `fds` mean notifications are pending
    fn revents(&self, fds: &[libc::pollfd]) -> Result<bool>;

    /// Drain pending notifications, returning how many were handled
    fn handle_events(&mut self) -> Result<u32>;
}
