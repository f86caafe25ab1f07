//! ALSA hctl backend
//!
//! Talks to the card through the high-level control interface. The element
//! list is loaded once at open; value-change notifications arrive on the
//! hctl poll descriptors and are drained with `handle_events`.

use std::ffi::CString;

use alsa::ctl::{ElemId, ElemIface, ElemType};
use alsa::hctl::{Elem, HCtl};
use alsa::PollDescriptors;
use tracing::{debug, info};

use super::backend::{ControlBackend, ElemRef};
use super::element::{ElementSpec, ElementValue, Namespace};
use crate::constants::card;
use crate::error::{MixerError, Result};

struct Resolved {
    name: &'static str,
    id: ElemId,
}

/// Control interface of one ALSA card
///
/// The hctl handle is closed when this value is dropped.
pub struct AlsaBackend {
    device: String,
    hctl: HCtl,
    elements: Vec<Resolved>,
}

impl AlsaBackend {
    /// Open `hw:CARD=<card>` in non-blocking mode and load its element list
    pub fn open(card_name: &str) -> Result<Self> {
        let device = card::device(card_name);
        let absent = |e: alsa::Error| MixerError::DeviceAbsent {
            card: device.clone(),
            reason: e.to_string(),
        };

        let hctl = HCtl::new(&device, true).map_err(absent)?;
        hctl.load().map_err(absent)?;

        info!(device = %device, "Opened control interface");
        Ok(Self {
            device,
            hctl,
            elements: Vec::new(),
        })
    }

    fn lookup(&self, elem: ElemRef) -> Result<(&'static str, Elem<'_>)> {
        let resolved = self
            .elements
            .get(elem.index())
            .ok_or_else(|| {
                MixerError::generic(format!("Unknown element handle {}", elem.index()))
            })?;
        let found = self
            .hctl
            .find_elem(&resolved.id)
            .ok_or_else(|| MixerError::ElementMissing(resolved.name.to_string()))?;
        Ok((resolved.name, found))
    }
}

impl ControlBackend for AlsaBackend {
    fn resolve(&mut self, spec: &ElementSpec) -> Result<ElemRef> {
        let iface = match spec.namespace {
            Namespace::Card => ElemIface::Card,
            Namespace::Mixer => ElemIface::Mixer,
        };
        let name = CString::new(spec.name).map_err(|e| {
            MixerError::generic(format!("Bad element name {:?}: {}", spec.name, e))
        })?;

        let mut id = ElemId::new(iface);
        id.set_name(&name);
        if self.hctl.find_elem(&id).is_none() {
            return Err(MixerError::ElementMissing(spec.name.to_string()));
        }

        self.elements.push(Resolved { name: spec.name, id });
        debug!(element = spec.name, "Resolved control element");
        Ok(ElemRef::new(self.elements.len() - 1))
    }

    fn read(&self, elem: ElemRef) -> Result<ElementValue> {
        let (name, found) = self.lookup(elem)?;
        let info = found.info().map_err(|e| MixerError::element_read(name, e))?;
        let value = found.read().map_err(|e| MixerError::element_read(name, e))?;
        let count = info.get_count();

        match info.get_type() {
            ElemType::Boolean => Ok(ElementValue::Boolean(
                (0..count).map(|ch| value.get_boolean(ch).unwrap_or(false)).collect(),
            )),
            ElemType::Integer => Ok(ElementValue::Integer(
                (0..count).map(|ch| value.get_integer(ch).unwrap_or(0)).collect(),
            )),
            _ => Err(MixerError::element_read(name, "unsupported element type")),
        }
    }

    fn write(&mut self, elem: ElemRef, value: &ElementValue) -> Result<()> {
        let (name, found) = self.lookup(elem)?;

        // Reading first yields a value container of the element's own type
        // and channel count, with the element id already set.
        let mut raw = found
            .read()
            .map_err(|e| MixerError::element_write(name, e))?;
        let out_of_range = |ch: usize| {
            MixerError::element_write(name, format!("no channel {} of that type", ch))
        };
        match value {
            ElementValue::Boolean(channels) => {
                for (ch, &on) in channels.iter().enumerate() {
                    raw.set_boolean(ch as u32, on)
                        .ok_or_else(|| out_of_range(ch))?;
                }
            }
            ElementValue::Integer(channels) => {
                for (ch, &level) in channels.iter().enumerate() {
                    raw.set_integer(ch as u32, level)
                        .ok_or_else(|| out_of_range(ch))?;
                }
            }
        }

        found
            .write(&raw)
            .map_err(|e| MixerError::element_write(name, e))?;
        Ok(())
    }

    fn poll_descriptors(&self) -> Result<Vec<libc::pollfd>> {
        let unused = libc::pollfd {
            fd: -1,
            events: 0,
            revents: 0,
        };
        let mut fds = vec![unused; self.hctl.count()];
        let filled = self
            .hctl
            .fill(&mut fds)
            .map_err(|e| MixerError::PollDescriptors(e.to_string()))?;
        fds.truncate(filled);
        Ok(fds)
    }

    fn revents(&self, fds: &[libc::pollfd]) -> Result<bool> {
        self.hctl
            .revents(fds)
            .map(|flags| !flags.is_empty())
            .map_err(|e| MixerError::PollDescriptors(e.to_string()))
    }

    fn handle_events(&mut self) -> Result<u32> {
        self.hctl
            .handle_events()
            .map_err(|e| MixerError::Dispatch(e.to_string()))
    }
}

impl Drop for AlsaBackend {
    fn drop(&mut self) {
        debug!(device = %self.device, "Closing control interface");
    }
}
