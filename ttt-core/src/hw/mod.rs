//! Hardware control
//!
//! Element descriptions, the backend seam with its ALSA and in-memory
//! implementations, and the control surface built on top of them.

mod alsa;
mod backend;
pub mod element;
mod memory;
mod state;
mod surface;

pub use self::alsa::AlsaBackend;
pub use backend::{ControlBackend, ElemRef};
pub use element::{ElementSpec, ElementValue, Namespace, ValueKind};
pub use memory::{MemoryBackend, MemoryHandle};
pub use state::{ButtonState, HardwareState, Sensor};
pub use surface::{card_contract, Actuator, ControlSurface};
