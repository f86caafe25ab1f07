//! tagtagtag mixer core library
//!
//! Everything the mixer daemon does apart from process plumbing.
//!
//! # Module Structure
//!
//! - `config` - key=value config file and the reloadable store
//! - `engine` - volume decision tables
//! - `hw` - control elements, backends and the control surface
//!
//! # Example
//!
//! ```no_run
//! use ttt_core::{decide, AlsaBackend, Config, ControlSurface};
//!
//! let mut surface = ControlSurface::open(AlsaBackend::open("tagtagtagsound").unwrap()).unwrap();
//! let out = decide(&Config::default(), surface.state()).unwrap();
//! surface.apply(&out);
//! ```

pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod hw;

pub use config::{parse_config, parse_leading_int, Config, ConfigStore, ReloadOutcome, RoutingMode};
pub use engine::{decide, Level, PolicyTable, PolicyViolation, Revision, Row, VolumeOutputSet};
pub use error::{MixerError, Result};
pub use hw::{
    card_contract, Actuator, AlsaBackend, ButtonState, ControlBackend, ControlSurface, ElemRef,
    ElementSpec, ElementValue, HardwareState, MemoryBackend, MemoryHandle, Namespace, Sensor,
    ValueKind,
};
