//! Volume decision engine
//!
//! Maps configuration and sensed hardware state to mixer values.

mod decision;
mod policy;

pub use decision::{decide, PolicyViolation, VolumeOutputSet};
pub use policy::{Level, PolicyTable, Revision, Row};
