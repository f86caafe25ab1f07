//! Error types re-exported from ttt-error

pub use ttt_error::{MixerError, Result};
