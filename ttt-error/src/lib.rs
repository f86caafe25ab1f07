//! Unified error handling for the tagtagtag mixer daemon
//!
//! This crate provides the single error type used by the core library and the
//! daemon binary. It uses thiserror for Display and Error trait impls.

use std::io;
use std::path::PathBuf;

/// Result type alias using MixerError
pub type Result<T> = std::result::Result<T, MixerError>;

/// Unified error type for all mixer daemon operations
#[derive(thiserror::Error, Debug)]
pub enum MixerError {
    // ============================================================================
    // I/O and File System Errors
    // ============================================================================
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Syntax error in configuration line {line}: {content:?}")]
    ConfigSyntax {
        line: usize,
        content: String,
    },

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig {
        field: String,
        reason: String,
    },

    // ============================================================================
    // Hardware Access Errors
    // ============================================================================
    #[error("Failed to open control interface {card} (is card present?): {reason}")]
    DeviceAbsent {
        card: String,
        reason: String,
    },

    #[error("Control element not found: {0}")]
    ElementMissing(String),

    #[error("Failed to read control element {name}: {reason}")]
    ElementRead {
        name: String,
        reason: String,
    },

    #[error("Failed to write control element {name}: {reason}")]
    ElementWrite {
        name: String,
        reason: String,
    },

    #[error("Unable to get poll descriptors: {0}")]
    PollDescriptors(String),

    #[error("Unable to dispatch control events: {0}")]
    Dispatch(String),

    // ============================================================================
    // Event Loop and Process Errors
    // ============================================================================
    #[error("Error with poll: {0}")]
    Wait(io::Error),

    #[error("Cannot install signal handler for {signal}: {source}")]
    Signal {
        signal: &'static str,
        source: io::Error,
    },

    #[error("Cannot open pid file {path}: {source}")]
    PidFile {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Pid file {0} locked, daemon is already running?")]
    AlreadyRunning(PathBuf),

    #[error("Failed to detach from terminal: {0}")]
    Detach(io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Generic(String),
}

impl MixerError {
    /// Create a generic error from a string
    pub fn generic(msg: impl Into<String>) -> Self {
        Self::Generic(msg.into())
    }

    /// Create an element read error
    pub fn element_read(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::ElementRead {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an element write error
    pub fn element_write(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::ElementWrite {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

// Allow converting from String to MixerError
impl From<String> for MixerError {
    fn from(s: String) -> Self {
        Self::Generic(s)
    }
}

// Allow converting from &str to MixerError
impl From<&str> for MixerError {
    fn from(s: &str) -> Self {
        Self::Generic(s.to_string())
    }
}
