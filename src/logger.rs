/*
 * This file is part of tagtagtag-mixerd.
 *
 * Copyright (C) 2025 tagtagtag-sound contributors
 *
 * tagtagtag-mixerd is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * tagtagtag-mixerd is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with tagtagtag-mixerd. If not, see <https://www.gnu.org/licenses/>.
 */

//! Logging setup
//!
//! Logs go to the systemd journal when its socket exists and to stderr
//! otherwise. The level filter sits behind a reload layer so the `debug`
//! configuration key can raise verbosity without a restart.

use std::fmt;
use std::path::Path;

use tracing::{debug, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{reload, EnvFilter, Registry};
use ttt_core::constants::paths;

/// Environment variable holding the base log filter
pub const LOG_ENV: &str = "TAGTAGTAG_MIXERD_LOG";

const DEFAULT_FILTER: &str = "info";
const DEBUG_FILTER: &str = "debug";

/// Where log records end up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSink {
    Journald,
    Stderr,
}

impl fmt::Display for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Journald => write!(f, "systemd journal"),
            Self::Stderr => write!(f, "stderr"),
        }
    }
}

/// Runtime control over the installed filter
pub struct LogControl {
    handle: reload::Handle<EnvFilter, Registry>,
    base: String,
    debug: bool,
    sink: LogSink,
}

impl LogControl {
    pub fn sink(&self) -> LogSink {
        self.sink
    }

    /// Switch between the base filter and the debug filter
    ///
    /// Does nothing when the requested verbosity is already active.
    pub fn set_debug(&mut self, on: bool) {
        if on == self.debug {
            return;
        }

        let directive = if on { DEBUG_FILTER } else { self.base.as_str() };
        match self.handle.reload(EnvFilter::new(directive)) {
            Ok(()) => {
                self.debug = on;
                debug!(filter = directive, "Log filter changed");
            }
            Err(e) => warn!("Could not change log filter: {}", e),
        }
    }
}

/// Install the global subscriber
///
/// Must be called once, before anything logs.
pub fn init() -> LogControl {
    let base = base_filter(std::env::var(LOG_ENV).ok());
    let (filter, handle) = reload::Layer::new(EnvFilter::new(&base));

    let journald = if Path::new(paths::JOURNAL_SOCKET).exists() {
        match tracing_journald::layer() {
            Ok(layer) => Some(layer),
            Err(e) => {
                eprintln!(
                    "Failed to create journald layer: {}, falling back to stderr",
                    e
                );
                None
            }
        }
    } else {
        None
    };

    let sink = if journald.is_some() {
        LogSink::Journald
    } else {
        LogSink::Stderr
    };
    let stderr = journald.is_none().then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_level(true)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(journald)
        .with(stderr)
        .init();

    LogControl {
        handle,
        base,
        debug: false,
        sink,
    }
}

fn base_filter(env: Option<String>) -> String {
    env.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_filter() {
        assert_eq!(base_filter(None), "info");
        assert_eq!(base_filter(Some("  ".into())), "info");
        assert_eq!(base_filter(Some("warn".into())), "warn");
    }

    #[test]
    fn test_sink_display() {
        assert_eq!(LogSink::Journald.to_string(), "systemd journal");
        assert_eq!(LogSink::Stderr.to_string(), "stderr");
    }
}
