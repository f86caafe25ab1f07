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

//! Startup and shutdown around the control loop
//!
//! Everything that can fail at startup happens in [`Startup::prepare`]. A
//! [`Startup`] is the only way to reach [`Startup::detach`], so a missing card
//! or control always fails in the process that was launched, before any fork.

use std::path::Path;

use anyhow::Context;
use tracing::info;
use ttt_core::{ConfigStore, ControlBackend, ControlSurface, Result};

use crate::control_loop::ControlLoop;
use crate::lifecycle::{self, Detached, PidFile};
use crate::logger::LogControl;
use crate::signals::{self, SignalWaiter};

/// An opened card and installed signal handling, ready to run
pub struct Startup<B: ControlBackend> {
    surface: ControlSurface<B>,
    waiter: SignalWaiter,
    pid_file: Option<PidFile>,
}

/// Outcome of [`Startup::detach`]
pub enum Launched<B: ControlBackend> {
    /// This is the launching process; the daemon runs as `child`
    Parent { child: libc::pid_t },
    /// This is the detached daemon
    Daemon(Startup<B>),
}

impl<B: ControlBackend> Startup<B> {
    /// Open the card, resolve every control and install signal handling
    pub fn prepare(open: impl FnOnce() -> Result<B>) -> anyhow::Result<Self> {
        let backend = open()?;
        let surface =
            ControlSurface::open(backend).context("Card does not expose the expected controls")?;
        let waiter = signals::install().context("Could not set up signal handling")?;

        Ok(Self {
            surface,
            waiter,
            pid_file: None,
        })
    }

    pub fn surface(&self) -> &ControlSurface<B> {
        &self.surface
    }

    /// Lock the PID file and fork into the background
    pub fn detach(mut self, pid_path: &Path) -> anyhow::Result<Launched<B>> {
        let mut pid_file = PidFile::acquire(pid_path)?;
        match lifecycle::detach(&mut pid_file)? {
            Detached::Parent(child) => Ok(Launched::Parent { child }),
            Detached::Child => {
                self.pid_file = Some(pid_file);
                Ok(Launched::Daemon(self))
            }
        }
    }

    /// Run the control loop until stopped, then release the PID file
    pub fn run(self, config: ConfigStore, log: Option<LogControl>) -> Result<()> {
        let mut control = ControlLoop::new(self.surface, config, self.waiter);
        if let Some(log) = log {
            control = control.with_log_control(log);
        }

        let result = control.run();
        drop(control);

        // Released on a failed loop as well as a clean stop
        if let Some(pid_file) = self.pid_file {
            pid_file.remove();
        }
        if result.is_ok() {
            info!("SHUTDOWN: Stopped");
        }
        result
    }
}
