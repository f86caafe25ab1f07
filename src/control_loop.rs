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

//! The control loop
//!
//! Every iteration recomputes the full output set from the active
//! configuration and the sensed state, writes it, then blocks until either
//! the card reports a change or a signal arrives.

use tracing::{debug, info, warn};
use ttt_core::{decide, ConfigStore, ControlBackend, ControlSurface, ReloadOutcome, Result};

use crate::logger::LogControl;
use crate::signals::{Trigger, Waiter, Wake};

/// What the loop does after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

pub struct ControlLoop<B: ControlBackend, W: Waiter> {
    surface: ControlSurface<B>,
    config: ConfigStore,
    reload: Trigger,
    shutdown: Trigger,
    waiter: W,
    log: Option<LogControl>,
}

impl<B: ControlBackend, W: Waiter> ControlLoop<B, W> {
    /// A loop driven by the process-wide signal triggers
    pub fn new(surface: ControlSurface<B>, config: ConfigStore, waiter: W) -> Self {
        Self {
            surface,
            config,
            reload: Trigger::reload(),
            shutdown: Trigger::shutdown(),
            waiter,
            log: None,
        }
    }

    /// Replace the reload and shutdown triggers
    pub fn with_triggers(mut self, reload: Trigger, shutdown: Trigger) -> Self {
        self.reload = reload;
        self.shutdown = shutdown;
        self
    }

    /// Let the `debug` key drive log verbosity, starting now
    pub fn with_log_control(mut self, mut log: LogControl) -> Self {
        log.set_debug(self.config.current().debug);
        self.log = Some(log);
        self
    }

    pub fn surface(&self) -> &ControlSurface<B> {
        &self.surface
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// Run until a stop is requested or the wait fails
    pub fn run(&mut self) -> Result<()> {
        info!(path = %self.config.path().display(), "Control loop running");
        while self.step()? == Flow::Continue {}
        info!("Stop requested");
        Ok(())
    }

    /// One write-then-wait cycle
    pub fn step(&mut self) -> Result<Flow> {
        self.write_outputs();

        let mut fds = self.surface.wait_descriptors()?;
        let wake = self.waiter.wait(&mut fds)?;

        if self.shutdown.is_raised() {
            return Ok(Flow::Stop);
        }
        if self.reload.take() {
            self.reload_config();
        }
        if wake == Wake::Ready && self.surface.has_pending(&fds)? {
            let handled = self.surface.dispatch_pending()?;
            debug!(handled, "Dispatched control notifications");
        }
        Ok(Flow::Continue)
    }

    fn write_outputs(&mut self) {
        let state = *self.surface.state();
        match decide(self.config.current(), &state) {
            Ok(out) => {
                let written = self.surface.apply(&out);
                debug!(?state, ?out, written, "Mixer updated");
            }
            Err(violation) => warn!(?state, "{}; leaving mixer unchanged", violation),
        }
    }

    fn reload_config(&mut self) {
        let log = &mut self.log;
        let outcome = self.config.reload_with(|debug| {
            if let Some(log) = log.as_mut() {
                log.set_debug(debug);
            }
        });

        match outcome {
            ReloadOutcome::Applied => {
                let generation = self.config.generation();
                info!(generation, "Configuration reloaded")
            }
            ReloadOutcome::Unreadable | ReloadOutcome::Rejected => {
                warn!("Configuration reload failed, previous values stay active")
            }
        }
    }
}
