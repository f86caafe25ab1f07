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

//! Signal handling and the blocking wait
//!
//! `SIGUSR1` requests a configuration reload, `SIGTERM` and `SIGINT` request
//! a stop. The handlers only set atomic flags. All three signals stay blocked
//! except inside `ppoll`, so a signal that arrives while the loop is busy is
//! held pending and interrupts the very next wait.

use std::io;
use std::mem;
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;
use ttt_core::{MixerError, Result};

static RELOAD: AtomicBool = AtomicBool::new(false);
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

const HANDLED: [(libc::c_int, &str); 3] = [
    (libc::SIGUSR1, "SIGUSR1"),
    (libc::SIGTERM, "SIGTERM"),
    (libc::SIGINT, "SIGINT"),
];

/// A flag raised asynchronously and consumed by the control loop
#[derive(Debug, Clone, Copy)]
pub struct Trigger(&'static AtomicBool);

impl Trigger {
    /// Flag set by `SIGUSR1`
    pub fn reload() -> Self {
        Self(&RELOAD)
    }

    /// Flag set by `SIGTERM` and `SIGINT`
    pub fn shutdown() -> Self {
        Self(&SHUTDOWN)
    }

    /// A trigger backed by a caller-owned flag
    pub const fn new(flag: &'static AtomicBool) -> Self {
        Self(flag)
    }

    pub fn raise(self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Read and clear; any number of raises since the last take count once
    pub fn take(self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }

    pub fn is_raised(self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

extern "C" fn on_reload(_signal: libc::c_int) {
    RELOAD.store(true, Ordering::SeqCst);
}

extern "C" fn on_shutdown(_signal: libc::c_int) {
    SHUTDOWN.store(true, Ordering::SeqCst);
}

/// Result of one wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// At least one descriptor has events
    Ready,
    /// A signal handler ran
    Interrupted,
}

/// The loop's single blocking point
#[cfg_attr(test, mockall::automock)]
pub trait Waiter {
    /// Block until a descriptor is ready or a handled signal arrives
    fn wait(&mut self, fds: &mut [libc::pollfd]) -> Result<Wake>;
}

/// `ppoll` with the handled signals unblocked for the duration of the call
pub struct SignalWaiter {
    mask: libc::sigset_t,
}

impl Waiter for SignalWaiter {
    fn wait(&mut self, fds: &mut [libc::pollfd]) -> Result<Wake> {
        // SAFETY: fds points to fds.len() initialized pollfd structs that stay
        // borrowed for the call. A null timeout blocks indefinitely and the
        // mask is a valid sigset_t owned by self.
        let rc = unsafe {
            libc::ppoll(
                fds.as_mut_ptr(),
                fds.len() as libc::nfds_t,
                ptr::null(),
                &self.mask,
            )
        };
        if rc >= 0 {
            return Ok(Wake::Ready);
        }

        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            Ok(Wake::Interrupted)
        } else {
            Err(MixerError::Wait(err))
        }
    }
}

/// Block the handled signals on this thread, install their handlers and
/// return a waiter that unblocks them only while waiting
pub fn install() -> Result<SignalWaiter> {
    // SAFETY: every sigset_t is initialized by sigemptyset or copied from one
    // the kernel filled in before use.
    let previous = unsafe {
        let mut blocked: libc::sigset_t = mem::zeroed();
        libc::sigemptyset(&mut blocked);
        for (signal, _) in HANDLED {
            libc::sigaddset(&mut blocked, signal);
        }

        let mut previous: libc::sigset_t = mem::zeroed();
        let rc = libc::pthread_sigmask(libc::SIG_BLOCK, &blocked, &mut previous);
        if rc != 0 {
            return Err(MixerError::Signal {
                signal: "mask",
                source: io::Error::from_raw_os_error(rc),
            });
        }
        previous
    };

    for (signal, name) in HANDLED {
        let handler: extern "C" fn(libc::c_int) = if signal == libc::SIGUSR1 {
            on_reload
        } else {
            on_shutdown
        };
        // SAFETY: the handlers only store to atomics, which is async-signal
        // safe. The sigaction struct is fully initialized before the call.
        let rc = unsafe {
            let mut action: libc::sigaction = mem::zeroed();
            action.sa_sigaction = handler as libc::sighandler_t;
            libc::sigemptyset(&mut action.sa_mask);
            action.sa_flags = 0;
            libc::sigaction(signal, &action, ptr::null_mut())
        };
        if rc != 0 {
            return Err(MixerError::Signal {
                signal: name,
                source: io::Error::last_os_error(),
            });
        }
    }

    let mut mask = previous;
    for (signal, _) in HANDLED {
        // SAFETY: mask is a valid, initialized sigset_t.
        unsafe { libc::sigdelset(&mut mask, signal) };
    }

    debug!("Signal handlers installed");
    Ok(SignalWaiter { mask })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_coalesces() {
        static FLAG: AtomicBool = AtomicBool::new(false);
        let trigger = Trigger::new(&FLAG);

        trigger.raise();
        trigger.raise();
        assert!(trigger.is_raised());
        assert!(trigger.take());
        assert!(!trigger.take());
        assert!(!trigger.is_raised());
    }

    #[test]
    fn test_wait_reports_ready_descriptor() {
        let mut pipe = [0 as libc::c_int; 2];
        // SAFETY: pipe writes two descriptors into a two-element array.
        assert_eq!(unsafe { libc::pipe(pipe.as_mut_ptr()) }, 0);
        // SAFETY: the write end is open and the buffer is one valid byte.
        assert_eq!(unsafe { libc::write(pipe[1], b"x".as_ptr().cast(), 1) }, 1);

        // SAFETY: an empty set is a valid mask.
        let mask = unsafe {
            let mut mask: libc::sigset_t = mem::zeroed();
            libc::sigemptyset(&mut mask);
            mask
        };
        let mut waiter = SignalWaiter { mask };
        let mut fds = [libc::pollfd {
            fd: pipe[0],
            events: libc::POLLIN,
            revents: 0,
        }];
        assert_eq!(waiter.wait(&mut fds).unwrap(), Wake::Ready);
        assert_ne!(fds[0].revents & libc::POLLIN, 0);

        // SAFETY: both descriptors came from pipe above.
        unsafe {
            libc::close(pipe[0]);
            libc::close(pipe[1]);
        }
    }
}
