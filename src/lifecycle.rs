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

//! Daemon lifecycle: PID file lock and detaching from the terminal

use std::fs::{self, File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use ttt_core::{MixerError, Result};

/// An exclusively locked PID file
///
/// The lock is held for as long as this value, or a forked copy of its
/// descriptor, stays open.
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
    file: File,
}

impl PidFile {
    /// Open or create the file and take a non-blocking exclusive lock
    ///
    /// Fails with `AlreadyRunning` if another process holds the lock.
    pub fn acquire(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let pid_error = |source: io::Error| MixerError::PidFile {
            path: path.clone(),
            source,
        };

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .mode(0o644)
            .open(&path)
            .map_err(pid_error)?;

        // SAFETY: the descriptor is owned by `file`, which is open for the
        // duration of the call.
        if unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) } != 0 {
            let err = io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EWOULDBLOCK) {
                return Err(MixerError::AlreadyRunning(path));
            }
            return Err(pid_error(err));
        }

        debug!(path = %path.display(), "PID file locked");
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the file's contents with `pid`
    pub fn write_pid(&mut self, pid: libc::pid_t) -> Result<()> {
        let written = self
            .file
            .set_len(0)
            .and_then(|()| self.file.seek(SeekFrom::Start(0)))
            .and_then(|_| writeln!(self.file, "{}", pid))
            .and_then(|()| self.file.sync_all());
        written.map_err(|source| MixerError::PidFile {
            path: self.path.clone(),
            source,
        })
    }

    /// Delete the file, releasing the lock
    pub fn remove(self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), "Failed to remove PID file: {}", e);
        }
    }
}

/// Which side of the fork this process is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detached {
    /// The launching process; holds the child's PID
    Parent(libc::pid_t),
    /// The detached process, now a session leader
    Child,
}

/// Fork into the background
///
/// The parent records the child's PID in `pid_file`; the child starts a new
/// session. Both keep the lock's descriptor, so the lock outlives the parent.
pub fn detach(pid_file: &mut PidFile) -> Result<Detached> {
    // SAFETY: the process is single-threaded at this point, so the child
    // starts from a consistent copy of memory.
    match unsafe { libc::fork() } {
        -1 => Err(MixerError::Detach(io::Error::last_os_error())),
        0 => {
            // SAFETY: setsid has no preconditions; a fresh child is never a
            // process group leader so it cannot fail with EPERM.
            if unsafe { libc::setsid() } == -1 {
                return Err(MixerError::Detach(io::Error::last_os_error()));
            }
            Ok(Detached::Child)
        }
        child => {
            pid_file.write_pid(child)?;
            Ok(Detached::Parent(child))
        }
    }
}
