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

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use tagtagtag_mixerd::cli::Cli;
use tagtagtag_mixerd::daemon::{Launched, Startup};
use tagtagtag_mixerd::logger::{self, LogControl};
use ttt_core::{AlsaBackend, ConfigStore, MixerError};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> ExitCode {
    let cli = Cli::parse();
    let log = logger::init();

    match run(cli, log) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            if is_permission_error(&e) {
                eprintln!("tagtagtag-mixerd: {:#} (not running as root?)", e);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, log: LogControl) -> anyhow::Result<()> {
    let mut config = ConfigStore::new(&cli.config);
    config.reload();

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(config.current())?);
        return Ok(());
    }

    info!("STARTUP: tagtagtag-mixerd {} starting", VERSION);
    info!("STARTUP: Logging to {}", log.sink());

    let startup = Startup::prepare(|| AlsaBackend::open(&cli.card))?;
    let startup = if cli.daemonize {
        match startup.detach(&cli.pid_file)? {
            Launched::Parent { child } => {
                info!("STARTUP: Detached as PID {}", child);
                return Ok(());
            }
            Launched::Daemon(startup) => startup,
        }
    } else {
        startup
    };

    startup.run(config, Some(log))?;
    Ok(())
}

fn is_permission_error(e: &anyhow::Error) -> bool {
    match e.downcast_ref::<MixerError>() {
        Some(MixerError::PidFile { source, .. }) => {
            source.kind() == io::ErrorKind::PermissionDenied
        }
        _ => false,
    }
}
