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

//! Command line interface

use std::path::PathBuf;

use clap::Parser;
use ttt_core::constants::{card, paths};

#[derive(Parser, Debug, Clone)]
#[command(name = "tagtagtag-mixerd")]
#[command(version)]
#[command(about = "Mixer daemon for the tagtagtag sound card")]
#[command(long_about = "Mixer daemon for the tagtagtag sound card

Watches the headphone jack and the volume wheel and keeps the codec's
mixer controls in line with them and with the configuration file.

SIGNALS:
    SIGUSR1                Reload the configuration file
    SIGTERM, SIGINT        Stop

ENVIRONMENT VARIABLES:
    TAGTAGTAG_MIXERD_LOG   Log filter (trace, debug, info, warn, error)")]
pub struct Cli {
    /// Detach from the terminal and write a PID file
    #[arg(short, long)]
    pub daemonize: bool,

    /// Configuration file
    #[arg(short, long, value_name = "PATH", default_value = paths::CONFIG_FILE)]
    pub config: PathBuf,

    /// ALSA card name
    #[arg(long, value_name = "NAME", default_value = card::NAME)]
    pub card: String,

    /// PID file used with --daemonize
    #[arg(long, value_name = "PATH", default_value = paths::PID_FILE)]
    pub pid_file: PathBuf,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    pub print_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["tagtagtag-mixerd"]).unwrap();
        assert!(!cli.daemonize);
        assert!(!cli.print_config);
        assert_eq!(cli.config, PathBuf::from(paths::CONFIG_FILE));
        assert_eq!(cli.pid_file, PathBuf::from(paths::PID_FILE));
        assert_eq!(cli.card, "tagtagtagsound");
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "tagtagtag-mixerd",
            "-d",
            "-c",
            "/tmp/mixer.conf",
            "--card",
            "Headphones",
            "--pid-file",
            "/tmp/mixerd.pid",
        ])
        .unwrap();
        assert!(cli.daemonize);
        assert_eq!(cli.config, PathBuf::from("/tmp/mixer.conf"));
        assert_eq!(cli.card, "Headphones");
        assert_eq!(cli.pid_file, PathBuf::from("/tmp/mixerd.pid"));
    }

    #[test]
    fn test_unknown_flag_rejected() {
        let parsed = Cli::try_parse_from(["tagtagtag-mixerd", "--foreground"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
