//! Mixer configuration store
//!
//! The configuration file is a flat list of `key=value` lines. Lines starting
//! with `;` and blank lines are skipped. Unknown keys are ignored so that a
//! newer file still loads on an older daemon.
//!
//! # Reload Semantics
//!
//! A reload builds a candidate starting from the *active* values and commits
//! it as a whole:
//!
//! - A line that is not `key=value` rejects the entire file. The active
//!   configuration is kept unchanged.
//! - An unreadable file (missing, permission denied, not UTF-8) is treated the
//!   same way.
//! - A bad literal for a boolean or enumerated key only skips that field.
//! - Integer keys read the leading integer and fall back to 0, the same as C
//!   `atoi`. This never fails.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::constants::defaults;
use crate::engine::Revision;
use crate::error::{MixerError, Result};

/// Behaviour of the shared output path while a jack is plugged in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingMode {
    /// Jack carries a fixed line-level signal; the volume wheel keeps driving
    /// the speaker table
    Lineout,
    /// Jack carries headphones; the volume wheel drives the DAC level
    Headphone,
}

impl RoutingMode {
    /// Parse the literal used in the configuration file
    pub fn from_literal(value: &str) -> Option<Self> {
        match value {
            "lineout" => Some(Self::Lineout),
            "headphone" => Some(Self::Headphone),
            _ => None,
        }
    }
}

/// Immutable configuration snapshot
///
/// Never mutated while the control loop uses it; a reload swaps in a new
/// value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub debug: bool,
    pub revision: Revision,
    #[serde(rename = "mode")]
    pub routing: RoutingMode,
    pub microphone: bool,
    pub speaker_low: i32,
    pub speaker_high: i32,
    pub lineout_low: i32,
    pub lineout_high: i32,
    pub playback_base: i32,
    pub headphone_low: i32,
    pub headphone_high: i32,
    pub input_gain: i32,
    pub capture_gain: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: defaults::DEBUG,
            revision: Revision::Current,
            routing: RoutingMode::Headphone,
            microphone: defaults::MICROPHONE,
            speaker_low: defaults::SPEAKER_LOW,
            speaker_high: defaults::SPEAKER_HIGH,
            lineout_low: defaults::LINEOUT_LOW,
            lineout_high: defaults::LINEOUT_HIGH,
            playback_base: defaults::PLAYBACK_BASE,
            headphone_low: defaults::HEADPHONE_LOW,
            headphone_high: defaults::HEADPHONE_HIGH,
            input_gain: defaults::INPUT_GAIN,
            capture_gain: defaults::CAPTURE_GAIN,
        }
    }
}

impl Config {
    /// Apply one `key=value` pair to this candidate
    ///
    /// Returns `Ok(false)` for an unknown key. Errors only for a bad
    /// boolean/enum literal, in which case the field keeps its previous value.
    fn apply(&mut self, key: &str, value: &str) -> Result<bool> {
        match key {
            "debug" => self.debug = parse_bool(key, value)?,
            "microphone" => self.microphone = parse_bool(key, value)?,
            "mode" => {
                self.routing = RoutingMode::from_literal(value)
                    .ok_or_else(|| invalid(key, value, "expected lineout or headphone"))?
            }
            "revision" => {
                self.revision = Revision::from_literal(value)
                    .ok_or_else(|| invalid(key, value, "expected legacy or current"))?
            }
            "speaker-low" => self.speaker_low = parse_leading_int(value),
            "speaker-high" => self.speaker_high = parse_leading_int(value),
            "lineout-low" => self.lineout_low = parse_leading_int(value),
            "lineout-high" => self.lineout_high = parse_leading_int(value),
            "playback-base" => self.playback_base = parse_leading_int(value),
            "headphone-low" => self.headphone_low = parse_leading_int(value),
            "headphone-high" => self.headphone_high = parse_leading_int(value),
            "input-gain" => self.input_gain = parse_leading_int(value),
            "capture-gain" => self.capture_gain = parse_leading_int(value),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

fn invalid(key: &str, value: &str, expected: &str) -> MixerError {
    MixerError::InvalidConfig {
        field: key.to_string(),
        reason: format!("{:?} ({})", value, expected),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(invalid(key, value, "expected true, false, 1 or 0")),
    }
}

/// Parse the leading integer of `value`, or 0 if there is none
///
/// Accepts optional leading whitespace and a sign. Trailing garbage is
/// ignored. Values outside the i32 range saturate.
pub fn parse_leading_int(value: &str) -> i32 {
    let s = value.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let limit = i64::from(i32::MAX) + 1;
    let mut acc: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        acc = (acc * 10 + i64::from(b - b'0')).min(limit);
    }

    let signed = if negative { -acc } else { acc };
    signed.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// A line that was skipped without rejecting the file
#[derive(Debug)]
enum Note {
    BadValue { line: usize, error: MixerError },
    UnknownKey { line: usize, key: String },
}

impl Note {
    fn log(&self) {
        match self {
            Self::BadValue { line, error } => warn!(line, "{}", error),
            Self::UnknownKey { line, key } => {
                debug!(line, key = %key, "Ignoring unknown configuration key")
            }
        }
    }
}

/// Parse configuration text on top of `base`
///
/// Fails only on a hard syntax error: a non-blank, non-comment line without
/// `=` or with an empty key.
pub fn parse_config(text: &str, base: &Config) -> Result<Config> {
    let (candidate, notes) = parse_with_notes(text, base)?;
    notes.iter().for_each(Note::log);
    Ok(candidate)
}

fn parse_with_notes(text: &str, base: &Config) -> Result<(Config, Vec<Note>)> {
    let mut candidate = base.clone();
    let mut notes = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }

        let syntax_error = || MixerError::ConfigSyntax {
            line: idx + 1,
            content: raw.to_string(),
        };
        let (key, value) = line.split_once('=').ok_or_else(syntax_error)?;
        let key = key.trim();
        if key.is_empty() {
            return Err(syntax_error());
        }

        match candidate.apply(key, value.trim()) {
            Ok(true) => {}
            Ok(false) => notes.push(Note::UnknownKey {
                line: idx + 1,
                key: key.to_string(),
            }),
            Err(error) => notes.push(Note::BadValue {
                line: idx + 1,
                error,
            }),
        }
    }

    Ok((candidate, notes))
}

/// Result of a [`ConfigStore::reload`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The file was parsed and the new configuration is active
    Applied,
    /// The file could not be read; the previous configuration is kept
    Unreadable,
    /// The file has a syntax error; the previous configuration is kept
    Rejected,
}

/// Holds the active configuration and its source path
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    current: Config,
    generation: u64,
}

impl ConfigStore {
    /// Create a store holding the compiled-in defaults
    ///
    /// Nothing is read until [`reload`](Self::reload) is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_config(path, Config::default())
    }

    /// Create a store seeded with an explicit configuration
    pub fn with_config(path: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            path: path.into(),
            current: config,
            generation: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The active configuration
    pub fn current(&self) -> &Config {
        &self.current
    }

    /// Number of successful reloads since the store was created
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Re-read the source file and swap in the result if it is valid
    pub fn reload(&mut self) -> ReloadOutcome {
        self.reload_with(|_| {})
    }

    /// Like [`reload`](Self::reload), calling `verbosity` with the `debug`
    /// value that will be active before anything about the reload is logged
    pub fn reload_with(&mut self, verbosity: impl FnOnce(bool)) -> ReloadOutcome {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(source) => {
                verbosity(self.current.debug);
                let path = self.path.display();
                if source.kind() == std::io::ErrorKind::NotFound {
                    debug!(path = %path, "No configuration file, keeping current values");
                } else {
                    warn!(path = %path, error = %source, "Could not open configuration file");
                }
                return ReloadOutcome::Unreadable;
            }
        };

        match parse_with_notes(&text, &self.current) {
            Ok((candidate, notes)) => {
                verbosity(candidate.debug);
                notes.iter().for_each(Note::log);
                if candidate != self.current {
                    info!(path = %self.path.display(), "Configuration changed");
                }
                self.current = candidate;
                self.generation += 1;
                ReloadOutcome::Applied
            }
            Err(e) => {
                verbosity(self.current.debug);
                warn!(path = %self.path.display(), "{}; keeping current values", e);
                ReloadOutcome::Rejected
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(parse_leading_int("121"), 121);
        assert_eq!(parse_leading_int("  42"), 42);
        assert_eq!(parse_leading_int("-7"), -7);
        assert_eq!(parse_leading_int("+9"), 9);
        assert_eq!(parse_leading_int("200dB"), 200);
        assert_eq!(parse_leading_int("loud"), 0);
        assert_eq!(parse_leading_int(""), 0);
        assert_eq!(parse_leading_int("-"), 0);
        assert_eq!(parse_leading_int("99999999999"), i32::MAX);
        assert_eq!(parse_leading_int("-99999999999"), i32::MIN);
    }

    #[test]
    fn test_parse_overlays_base() {
        let text = "; volume settings\n\nspeaker-high=110\nmode=lineout\nmicrophone=0\n";
        let config = parse_config(text, &Config::default()).unwrap();

        assert_eq!(config.speaker_high, 110);
        assert_eq!(config.routing, RoutingMode::Lineout);
        assert!(!config.microphone);
        // Untouched keys keep their defaults
        assert_eq!(config.speaker_low, defaults::SPEAKER_LOW);
        assert_eq!(config.revision, Revision::Current);
    }

    #[test]
    fn test_parse_trims_whitespace_and_newlines() {
        let text = "  debug = true \r\n headphone-low=180\n";
        let config = parse_config(text, &Config::default()).unwrap();
        assert!(config.debug);
        assert_eq!(config.headphone_low, 180);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let text = "tag-speaker-base=121\nfuture-knob=on\nplayback-base=200\n";
        let config = parse_config(text, &Config::default()).unwrap();
        assert_eq!(config.playback_base, 200);
    }

    #[test]
    fn test_malformed_integer_becomes_zero() {
        let config = parse_config("capture-gain=abc\n", &Config::default()).unwrap();
        assert_eq!(config.capture_gain, 0);
    }

    #[test]
    fn test_bad_literal_skips_only_that_field() {
        let base = Config::default();
        let text = "speaker-low=90\nmode=speakers\ndebug=yes\nlineout-high=110\n";
        let config = parse_config(text, &base).unwrap();

        assert_eq!(config.speaker_low, 90);
        assert_eq!(config.lineout_high, 110);
        assert_eq!(config.routing, base.routing);
        assert_eq!(config.debug, base.debug);
    }

    #[test]
    fn test_syntax_error_rejects_file() {
        let err = parse_config("speaker-low=90\nthis line is broken\n", &Config::default())
            .unwrap_err();
        match err {
            MixerError::ConfigSyntax { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {}", other),
        }

        assert!(parse_config("=5\n", &Config::default()).is_err());
    }

    #[test]
    fn test_store_starts_with_defaults() {
        let store = ConfigStore::new("/nonexistent/mixer.conf");
        assert_eq!(store.current(), &Config::default());
        assert_eq!(store.generation(), 0);
    }

    #[test]
    fn test_store_reload_applies() {
        let file = write_config("revision=legacy\nplayback-base=240\n");
        let mut store = ConfigStore::new(file.path());

        assert_eq!(store.reload(), ReloadOutcome::Applied);
        assert_eq!(store.current().revision, Revision::Legacy);
        assert_eq!(store.current().playback_base, 240);
        assert_eq!(store.generation(), 1);
    }

    #[test]
    fn test_reload_reports_new_verbosity_first() {
        let file = write_config("debug=true\nvolume-curve=steep\n");
        let mut store = ConfigStore::new(file.path());

        let mut seen = None;
        let outcome = store.reload_with(|debug| seen = Some(debug));
        assert_eq!(outcome, ReloadOutcome::Applied);
        assert_eq!(seen, Some(true));
        assert!(store.current().debug);

        // A rejected file leaves the active verbosity in place
        fs::write(file.path(), "debug=false\nno separator\n").unwrap();
        let outcome = store.reload_with(|debug| seen = Some(debug));
        assert_eq!(outcome, ReloadOutcome::Rejected);
        assert_eq!(seen, Some(true));
    }

    #[test]
    fn test_unknown_and_bad_lines_are_noted() {
        let text = "mystery=1\nmicrophone=maybe\nspeaker-low=90\n";
        let (config, notes) = parse_with_notes(text, &Config::default()).unwrap();
        assert_eq!(config.speaker_low, 90);
        assert!(config.microphone);
        match &notes[0] {
            Note::UnknownKey { line, key } => assert_eq!((*line, key.as_str()), (1, "mystery")),
            other => panic!("unexpected note: {:?}", other),
        }
        assert!(matches!(&notes[1], Note::BadValue { line: 2, .. }));
        assert_eq!(notes.len(), 2);
    }

    #[test]
    fn test_store_missing_file_keeps_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ConfigStore::new(dir.path().join("mixer.conf"));

        assert_eq!(store.reload(), ReloadOutcome::Unreadable);
        assert_eq!(store.current(), &Config::default());
        assert_eq!(store.generation(), 0);
    }

    #[test]
    fn test_store_rejected_file_keeps_previous_good_config() {
        let file = write_config("speaker-high=115\n");
        let mut store = ConfigStore::new(file.path());
        assert_eq!(store.reload(), ReloadOutcome::Applied);

        fs::write(file.path(), "speaker-high=90\nspeaker-low\n").unwrap();
        assert_eq!(store.reload(), ReloadOutcome::Rejected);
        assert_eq!(store.current().speaker_high, 115);
        assert_eq!(store.generation(), 1);
    }

    #[test]
    fn test_reload_builds_on_active_values() {
        let file = write_config("headphone-high=220\n");
        let mut store = ConfigStore::new(file.path());
        store.reload();

        // A later file that omits the key keeps the previously loaded value
        fs::write(file.path(), "headphone-low=150\n").unwrap();
        store.reload();
        assert_eq!(store.current().headphone_high, 220);
        assert_eq!(store.current().headphone_low, 150);
    }

    #[test]
    fn test_config_serializes_with_file_keys() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert_eq!(json["mode"], "headphone");
        assert_eq!(json["revision"], "current");
        assert_eq!(json["speaker-high"], defaults::SPEAKER_HIGH);
    }
}
