//! Routing policy tables
//!
//! The volume wheel is read through two GPIO sensors. Because of a sensor
//! ordering defect on the board, its three detents arrive as three of the four
//! possible button pairs, and the two board revisions assign them differently.
//! Each revision is therefore a table rather than a branch chain.
//!
//! ```text
//!  buttons        legacy speaker row          current speaker row
//!  (0, 0)         spk off   hp high  base     spk off   hp high  base
//!  (0, 1)         spk high  hp high  base     spk high  hp off   base
//!  (1, 0)         spk high  hp off   base     spk low   hp low   base
//!  (1, 1)         impossible                  impossible
//! ```
//!
//! Without a headphone output in use, playback always sits at the base level.
//! The revisions only differ in how the speaker and line paths are assigned.

use serde::Serialize;

use crate::config::Config;

/// Board revision, selecting the policy table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Revision {
    /// First production board
    Legacy,
    /// Board with the mode-aware headphone output
    Current,
}

impl Revision {
    /// Parse the literal used in the configuration file
    pub fn from_literal(value: &str) -> Option<Self> {
        match value {
            "legacy" => Some(Self::Legacy),
            "current" => Some(Self::Current),
            _ => None,
        }
    }

    /// The policy table for this revision
    pub fn table(self) -> &'static PolicyTable {
        match self {
            Self::Legacy => &LEGACY,
            Self::Current => &CURRENT,
        }
    }
}

/// A volume level, either silence or a named configuration value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Silence,
    SpeakerLow,
    SpeakerHigh,
    LineoutLow,
    LineoutHigh,
    PlaybackBase,
    HeadphoneLow,
    HeadphoneHigh,
}

impl Level {
    /// Resolve against a configuration snapshot
    pub fn resolve(self, config: &Config) -> i32 {
        match self {
            Self::Silence => 0,
            Self::SpeakerLow => config.speaker_low,
            Self::SpeakerHigh => config.speaker_high,
            Self::LineoutLow => config.lineout_low,
            Self::LineoutHigh => config.lineout_high,
            Self::PlaybackBase => config.playback_base,
            Self::HeadphoneLow => config.headphone_low,
            Self::HeadphoneHigh => config.headphone_high,
        }
    }
}

/// Levels for the three volume elements in one wheel position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row {
    pub speaker: Level,
    pub headphone: Level,
    pub playback: Level,
}

impl Row {
    const fn new(speaker: Level, headphone: Level, playback: Level) -> Self {
        Self {
            speaker,
            headphone,
            playback,
        }
    }
}

/// Rows indexed by wheel position, for each output situation
///
/// Row order is `(false, false)`, `(false, true)`, `(true, false)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyTable {
    /// Jack present and routing mode is headphone
    pub headphone: [Row; 3],
    /// No jack, or line-level routing
    pub speaker: [Row; 3],
}

use Level::*;

static LEGACY: PolicyTable = PolicyTable {
    headphone: [
        Row::new(Silence, Silence, HeadphoneHigh),
        Row::new(Silence, Silence, HeadphoneHigh),
        Row::new(Silence, Silence, HeadphoneHigh),
    ],
    speaker: [
        Row::new(Silence, LineoutHigh, PlaybackBase),
        Row::new(SpeakerHigh, LineoutHigh, PlaybackBase),
        Row::new(SpeakerHigh, Silence, PlaybackBase),
    ],
};

static CURRENT: PolicyTable = PolicyTable {
    headphone: [
        Row::new(Silence, Silence, HeadphoneLow),
        Row::new(Silence, Silence, Silence),
        Row::new(Silence, Silence, HeadphoneHigh),
    ],
    speaker: [
        Row::new(Silence, LineoutHigh, PlaybackBase),
        Row::new(SpeakerHigh, Silence, PlaybackBase),
        Row::new(SpeakerLow, LineoutLow, PlaybackBase),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revision_literals() {
        assert_eq!(Revision::from_literal("legacy"), Some(Revision::Legacy));
        assert_eq!(Revision::from_literal("current"), Some(Revision::Current));
        assert_eq!(Revision::from_literal("Current"), None);
    }

    #[test]
    fn test_speaker_rows_use_base_playback() {
        for revision in [Revision::Legacy, Revision::Current] {
            for row in &revision.table().speaker {
                assert_eq!(row.playback, PlaybackBase);
            }
        }
    }

    #[test]
    fn test_headphone_rows_silence_paths() {
        for revision in [Revision::Legacy, Revision::Current] {
            for row in &revision.table().headphone {
                assert_eq!(row.speaker, Silence);
                assert_eq!(row.headphone, Silence);
            }
        }
    }

    #[test]
    fn test_level_resolution() {
        let config = Config {
            speaker_low: 11,
            lineout_high: 22,
            ..Config::default()
        };
        assert_eq!(Silence.resolve(&config), 0);
        assert_eq!(SpeakerLow.resolve(&config), 11);
        assert_eq!(LineoutHigh.resolve(&config), 22);
    }
}
