//! Constants and configuration values for the mixer daemon
//!
//! Centralizes file locations, the card name, compiled-in configuration
//! defaults and the control element names the sound card driver exposes.
//! Add new magic numbers here rather than inline.

/// Filesystem locations
pub mod paths {
    /// Configuration file read at startup and on every reload request
    pub const CONFIG_FILE: &str = "/var/lib/tagtagtag-sound/mixer.conf";

    /// PID file written when detaching
    pub const PID_FILE: &str = "/run/tagtagtag-mixerd.pid";

    /// Socket whose presence means the systemd journal is available
    pub const JOURNAL_SOCKET: &str = "/run/systemd/journal/socket";
}

/// Sound card identification
pub mod card {
    /// ALSA card id of the tagtagtag sound board
    pub const NAME: &str = "tagtagtagsound";

    /// Build the hctl device string for a card id
    pub fn device(name: &str) -> String {
        format!("hw:CARD={}", name)
    }
}

/// Compiled-in configuration defaults
pub mod defaults {
    pub const DEBUG: bool = false;
    pub const MICROPHONE: bool = true;

    /// Speaker path levels (Speaker Playback Volume)
    pub const SPEAKER_LOW: i32 = 100;
    pub const SPEAKER_HIGH: i32 = 121;

    /// Headphone path levels used as line out (Headphone Playback Volume)
    pub const LINEOUT_LOW: i32 = 100;
    pub const LINEOUT_HIGH: i32 = 121;

    /// Shared DAC levels (Playback Volume)
    pub const PLAYBACK_BASE: i32 = 227;
    pub const HEADPHONE_LOW: i32 = 200;
    pub const HEADPHONE_HIGH: i32 = 227;

    /// Input boost stage gain, 0-3 on the codec
    pub const INPUT_GAIN: i32 = 2;

    /// ADC capture gain, 0-63 on the codec
    pub const CAPTURE_GAIN: i32 = 39;
}

/// Control element names
///
/// These are a fixed contract with the card driver. Nothing here is
/// discovered at runtime.
pub mod elements {
    // Sensors (card interface)
    pub const JACK: &str = "Headphones Jack";
    pub const BUTTONS: &str = "Volume Button";

    // Actuators (mixer interface)
    pub const SPEAKER_VOLUME: &str = "Speaker Playback Volume";
    pub const HEADPHONE_VOLUME: &str = "Headphone Playback Volume";
    pub const PLAYBACK_VOLUME: &str = "Playback Volume";
    pub const MONO_MIX_LEFT: &str = "Mono Output Mixer Left Switch";
    pub const MONO_MIX_RIGHT: &str = "Mono Output Mixer Right Switch";
    pub const MIC_BOOST_LEFT: &str = "Left Boost Mixer LINPUT1 Switch";
    pub const MIC_BOOST_RIGHT: &str = "Right Boost Mixer RINPUT1 Switch";
    pub const CAPTURE_SWITCH: &str = "Capture Switch";
    pub const INPUT_GAIN_LEFT: &str = "Left Input Boost Mixer LINPUT1 Volume";
    pub const INPUT_GAIN_RIGHT: &str = "Right Input Boost Mixer RINPUT1 Volume";
    pub const CAPTURE_VOLUME: &str = "Capture Volume";
}
