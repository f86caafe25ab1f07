//! Volume decision engine
//!
//! Pure mapping from a configuration snapshot and the sensed hardware state
//! to the full set of mixer values. Nothing here touches the hardware.

use serde::Serialize;

use crate::config::{Config, RoutingMode};
use crate::hw::{ButtonState, HardwareState};

/// Every value written to the mixer in one loop iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VolumeOutputSet {
    pub speaker_volume: i32,
    pub headphone_volume: i32,
    pub playback_volume: i32,
    pub mono_mix_left: bool,
    pub mono_mix_right: bool,
    pub mic_boost_left: bool,
    pub mic_boost_right: bool,
    /// Capture switch, applied to both channels
    pub capture_enable: bool,
    /// Input boost gain, applied to the left and right boost stages
    pub input_gain: i32,
    /// ADC capture volume, applied to both channels
    pub capture_gain: i32,
}

/// Inputs the policy refuses to act on
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PolicyViolation {
    #[error("Unexpected button values (both are high)")]
    BothButtonsHigh,
}

/// Derive mixer values from configuration and hardware state
///
/// Returns [`PolicyViolation`] for the button combination the wheel cannot
/// produce. Callers must leave the hardware untouched in that case.
pub fn decide(config: &Config, state: &HardwareState) -> Result<VolumeOutputSet, PolicyViolation> {
    if !state.buttons.is_valid() {
        return Err(PolicyViolation::BothButtonsHigh);
    }
    let position = match state.buttons {
        ButtonState(false, false) => 0,
        ButtonState(false, true) => 1,
        _ => 2,
    };

    let table = config.revision.table();
    let rows = if state.jack_present && config.routing == RoutingMode::Headphone {
        &table.headphone
    } else {
        &table.speaker
    };
    let row = rows[position];

    Ok(VolumeOutputSet {
        speaker_volume: row.speaker.resolve(config),
        headphone_volume: row.headphone.resolve(config),
        playback_volume: row.playback.resolve(config),
        mono_mix_left: state.jack_present,
        mono_mix_right: state.jack_present,
        mic_boost_left: config.microphone,
        mic_boost_right: config.microphone,
        capture_enable: config.microphone,
        input_gain: config.input_gain,
        capture_gain: config.capture_gain,
    })
}
