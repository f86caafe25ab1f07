//! Control surface: resolved elements, watches and sensed state
//!
//! Built once at startup on top of a [`ControlBackend`]. Every element the
//! daemon needs is resolved up front so a missing control fails the start
//! rather than a later write.

use tracing::{debug, warn};

use super::backend::{ControlBackend, ElemRef};
use super::element::{self, ElementSpec, ElementValue};
use super::state::{HardwareState, Sensor};
use crate::engine::VolumeOutputSet;
use crate::error::Result;

/// A mixer element driven from [`VolumeOutputSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actuator {
    SpeakerVolume,
    HeadphoneVolume,
    PlaybackVolume,
    MonoMixLeft,
    MonoMixRight,
    MicBoostLeft,
    MicBoostRight,
    CaptureSwitch,
    InputGainLeft,
    InputGainRight,
    CaptureVolume,
}

impl Actuator {
    /// Write order used on every loop iteration
    pub const ALL: [Actuator; 11] = [
        Actuator::SpeakerVolume,
        Actuator::HeadphoneVolume,
        Actuator::PlaybackVolume,
        Actuator::MonoMixLeft,
        Actuator::MonoMixRight,
        Actuator::MicBoostLeft,
        Actuator::MicBoostRight,
        Actuator::CaptureSwitch,
        Actuator::InputGainLeft,
        Actuator::InputGainRight,
        Actuator::CaptureVolume,
    ];

    pub fn spec(self) -> ElementSpec {
        match self {
            Self::SpeakerVolume => element::SPEAKER_VOLUME,
            Self::HeadphoneVolume => element::HEADPHONE_VOLUME,
            Self::PlaybackVolume => element::PLAYBACK_VOLUME,
            Self::MonoMixLeft => element::MONO_MIX_LEFT,
            Self::MonoMixRight => element::MONO_MIX_RIGHT,
            Self::MicBoostLeft => element::MIC_BOOST_LEFT,
            Self::MicBoostRight => element::MIC_BOOST_RIGHT,
            Self::CaptureSwitch => element::CAPTURE_SWITCH,
            Self::InputGainLeft => element::INPUT_GAIN_LEFT,
            Self::InputGainRight => element::INPUT_GAIN_RIGHT,
            Self::CaptureVolume => element::CAPTURE_VOLUME,
        }
    }

    /// The value this element gets for a given output set
    pub fn value(self, out: &VolumeOutputSet) -> ElementValue {
        let channels = self.spec().channels;
        match self {
            Self::SpeakerVolume => ElementValue::integer(out.speaker_volume, channels),
            Self::HeadphoneVolume => ElementValue::integer(out.headphone_volume, channels),
            Self::PlaybackVolume => ElementValue::integer(out.playback_volume, channels),
            Self::MonoMixLeft => ElementValue::boolean(out.mono_mix_left, channels),
            Self::MonoMixRight => ElementValue::boolean(out.mono_mix_right, channels),
            Self::MicBoostLeft => ElementValue::boolean(out.mic_boost_left, channels),
            Self::MicBoostRight => ElementValue::boolean(out.mic_boost_right, channels),
            Self::CaptureSwitch => ElementValue::boolean(out.capture_enable, channels),
            Self::InputGainLeft | Self::InputGainRight => {
                ElementValue::integer(out.input_gain, channels)
            }
            Self::CaptureVolume => ElementValue::integer(out.capture_gain, channels),
        }
    }
}

/// Every element the daemon reads or writes
pub fn card_contract() -> Vec<ElementSpec> {
    Sensor::ALL
        .iter()
        .map(|s| s.spec())
        .chain(Actuator::ALL.iter().map(|a| a.spec()))
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct Watch {
    elem: ElemRef,
    sensor: Sensor,
}

/// Resolved control elements plus the state their notifications maintain
pub struct ControlSurface<B: ControlBackend> {
    backend: B,
    actuators: Vec<(Actuator, ElemRef)>,
    watches: Vec<Watch>,
    state: HardwareState,
}

impl<B: ControlBackend> ControlSurface<B> {
    /// Resolve every element and seed the hardware state
    ///
    /// Fails if any element of the card contract is missing or a sensor
    /// cannot be read.
    pub fn open(mut backend: B) -> Result<Self> {
        let actuators = Actuator::ALL
            .iter()
            .map(|&actuator| {
                let elem = backend.resolve(&actuator.spec())?;
                Ok((actuator, elem))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut surface = Self {
            backend,
            actuators,
            watches: Vec::new(),
            state: HardwareState::default(),
        };
        for sensor in Sensor::ALL {
            surface.watch(sensor)?;
        }

        debug!(state = ?surface.state, "Hardware state seeded");
        Ok(surface)
    }

    /// Register a sensor and seed its field with a synchronous read
    ///
    /// Watching a sensor twice is a no-op.
    pub fn watch(&mut self, sensor: Sensor) -> Result<()> {
        if self.watches.iter().any(|w| w.sensor == sensor) {
            return Ok(());
        }

        let elem = self.backend.resolve(&sensor.spec())?;
        let value = self.backend.read(elem)?;
        sensor.update(&mut self.state, &value)?;
        self.watches.push(Watch { elem, sensor });
        Ok(())
    }

    pub fn state(&self) -> &HardwareState {
        &self.state
    }

    /// Write every actuator, returning how many writes succeeded
    ///
    /// A failed write is logged and does not stop the others.
    pub fn apply(&mut self, out: &VolumeOutputSet) -> usize {
        let mut written = 0;
        for &(actuator, elem) in &self.actuators {
            match self.backend.write(elem, &actuator.value(out)) {
                Ok(()) => written += 1,
                Err(e) => warn!(element = actuator.spec().name, "{}", e),
            }
        }
        written
    }

    /// Descriptors to wait on before the next dispatch
    pub fn wait_descriptors(&self) -> Result<Vec<libc::pollfd>> {
        self.backend.poll_descriptors()
    }

    /// Whether a completed wait left notifications to dispatch
    pub fn has_pending(&self, fds: &[libc::pollfd]) -> Result<bool> {
        self.backend.revents(fds)
    }

    /// Drain notifications and refresh every watched field
    ///
    /// A sensor that cannot be re-read keeps its previous value.
    pub fn dispatch_pending(&mut self) -> Result<u32> {
        let handled = self.backend.handle_events()?;
        if handled == 0 {
            return Ok(0);
        }

        for watch in &self.watches {
            let refreshed = self
                .backend
                .read(watch.elem)
                .and_then(|value| watch.sensor.update(&mut self.state, &value));
            match refreshed {
                Ok(true) => debug!(sensor = ?watch.sensor, state = ?self.state, "Sensor changed"),
                Ok(false) => {}
                Err(e) => warn!(sensor = ?watch.sensor, "{}", e),
            }
        }
        Ok(handled)
    }
}
