//! Control element descriptions and values

use crate::constants::elements;

/// Interface namespace an element lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    /// Card-wide controls (jack sensing, the volume button)
    Card,
    /// Mixer controls
    Mixer,
}

/// Value type of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Boolean,
    Integer,
}

/// A named, typed control element the daemon depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementSpec {
    pub name: &'static str,
    pub namespace: Namespace,
    pub kind: ValueKind,
    pub channels: u32,
}

impl ElementSpec {
    const fn card(name: &'static str, kind: ValueKind, channels: u32) -> Self {
        Self {
            name,
            namespace: Namespace::Card,
            kind,
            channels,
        }
    }

    const fn mixer(name: &'static str, kind: ValueKind, channels: u32) -> Self {
        Self {
            name,
            namespace: Namespace::Mixer,
            kind,
            channels,
        }
    }
}

pub const JACK: ElementSpec = ElementSpec::card(elements::JACK, ValueKind::Boolean, 1);
pub const BUTTONS: ElementSpec = ElementSpec::card(elements::BUTTONS, ValueKind::Integer, 2);

pub const SPEAKER_VOLUME: ElementSpec =
    ElementSpec::mixer(elements::SPEAKER_VOLUME, ValueKind::Integer, 2);
pub const HEADPHONE_VOLUME: ElementSpec =
    ElementSpec::mixer(elements::HEADPHONE_VOLUME, ValueKind::Integer, 2);
pub const PLAYBACK_VOLUME: ElementSpec =
    ElementSpec::mixer(elements::PLAYBACK_VOLUME, ValueKind::Integer, 2);
pub const MONO_MIX_LEFT: ElementSpec =
    ElementSpec::mixer(elements::MONO_MIX_LEFT, ValueKind::Boolean, 1);
pub const MONO_MIX_RIGHT: ElementSpec =
    ElementSpec::mixer(elements::MONO_MIX_RIGHT, ValueKind::Boolean, 1);
pub const MIC_BOOST_LEFT: ElementSpec =
    ElementSpec::mixer(elements::MIC_BOOST_LEFT, ValueKind::Boolean, 1);
pub const MIC_BOOST_RIGHT: ElementSpec =
    ElementSpec::mixer(elements::MIC_BOOST_RIGHT, ValueKind::Boolean, 1);
pub const CAPTURE_SWITCH: ElementSpec =
    ElementSpec::mixer(elements::CAPTURE_SWITCH, ValueKind::Boolean, 2);
pub const INPUT_GAIN_LEFT: ElementSpec =
    ElementSpec::mixer(elements::INPUT_GAIN_LEFT, ValueKind::Integer, 1);
pub const INPUT_GAIN_RIGHT: ElementSpec =
    ElementSpec::mixer(elements::INPUT_GAIN_RIGHT, ValueKind::Integer, 1);
pub const CAPTURE_VOLUME: ElementSpec =
    ElementSpec::mixer(elements::CAPTURE_VOLUME, ValueKind::Integer, 2);

/// Per-channel element value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementValue {
    Boolean(Vec<bool>),
    Integer(Vec<i32>),
}

impl ElementValue {
    /// The same boolean on every channel
    pub fn boolean(value: bool, channels: u32) -> Self {
        Self::Boolean(vec![value; channels as usize])
    }

    /// The same integer on every channel
    pub fn integer(value: i32, channels: u32) -> Self {
        Self::Integer(vec![value; channels as usize])
    }

    /// A zeroed value matching an element's shape
    pub fn zeroed(spec: &ElementSpec) -> Self {
        match spec.kind {
            ValueKind::Boolean => Self::boolean(false, spec.channels),
            ValueKind::Integer => Self::integer(0, spec.channels),
        }
    }

    pub fn channels(&self) -> usize {
        match self {
            Self::Boolean(v) => v.len(),
            Self::Integer(v) => v.len(),
        }
    }

    /// Channel read as a switch; integers are high when non-zero
    ///
    /// The button driver reports its GPIOs as a boolean element on some
    /// kernels and as an integer element on others, so both are accepted.
    pub fn flag(&self, channel: usize) -> Option<bool> {
        match self {
            Self::Boolean(v) => v.get(channel).copied(),
            Self::Integer(v) => v.get(channel).map(|&i| i != 0),
        }
    }

    pub fn integer_at(&self, channel: usize) -> Option<i32> {
        match self {
            Self::Boolean(v) => v.get(channel).map(|&b| i32::from(b)),
            Self::Integer(v) => v.get(channel).copied(),
        }
    }
}
