//! Sensed hardware state and the sensors that feed it

use serde::Serialize;

use super::element::{self, ElementSpec, ElementValue};
use crate::error::{MixerError, Result};

/// The two GPIO lines behind the volume wheel
///
/// `(true, true)` cannot be produced by working hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ButtonState(pub bool, pub bool);

impl ButtonState {
    pub fn is_valid(self) -> bool {
        !(self.0 && self.1)
    }
}

/// Current jack and wheel readings
///
/// Only the control surface's notification path writes this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HardwareState {
    pub jack_present: bool,
    pub buttons: ButtonState,
}

/// A watched element, bound to the one state field it updates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensor {
    /// Headphone jack presence -> `jack_present`
    Jack,
    /// Volume wheel GPIO pair -> `buttons`
    Buttons,
}

impl Sensor {
    pub const ALL: [Sensor; 2] = [Sensor::Jack, Sensor::Buttons];

    pub fn spec(self) -> ElementSpec {
        match self {
            Self::Jack => element::JACK,
            Self::Buttons => element::BUTTONS,
        }
    }

    /// Store a freshly read value into this sensor's field
    ///
    /// Returns whether the field changed.
    pub fn update(self, state: &mut HardwareState, value: &ElementValue) -> Result<bool> {
        let name = self.spec().name;
        let channel = |ch: usize| {
            value.flag(ch).ok_or_else(|| {
                MixerError::element_read(name, format!("missing channel {}", ch))
            })
        };

        match self {
            Self::Jack => {
                let jack_present = channel(0)?;
                let changed = state.jack_present != jack_present;
                state.jack_present = jack_present;
                Ok(changed)
            }
            Self::Buttons => {
                let buttons = ButtonState(channel(0)?, channel(1)?);
                let changed = state.buttons != buttons;
                state.buttons = buttons;
                Ok(changed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jack_updates_only_jack() {
        let mut state = HardwareState {
            jack_present: false,
            buttons: ButtonState(true, false),
        };
        let changed = Sensor::Jack
            .update(&mut state, &ElementValue::Boolean(vec![true]))
            .unwrap();
        assert!(changed);
        assert!(state.jack_present);
        assert_eq!(state.buttons, ButtonState(true, false));
    }

    #[test]
    fn test_buttons_update_from_integer_element() {
        let mut state = HardwareState::default();
        Sensor::Buttons
            .update(&mut state, &ElementValue::Integer(vec![0, 1]))
            .unwrap();
        assert_eq!(state.buttons, ButtonState(false, true));
        assert!(!state.jack_present);

        let changed = Sensor::Buttons
            .update(&mut state, &ElementValue::Integer(vec![0, 1]))
            .unwrap();
        assert!(!changed);
    }

    #[test]
    fn test_short_value_is_an_error() {
        let mut state = HardwareState::default();
        let err = Sensor::Buttons.update(&mut state, &ElementValue::Boolean(vec![true]));
        assert!(err.is_err());
        assert_eq!(state, HardwareState::default());
    }

    #[test]
    fn test_button_validity() {
        assert!(ButtonState(false, false).is_valid());
        assert!(ButtonState(true, false).is_valid());
        assert!(!ButtonState(true, true).is_valid());
    }
}
