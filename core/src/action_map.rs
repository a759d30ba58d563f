//! Named action bindings over the xr-standard layout
//!
//! Applications that think in terms of actions ("teleport", "grab")
//! rather than slots describe their bindings here. Evaluation reads the
//! frame-stable gamepad snapshot of an input source; it never touches
//! device state directly.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::gamepad::{
    AXIS_THUMBSTICK_X, AXIS_THUMBSTICK_Y, AXIS_TOUCHPAD_X, AXIS_TOUCHPAD_Y, BUTTON_SQUEEZE,
    BUTTON_THUMBSTICK, BUTTON_TOUCHPAD, BUTTON_TRIGGER, XrGamepad,
};
use crate::source::{Handedness, InputSource};

/// Part of a button reading a binding observes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonComponent {
    Pressed,
    Touched,
    #[default]
    Value,
}

/// Gamepad slot(s) a binding reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BindingSource {
    Button {
        index: usize,
        #[serde(default)]
        component: ButtonComponent,
    },
    Axis {
        index: usize,
    },
    /// Two axes read together as a 2D vector
    Stick {
        x: usize,
        y: usize,
    },
}

/// One named binding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionBinding {
    pub name: String,
    pub source: BindingSource,
    /// Only sources held in this hand match; `None` matches any hand
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hand: Option<Handedness>,
}

/// Current value of a bound action
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActionValue {
    Bool(bool),
    Float(f32),
    Vector2([f32; 2]),
}

impl ActionValue {
    /// Whether the action is doing anything at all
    pub fn is_active(&self) -> bool {
        match *self {
            ActionValue::Bool(b) => b,
            ActionValue::Float(v) => v != 0.0,
            ActionValue::Vector2([x, y]) => Vec2::new(x, y) != Vec2::ZERO,
        }
    }
}

/// Named set of bindings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionMap {
    pub name: String,
    #[serde(default)]
    pub bindings: Vec<ActionBinding>,
}

impl Default for ActionMap {
    fn default() -> Self {
        Self::xr_standard()
    }
}

impl ActionMap {
    /// Map that mirrors the canonical slot names
    pub fn xr_standard() -> Self {
        let button = |name: &str, index, component| ActionBinding {
            name: name.to_string(),
            source: BindingSource::Button { index, component },
            hand: None,
        };
        let stick = |name: &str, x, y| ActionBinding {
            name: name.to_string(),
            source: BindingSource::Stick { x, y },
            hand: None,
        };
        Self {
            name: "xr-standard".to_string(),
            bindings: vec![
                button("trigger", BUTTON_TRIGGER, ButtonComponent::Value),
                button("touchpad_click", BUTTON_TOUCHPAD, ButtonComponent::Pressed),
                button("squeeze", BUTTON_SQUEEZE, ButtonComponent::Value),
                button("thumbstick_click", BUTTON_THUMBSTICK, ButtonComponent::Pressed),
                stick("touchpad", AXIS_TOUCHPAD_X, AXIS_TOUCHPAD_Y),
                stick("thumbstick", AXIS_THUMBSTICK_X, AXIS_THUMBSTICK_Y),
            ],
        }
    }

    fn read(gamepad: &XrGamepad, source: BindingSource) -> Option<ActionValue> {
        match source {
            BindingSource::Button { index, component } => {
                let button = gamepad.button(index)?;
                Some(match component {
                    ButtonComponent::Pressed => ActionValue::Bool(button.pressed),
                    ButtonComponent::Touched => ActionValue::Bool(button.touched),
                    ButtonComponent::Value => ActionValue::Float(button.value),
                })
            }
            BindingSource::Axis { index } => gamepad.axis(index).map(ActionValue::Float),
            BindingSource::Stick { x, y } => {
                Some(ActionValue::Vector2([gamepad.axis(x)?, gamepad.axis(y)?]))
            }
        }
    }

    /// Values of every binding that applies to `source`.
    ///
    /// Sources without a gamepad produce no values. Bindings to slots
    /// outside the gamepad layout are skipped.
    pub fn evaluate<'a>(&'a self, source: &InputSource) -> Vec<(&'a str, ActionValue)> {
        let Some(gamepad) = source.gamepad() else {
            return Vec::new();
        };
        self.bindings
            .iter()
            .filter(|binding| binding.hand.is_none_or(|hand| hand == source.handedness()))
            .filter_map(|binding| {
                Self::read(gamepad, binding.source).map(|value| (binding.name.as_str(), value))
            })
            .collect()
    }

    /// Value of one named binding, first match wins
    pub fn value(&self, name: &str, source: &InputSource) -> Option<ActionValue> {
        self.evaluate(source)
            .into_iter()
            .find(|(binding, _)| *binding == name)
            .map(|(_, value)| value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InputConfig;
    use crate::gamepad::{GamepadLayout, RawButton};
    use crate::profile::{DeviceIdentity, ProfilePolicy};
    use crate::source::{DeviceId, InputSourceDescriptor, InputSourceId};
    use crate::space::SpaceId;

    fn source(handedness: Handedness) -> InputSource {
        let descriptor = InputSourceDescriptor {
            handedness,
            identity: DeviceIdentity::new("valve", "index"),
            gamepad: Some(GamepadLayout::full()),
            ..Default::default()
        };
        let base = InputSource::new(
            InputSourceId(1),
            DeviceId(1),
            &descriptor,
            SpaceId(1),
            Some(SpaceId(2)),
            ProfilePolicy::default(),
        );
        let config = InputConfig::default();
        let mut gamepad = base.gamepad().unwrap().clone();
        gamepad.apply_button(BUTTON_TRIGGER, RawButton::down(), &config);
        gamepad.apply_axis(AXIS_THUMBSTICK_X, 1.0, &config);
        base.with_gamepad(gamepad)
    }

    #[test]
    fn test_xr_standard_map() {
        let map = ActionMap::xr_standard();
        let right = source(Handedness::Right);
        assert_eq!(map.value("trigger", &right), Some(ActionValue::Float(1.0)));
        assert_eq!(
            map.value("thumbstick", &right),
            Some(ActionValue::Vector2([1.0, 0.0]))
        );
        assert_eq!(
            map.value("touchpad_click", &right),
            Some(ActionValue::Bool(false))
        );
        assert_eq!(map.evaluate(&right).len(), 6);
    }

    #[test]
    fn test_hand_filter() {
        let map = ActionMap {
            name: "game".to_string(),
            bindings: vec![ActionBinding {
                name: "teleport".to_string(),
                source: BindingSource::Button {
                    index: BUTTON_TRIGGER,
                    component: ButtonComponent::Pressed,
                },
                hand: Some(Handedness::Left),
            }],
        };
        assert!(map.value("teleport", &source(Handedness::Right)).is_none());
        let value = map.value("teleport", &source(Handedness::Left)).unwrap();
        assert!(value.is_active());
    }

    #[test]
    fn test_out_of_range_binding_skipped() {
        let map = ActionMap {
            name: "extras".to_string(),
            bindings: vec![ActionBinding {
                name: "menu".to_string(),
                source: BindingSource::Button {
                    index: 9,
                    component: ButtonComponent::Pressed,
                },
                hand: None,
            }],
        };
        assert!(map.evaluate(&source(Handedness::Right)).is_empty());
    }

    #[test]
    fn test_action_map_from_toml() {
        let map: ActionMap = toml::from_str(
            r#"
            name = "game"

            [[bindings]]
            name = "grab"
            hand = "right"
            source = { kind = "button", index = 2 }

            [[bindings]]
            name = "move"
            source = { kind = "stick", x = 2, y = 3 }
            "#,
        )
        .expect("deserialize");
        assert_eq!(map.bindings.len(), 2);
        assert_eq!(
            map.bindings[0].source,
            BindingSource::Button {
                index: 2,
                component: ButtonComponent::Value
            }
        );
        assert_eq!(map.bindings[0].hand, Some(Handedness::Right));
    }
}
