//! Polled control schemes folded into one per-frame [`InputSnapshot`].

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::error::SetupError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlType {
    Keyboard,
    Gamepad,
    Mobile,
}

/// A named set of abstract axis/button identifiers.
///
/// Mobile schemes ignore the names; their values come from [`MobileInput`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlScheme {
    pub name: String,
    pub control_type: ControlType,
    #[serde(default)]
    pub move_h: String,
    #[serde(default)]
    pub move_v: String,
    #[serde(default)]
    pub camera_h: String,
    #[serde(default)]
    pub camera_v: String,
    #[serde(default)]
    pub jump: String,
    #[serde(default)]
    pub camera_reset: String,
    /// Zoom axis. Only keyboard-style schemes usually bind one.
    #[serde(default)]
    pub scroll: Option<String>,
}

impl ControlScheme {
    pub fn keyboard() -> Self {
        Self {
            name: "Keyboard".into(),
            control_type: ControlType::Keyboard,
            move_h: "Horizontal".into(),
            move_v: "Vertical".into(),
            camera_h: "Mouse X".into(),
            camera_v: "Mouse Y".into(),
            jump: "Jump".into(),
            camera_reset: "Camera Reset".into(),
            scroll: Some("Mouse ScrollWheel".into()),
        }
    }

    pub fn gamepad() -> Self {
        Self {
            name: "Gamepad".into(),
            control_type: ControlType::Gamepad,
            move_h: "Pad Horizontal".into(),
            move_v: "Pad Vertical".into(),
            camera_h: "Pad Camera X".into(),
            camera_v: "Pad Camera Y".into(),
            jump: "Pad Jump".into(),
            camera_reset: "Pad Camera Reset".into(),
            scroll: None,
        }
    }

    pub fn mobile() -> Self {
        Self {
            name: "Mobile".into(),
            control_type: ControlType::Mobile,
            move_h: String::new(),
            move_v: String::new(),
            camera_h: String::new(),
            camera_v: String::new(),
            jump: String::new(),
            camera_reset: String::new(),
            scroll: None,
        }
    }

    fn detect(&self, source: &impl AxisSource, mobile: &MobileInput) -> bool {
        if self.control_type == ControlType::Mobile {
            return mobile.joystick.norm_squared() > 0.0;
        }

        source.axis(&self.move_v) != 0.0
            || source.axis(&self.move_h) != 0.0
            || source.button_down(&self.jump)
            || source.axis(&self.camera_reset) != 0.0
            || self
                .scroll
                .as_deref()
                .is_some_and(|scroll| source.axis(scroll) != 0.0)
    }
}

/// Generic polled axis layer (keyboard, mouse, gamepad).
pub trait AxisSource {
    fn axis(&self, name: &str) -> f32;
    /// True only on the frame the button went down.
    fn button_down(&self, name: &str) -> bool;
}

/// Values a touch UI supplies directly for mobile schemes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MobileInput {
    pub joystick: Vector2<f32>,
    /// Per-frame deltas of the active touches, in touch order.
    pub touch_deltas: Vec<Vector2<f32>>,
    pub jump_pressed: bool,
}

/// Minimum touch delta that counts as a camera drag.
const TOUCH_DRAG_THRESHOLD: f32 = 0.05;

impl MobileInput {
    /// Camera deltas from touches: the first touch drives the camera when the joystick is
    /// idle, otherwise the second touch does.
    fn camera_delta(&self) -> Vector2<f32> {
        let Some(first) = self.touch_deltas.first() else {
            return Vector2::zeros();
        };
        if first.norm() <= TOUCH_DRAG_THRESHOLD {
            return Vector2::zeros();
        }
        if self.joystick.norm_squared() == 0.0 {
            *first
        } else {
            self.touch_deltas.get(1).copied().unwrap_or_else(Vector2::zeros)
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    pub invert_camera_v: bool,
    pub invert_camera_h: bool,
    /// Keep the active scheme even when another one sees input.
    pub lock_control_scheme: bool,
}

/// One frame of normalized input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputSnapshot {
    pub move_h: f32,
    pub move_v: f32,
    pub camera_h: f32,
    pub camera_v: f32,
    pub jump_pressed: bool,
    pub camera_reset: f32,
    pub scroll: f32,
    pub control_type: ControlType,
}

impl InputSnapshot {
    pub fn idle(control_type: ControlType) -> Self {
        Self {
            move_h: 0.0,
            move_v: 0.0,
            camera_h: 0.0,
            camera_v: 0.0,
            jump_pressed: false,
            camera_reset: 0.0,
            scroll: 0.0,
            control_type,
        }
    }
}

pub struct InputAggregator {
    schemes: Vec<ControlScheme>,
    active: usize,
    settings: InputSettings,
    mobile: MobileInput,
    current: InputSnapshot,
}

impl InputAggregator {
    /// Starts on the first scheme. An empty list is a setup error.
    pub fn new(schemes: Vec<ControlScheme>, settings: InputSettings) -> Result<Self, SetupError> {
        let first = schemes.first().ok_or(SetupError::NoControlSchemes)?;
        let current = InputSnapshot::idle(first.control_type);
        Ok(Self {
            schemes,
            active: 0,
            settings,
            mobile: MobileInput::default(),
            current,
        })
    }

    /// Appends a scheme and makes it active (a touch UI registering itself).
    pub fn add_scheme(&mut self, scheme: ControlScheme) {
        log::info!("input: added control scheme `{}`", scheme.name);
        self.schemes.push(scheme);
        self.active = self.schemes.len() - 1;
        self.current.control_type = self.active_scheme().control_type;
    }

    pub fn set_mobile(&mut self, mobile: MobileInput) {
        self.mobile = mobile;
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.settings.lock_control_scheme = locked;
    }

    pub fn active_scheme(&self) -> &ControlScheme {
        &self.schemes[self.active]
    }

    pub fn snapshot(&self) -> &InputSnapshot {
        &self.current
    }

    /// Polls the active scheme. Returns the new scheme's name when it auto-switched.
    pub fn update(&mut self, source: &impl AxisSource) -> Option<String> {
        let switched = if self.settings.lock_control_scheme {
            None
        } else {
            self.detect_switch(source)
        };

        let scheme = &self.schemes[self.active];
        self.current = match scheme.control_type {
            ControlType::Mobile => {
                let camera = self.mobile.camera_delta();
                InputSnapshot {
                    move_h: self.mobile.joystick.x,
                    move_v: self.mobile.joystick.y,
                    camera_h: camera.x,
                    camera_v: camera.y,
                    jump_pressed: self.mobile.jump_pressed,
                    ..InputSnapshot::idle(ControlType::Mobile)
                }
            }
            control_type => {
                let invert = |value: f32, inverted: bool| if inverted { -value } else { value };
                InputSnapshot {
                    move_h: source.axis(&scheme.move_h),
                    move_v: source.axis(&scheme.move_v),
                    camera_h: invert(
                        source.axis(&scheme.camera_h),
                        self.settings.invert_camera_h,
                    ),
                    camera_v: invert(
                        source.axis(&scheme.camera_v),
                        self.settings.invert_camera_v,
                    ),
                    jump_pressed: source.button_down(&scheme.jump),
                    camera_reset: source.axis(&scheme.camera_reset),
                    scroll: scheme.scroll.as_deref().map_or(0.0, |s| source.axis(s)),
                    control_type,
                }
            }
        };
        switched
    }

    fn detect_switch(&mut self, source: &impl AxisSource) -> Option<String> {
        let found = self
            .schemes
            .iter()
            .enumerate()
            .find(|(i, scheme)| *i != self.active && scheme.detect(source, &self.mobile))
            .map(|(i, _)| i)?;
        self.active = found;
        let name = self.schemes[found].name.clone();
        log::info!("input: switched control scheme to `{name}`");
        Some(name)
    }
}
