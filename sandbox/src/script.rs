//! Scripted input: a fixed timeline standing in for a player at the keyboard and then a
//! gamepad.

use std::collections::HashMap;

use kit::AxisSource;

/// One step of the timeline, active from `start` (seconds) until the next step begins.
struct Step {
    start: f32,
    axes: &'static [(&'static str, f32)],
    /// Buttons pressed on the first frame of the step.
    press: &'static [&'static str],
}

const TIMELINE: &[Step] = &[
    Step {
        start: 0.0,
        axes: &[],
        press: &[],
    },
    Step {
        start: 1.0,
        axes: &[("Vertical", 1.0)],
        press: &[],
    },
    Step {
        start: 2.0,
        axes: &[("Vertical", 1.0), ("Horizontal", 1.0)],
        press: &["Jump"],
    },
    Step {
        start: 2.3,
        axes: &[("Vertical", 1.0)],
        press: &["Jump"],
    },
    Step {
        start: 4.0,
        axes: &[("Mouse ScrollWheel", 0.5), ("Mouse X", 0.4)],
        press: &[],
    },
    Step {
        start: 5.0,
        axes: &[("Camera Reset", 1.0)],
        press: &[],
    },
    Step {
        start: 6.0,
        axes: &[("Pad Horizontal", -0.6), ("Pad Vertical", 0.8)],
        press: &[],
    },
    Step {
        start: 8.0,
        axes: &[("Pad Vertical", 1.0)],
        press: &["Pad Jump"],
    },
    Step {
        start: 9.0,
        axes: &[],
        press: &[],
    },
];

/// Polled axes for the current frame.
#[derive(Default)]
pub struct ScriptedInput {
    axes: HashMap<&'static str, f32>,
    pressed: Vec<&'static str>,
    step: Option<usize>,
}

impl ScriptedInput {
    /// Moves the script to `time`. Buttons only read as pressed on the frame their step starts.
    pub fn advance(&mut self, time: f32) {
        let current = TIMELINE.iter().rposition(|step| step.start <= time);
        self.pressed.clear();
        if current == self.step {
            return;
        }
        self.step = current;
        self.axes.clear();
        if let Some(step) = current.map(|i| &TIMELINE[i]) {
            self.axes.extend(step.axes.iter().copied());
            self.pressed.extend(step.press.iter().copied());
        }
    }
}

impl AxisSource for ScriptedInput {
    fn axis(&self, name: &str) -> f32 {
        self.axes.get(name).copied().unwrap_or(0.0)
    }

    fn button_down(&self, name: &str) -> bool {
        self.pressed.iter().any(|pressed| *pressed == name)
    }
}
