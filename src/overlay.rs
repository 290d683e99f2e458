//! Parameter panel and the overlay sinks it draws into.

use std::time::Duration;

use cgmath::Matrix4;
use instant::Instant;

use crate::state::ViewerState;

/// Immediate-mode widget sink. Widgets edit their value in place and report
/// whether the user changed it this frame.
pub trait DebugOverlay {
    fn begin(&mut self, title: &str);

    fn text(&mut self, text: &str);

    fn slider_f32(&mut self, label: &str, value: &mut f32, min: f32, max: f32) -> bool;

    fn slider_vec3(&mut self, label: &str, value: &mut [f32; 3], min: f32, max: f32) -> bool;

    fn checkbox(&mut self, label: &str, value: &mut bool) -> bool;

    fn end(&mut self);
}

/// Read-only figures shown below the sliders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub view: Matrix4<f32>,
    pub fps: f32,
}

/// The viewer's tweakable parameters, laid out the same way every frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParameterPanel;

impl ParameterPanel {
    pub const TITLE: &'static str = "Viewer Config";

    pub fn show<O: DebugOverlay + ?Sized>(&self, overlay: &mut O, state: &mut ViewerState, stats: &FrameStats) {
        overlay.begin(Self::TITLE);

        overlay.slider_f32("rotate_angle", &mut state.transform.rotation, -120.0, 120.0);

        let mut displacement: [f32; 3] = state.transform.displacement.into();
        if overlay.slider_vec3("displacement", &mut displacement, -5.0, 5.0) {
            state.transform.displacement = displacement.into();
        }

        overlay.slider_f32("scale", &mut state.transform.scale.x, -2.0, 2.0);

        let mut position: [f32; 3] = state.camera.position.into();
        if overlay.slider_vec3("camera_position", &mut position, -5.0, 5.0) {
            state.camera.position = position.into();
        }

        overlay.checkbox("Enable wire frame", &mut state.wireframe);

        overlay.text(&format!("FOV: {:.6}", state.camera.fov_zoom()));
        overlay.text(&format!("PITCH: {:.6}", state.camera.pitch()));
        overlay.text(&format!("YAW: {:.6}", state.camera.yaw()));
        overlay.text(&look_at_text(&stats.view));
        overlay.text(&format!("Average fps: {:.4}", stats.fps));

        overlay.end();
    }
}

/// The rotation part of the view matrix, one row per line.
pub fn look_at_text(view: &Matrix4<f32>) -> String {
    let row = |r: usize| format!("  {:.3}, {:.3}, {:.3}", view[0][r], view[1][r], view[2][r]);
    format!("lookAt Matrix:\n{}\n{}\n{}", row(0), row(1), row(2))
}

/// Overlay without a GUI: widgets never change values, and the collected text
/// is logged at `debug` level at most once per interval.
#[derive(Debug)]
pub struct LogOverlay {
    interval: Duration,
    last_emit: Option<Instant>,
    lines: Vec<String>,
    summary: String,
}

impl LogOverlay {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emit: None,
            lines: Vec::new(),
            summary: String::new(),
        }
    }

    /// Text of the last completed frame.
    pub fn summary(&self) -> &str {
        &self.summary
    }
}

impl Default for LogOverlay {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl DebugOverlay for LogOverlay {
    fn begin(&mut self, title: &str) {
        self.lines.clear();
        self.lines.push(title.to_string());
    }

    fn text(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }

    fn slider_f32(&mut self, label: &str, value: &mut f32, _min: f32, _max: f32) -> bool {
        self.lines.push(format!("{label}: {value:.3}"));
        false
    }

    fn slider_vec3(&mut self, label: &str, value: &mut [f32; 3], _min: f32, _max: f32) -> bool {
        self.lines
            .push(format!("{label}: {:.3}, {:.3}, {:.3}", value[0], value[1], value[2]));
        false
    }

    fn checkbox(&mut self, label: &str, value: &mut bool) -> bool {
        self.lines.push(format!("{label}: {value}"));
        false
    }

    fn end(&mut self) {
        self.summary = self.lines.join("\n");
        let due = self
            .last_emit
            .is_none_or(|last| last.elapsed() >= self.interval);
        if due {
            log::debug!("{}", self.summary);
            self.last_emit = Some(Instant::now());
        }
    }
}
