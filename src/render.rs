//! Seams to the presentation layer.
//!
//! The engine never owns widgets or a rendering backend. It talks to them
//! through these traits and only ever hands out read-only 2D snapshots of
//! the display volume.

use ndarray::ArrayView2;

use crate::enums::Orientation;
use crate::histogram::Histogram;
use crate::measurement::{Measurement, Point3};

/// Result of resolving a screen position to a world position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Pick {
    Hit(Point3),
    /// Nothing under the cursor, e.g. outside the rendered slice.
    Miss,
}

pub trait RenderService {
    /// Replace whatever `view` shows with `pixels`, scaled by `spacing`.
    ///
    /// A full redraw drops every overlay previously drawn on the view.
    fn render_slice_2d(
        &mut self,
        view: Orientation,
        pixels: ArrayView2<'_, u8>,
        spacing: (f32, f32),
        reset_camera: bool,
    );

    fn render_full_scene_3d(&mut self);

    fn pick(&mut self, view: Orientation, screen_x: f64, screen_y: f64) -> Pick;

    /// Draw or replace the single transient preview line of `view`.
    fn draw_preview_line(&mut self, view: Orientation, from: Point3, to: Point3);

    fn remove_preview_line(&mut self, view: Orientation);

    /// Draw a persistent measurement line with its distance label.
    fn draw_measurement(&mut self, view: Orientation, measurement: &Measurement);
}

/// Widgets around the views: sliders, status bar, histogram and info panels.
pub trait UiShell {
    fn set_slider_maximum(&mut self, view: Orientation, maximum: usize);

    /// Programmatic slider update. Implementations block the slider's change
    /// signal while doing so; the engine already knows the new value.
    fn set_slider_value(&mut self, view: Orientation, value: usize);

    fn show_status(&mut self, text: &str);

    fn show_histogram(&mut self, histogram: &Histogram);

    fn show_metadata(&mut self, rows: &[(String, String)]);

    /// Surface a user-facing error message.
    fn show_message(&mut self, message: &str);
}
