#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};

use cbct_viewer::histogram::Histogram;
use cbct_viewer::measurement::Point3;
use cbct_viewer::volume_loader::DicomMetadata;
use cbct_viewer::{Measurement, Orientation, Pick, RenderService, UiShell, Viewer, ViewerConfig};
use ndarray::{Array3, ArrayView2};

#[derive(Clone, Debug, PartialEq)]
pub enum RenderCall {
    Slice {
        view: Orientation,
        shape: (usize, usize),
        spacing: (f32, f32),
        reset_camera: bool,
        pixels: Vec<u8>,
    },
    Scene3d,
    Preview {
        view: Orientation,
        from: Point3,
        to: Point3,
    },
    RemovePreview(Orientation),
    Measurement(Orientation, Measurement),
}

/// Render service that records every call and answers picks from a queue.
#[derive(Debug, Default)]
pub struct RecordingRender {
    pub calls: Vec<RenderCall>,
    pub picks: VecDeque<Pick>,
}

impl RecordingRender {
    pub fn slices(&self) -> Vec<&RenderCall> {
        self.calls
            .iter()
            .filter(|call| matches!(call, RenderCall::Slice { .. }))
            .collect()
    }
}

impl RenderService for RecordingRender {
    fn render_slice_2d(
        &mut self,
        view: Orientation,
        pixels: ArrayView2<'_, u8>,
        spacing: (f32, f32),
        reset_camera: bool,
    ) {
        self.calls.push(RenderCall::Slice {
            view,
            shape: pixels.dim(),
            spacing,
            reset_camera,
            pixels: pixels.iter().copied().collect(),
        });
    }

    fn render_full_scene_3d(&mut self) {
        self.calls.push(RenderCall::Scene3d);
    }

    fn pick(&mut self, _view: Orientation, _screen_x: f64, _screen_y: f64) -> Pick {
        self.picks.pop_front().unwrap_or(Pick::Miss)
    }

    fn draw_preview_line(&mut self, view: Orientation, from: Point3, to: Point3) {
        self.calls.push(RenderCall::Preview { view, from, to });
    }

    fn remove_preview_line(&mut self, view: Orientation) {
        self.calls.push(RenderCall::RemovePreview(view));
    }

    fn draw_measurement(&mut self, view: Orientation, measurement: &Measurement) {
        self.calls.push(RenderCall::Measurement(view, *measurement));
    }
}

#[derive(Debug, Default)]
pub struct RecordingUi {
    pub slider_maximum: HashMap<Orientation, usize>,
    pub slider_values: Vec<(Orientation, usize)>,
    pub statuses: Vec<String>,
    pub histograms: Vec<Histogram>,
    pub metadata_rows: Vec<(String, String)>,
    pub messages: Vec<String>,
}

impl UiShell for RecordingUi {
    fn set_slider_maximum(&mut self, view: Orientation, maximum: usize) {
        self.slider_maximum.insert(view, maximum);
    }

    fn set_slider_value(&mut self, view: Orientation, value: usize) {
        self.slider_values.push((view, value));
    }

    fn show_status(&mut self, text: &str) {
        self.statuses.push(text.to_string());
    }

    fn show_histogram(&mut self, histogram: &Histogram) {
        self.histograms.push(histogram.clone());
    }

    fn show_metadata(&mut self, rows: &[(String, String)]) {
        self.metadata_rows = rows.to_vec();
    }

    fn show_message(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

pub type TestViewer = Viewer<RecordingRender, RecordingUi>;

/// Volume whose intensity increases with the linear voxel index.
pub fn ramp(dim: (usize, usize, usize)) -> Array3<f32> {
    let (_, height, width) = dim;
    Array3::from_shape_fn(dim, |(z, y, x)| ((z * height + y) * width + x) as f32)
}

pub fn loaded_viewer(dim: (usize, usize, usize)) -> TestViewer {
    let mut viewer = Viewer::new(
        ViewerConfig::default(),
        RecordingRender::default(),
        RecordingUi::default(),
    );
    viewer
        .on_volume_loaded(ramp(dim), (0.5, 0.5, 1.0), DicomMetadata::default())
        .expect("ramp volume should load");
    viewer.render_mut().calls.clear();
    viewer.ui_mut().slider_values.clear();
    viewer.ui_mut().statuses.clear();
    viewer.ui_mut().histograms.clear();
    viewer
}
