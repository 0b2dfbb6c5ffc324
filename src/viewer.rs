//! The interactive engine tying the volume, its three reslice views and
//! the pointer handlers together.
//!
//! All entry points run synchronously on the caller's thread. Transforms
//! block until the whole volume is resampled; [`Viewer::spawn_rotation`] is
//! the one exception and still leaves applying its result to this thread.

use std::path::Path;

use ndarray::{Array3, ArrayView2};
use tracing::{debug, info, warn};
use web_time::Instant;

use crate::config::{SegmentationWindow, ViewerConfig};
use crate::enums::{Orientation, SortBy};
use crate::error::{Result, ViewerError};
use crate::histogram::{Histogram, HistogramSource};
use crate::interaction::{Interaction, InteractionContext, PointerEvent, ViewHandler, ViewInteractionHandler};
use crate::measurement::MeasurementStateMachine;
use crate::navigation::NavigationState;
use crate::overlay::{OverlayCompositor, OverlayState};
use crate::render::{RenderService, UiShell};
use crate::reslice::Reslicer;
use crate::segmentation::segment_slice;
use crate::transformer::Transformer;
use crate::volume_loader::{DicomMetadata, VolumeLoader};
use crate::volume_store::VolumeStore;
use crate::worker::{RotationJob, RotationWorker};

pub struct Viewer<R: RenderService, U: UiShell> {
    config: ViewerConfig,
    store: VolumeStore,
    navigation: NavigationState,
    handlers: [ViewHandler; 3],
    overlay: OverlayCompositor,
    /// Primary plus overlay, shown instead of the display volume while the
    /// overlay is visible.
    blended: Option<Array3<u8>>,
    metadata: DicomMetadata,
    measuring: bool,
    histogram_source: HistogramSource,
    render: R,
    ui: U,
}

impl<R: RenderService, U: UiShell> Viewer<R, U> {
    pub fn new(config: ViewerConfig, render: R, ui: U) -> Self {
        Self {
            store: VolumeStore::new(config.lower_percentile, config.upper_percentile),
            navigation: NavigationState::default(),
            handlers: Default::default(),
            overlay: OverlayCompositor::new(&config),
            blended: None,
            metadata: DicomMetadata::default(),
            measuring: false,
            histogram_source: HistogramSource::default(),
            config,
            render,
            ui,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn store(&self) -> &VolumeStore {
        &self.store
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    pub fn metadata(&self) -> &DicomMetadata {
        &self.metadata
    }

    pub fn overlay_state(&self) -> OverlayState {
        self.overlay.state()
    }

    pub fn is_measuring(&self) -> bool {
        self.measuring
    }

    /// Measurement state of `view`, if measurement mode is on.
    pub fn measurement(&self, view: Orientation) -> Option<&MeasurementStateMachine> {
        self.handlers[view.index()].measurement()
    }

    /// The volume the views currently slice: the overlay blend while it is
    /// visible, the primary display volume otherwise.
    pub fn displayed(&self) -> &Array3<u8> {
        self.blended.as_ref().unwrap_or(self.store.display())
    }

    pub fn displayed_slice(&self, view: Orientation) -> ArrayView2<'_, u8> {
        Reslicer::extract(self.displayed().view(), view, Some(self.navigation.index(view)))
    }

    pub fn render(&self) -> &R {
        &self.render
    }

    pub fn render_mut(&mut self) -> &mut R {
        &mut self.render
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut U {
        &mut self.ui
    }

    /// Load a DICOM series from `path` and show it.
    ///
    /// On failure the user is told and the previous volume stays active.
    pub fn load_series(&mut self, path: impl AsRef<Path>, sort_by: SortBy) -> Result<()> {
        match VolumeLoader::load_series(path, sort_by) {
            Ok(series) => {
                let (data, spacing) = (series.volume.data, series.volume.spacing);
                self.on_volume_loaded(data, spacing, series.metadata)
            }
            Err(error) => {
                warn!(%error, "failed to load DICOM series");
                self.ui.show_message(&format!("Failed to load DICOM series: {error}"));
                Err(error.into())
            }
        }
    }

    pub fn on_volume_loaded(
        &mut self,
        data: Array3<f32>,
        spacing: (f32, f32, f32),
        metadata: DicomMetadata,
    ) -> Result<()> {
        if let Err(error) = self.store.load(data, spacing) {
            self.ui.show_message(&format!("Cannot display volume: {error}"));
            return Err(error);
        }
        self.blended = None;
        self.overlay.set_visible(false);
        self.metadata = metadata;
        self.ui.show_metadata(&self.metadata.display_rows());
        self.after_volume_change();
        self.render.render_full_scene_3d();
        Ok(())
    }

    /// Slider input for `view`.
    pub fn on_index_changed(&mut self, view: Orientation, index: usize) {
        if !self.store.is_loaded() {
            return;
        }
        self.navigation.set_index(view, index);
        self.render_view(view, false);
        self.refresh_status(Some(view));
    }

    /// Route pointer input on `view` to its active handler.
    pub fn on_pointer_event(&mut self, view: Orientation, event: PointerEvent) -> Interaction {
        if !self.store.is_loaded() {
            return Interaction::Ignored;
        }
        let mut context = InteractionContext {
            navigation: &mut self.navigation,
            render: &mut self.render,
        };
        let outcome = self.handlers[view.index()].handle(view, event, &mut context);
        if let Interaction::SliceChanged(index) = outcome {
            self.render_view(view, false);
            self.ui.set_slider_value(view, index);
            self.refresh_status(Some(view));
        }
        outcome
    }

    pub fn on_translate_requested(&mut self, dx: f64, dy: f64, dz: f64) -> Result<()> {
        info!(dx, dy, dz, "translate requested");
        let volume = self.store.volume().ok_or(ViewerError::NoVolumeLoaded)?;
        let start = Instant::now();
        let translated = Transformer::translate(volume.data.view(), dx, dy, dz);
        debug!(elapsed_ms = start.elapsed().as_millis() as u64, "translation done");
        self.apply_transformed(translated)
    }

    /// In-plane rotation of the primary volume in the configured plane.
    pub fn on_rotate_requested(&mut self, angle_degrees: f64) -> Result<()> {
        info!(angle_degrees, "rotate requested");
        let volume = self.store.volume().ok_or(ViewerError::NoVolumeLoaded)?;
        let start = Instant::now();
        let rotated = Transformer::rotate(volume.data.view(), angle_degrees, self.config.rotation_axes);
        debug!(elapsed_ms = start.elapsed().as_millis() as u64, "rotation done");
        self.apply_transformed(rotated)
    }

    /// Full 3D rotation through Euler angles, resampled on this thread.
    pub fn on_euler_rotate_requested(&mut self, angles_degrees: [f64; 3]) -> Result<()> {
        info!(?angles_degrees, order = %self.config.euler_order, "euler rotation requested");
        let volume = self.store.volume().ok_or(ViewerError::NoVolumeLoaded)?;
        let matrix = self.config.euler_order.matrix(angles_degrees);
        let rotated = Transformer::apply_rotation_matrix(volume.data.view(), &matrix, None);
        self.apply_transformed(rotated)
    }

    /// Start the Euler rotation on a worker. Hand the job's result to
    /// [`Viewer::apply_rotation_result`] once it arrives.
    pub fn spawn_rotation(&self, angles_degrees: [f64; 3]) -> Result<RotationJob> {
        let volume = self.store.volume().ok_or(ViewerError::NoVolumeLoaded)?;
        let matrix = self.config.euler_order.matrix(angles_degrees);
        info!(?angles_degrees, "background rotation started");
        Ok(RotationWorker::spawn(volume.data.clone(), matrix))
    }

    pub fn apply_rotation_result(&mut self, rotated: Array3<f32>) -> Result<()> {
        self.apply_transformed(rotated)
    }

    pub fn on_measurement_mode_toggled(&mut self, enabled: bool) {
        if !self.store.is_loaded() {
            return;
        }
        info!(enabled, "measurement mode toggled");
        self.measuring = enabled;
        for view in Orientation::ALL {
            self.handlers[view.index()].set_measuring(enabled, view, &mut self.render);
        }
    }

    /// Load a second volume and show it blended onto the primary.
    ///
    /// A shape mismatch is reported to the user and leaves the primary view
    /// untouched.
    pub fn on_overlay_requested(&mut self, secondary: Array3<f32>) -> Result<()> {
        if !self.store.is_loaded() {
            self.ui.show_message("Load a primary volume before adding an overlay");
            return Err(ViewerError::NoVolumeLoaded);
        }
        if let Err(error) = self.overlay.load_secondary(self.store.dim(), secondary) {
            self.ui.show_message(&format!("Cannot overlay volumes: {error}"));
            return Err(error);
        }
        self.show_overlay()
    }

    pub fn on_overlay_params_changed(&mut self, translation: (f64, f64, f64), rotation_angle: f64) -> Result<()> {
        self.overlay.set_params(translation, rotation_angle);
        if self.overlay.state().visible {
            self.show_overlay()?;
        }
        Ok(())
    }

    pub fn on_overlay_removed(&mut self) {
        self.overlay.set_visible(false);
        if self.blended.take().is_some() {
            self.refresh_all(true);
        }
    }

    /// Redraw every view from the displayed volume at its midpoints.
    pub fn on_reset_view(&mut self) {
        if !self.store.is_loaded() {
            return;
        }
        self.navigation.reset(self.store.dim());
        self.refresh_all(true);
    }

    /// Threshold the current slice of every view with the configured window.
    pub fn on_segment_requested(&mut self) {
        self.segment_with(self.config.segmentation_window);
    }

    pub fn segment_with(&mut self, window: SegmentationWindow) {
        if !self.store.is_loaded() {
            self.ui.show_message("Load a volume before segmenting");
            return;
        }
        for view in Orientation::ALL {
            let mask = segment_slice(&self.displayed_slice(view), window);
            self.render.render_slice_2d(view, mask.view(), (1.0, 1.0), false);
            self.handlers[view.index()].on_redraw();
        }
    }

    pub fn set_histogram_source(&mut self, source: HistogramSource) {
        self.histogram_source = source;
        if self.store.is_loaded() {
            self.refresh_histogram();
        }
    }

    /// Histogram of the raw intensities, in source units, for the selected
    /// source.
    pub fn histogram(&self) -> Histogram {
        let title = self.histogram_source.title();
        let bins = self.config.histogram_bins;
        let Some(volume) = self.store.volume() else {
            return Histogram::compute(title, std::iter::empty(), bins);
        };
        match self.histogram_source {
            HistogramSource::Slice(view) => {
                let slice = volume.slice(view, Some(self.navigation.index(view)));
                Histogram::compute(title, slice.iter().copied(), bins)
            }
            HistogramSource::Volume => Histogram::compute(title, volume.data.iter().copied(), bins),
        }
    }

    fn apply_transformed(&mut self, data: Array3<f32>) -> Result<()> {
        self.store.replace(data)?;
        self.blended = None;
        self.overlay.set_visible(false);
        self.after_volume_change();
        Ok(())
    }

    fn show_overlay(&mut self) -> Result<()> {
        let blended = self.overlay.compose(self.store.display())?;
        self.blended = Some(blended);
        self.overlay.set_visible(true);
        info!(state = ?self.overlay.state(), "overlay composed");
        self.refresh_all(true);
        Ok(())
    }

    fn after_volume_change(&mut self) {
        self.navigation.reset(self.store.dim());
        self.refresh_all(true);
    }

    fn refresh_all(&mut self, reset_camera: bool) {
        for view in Orientation::ALL {
            let (_, last) = self.navigation.bounds(view);
            self.ui.set_slider_maximum(view, last);
            self.ui.set_slider_value(view, self.navigation.index(view));
            self.render_view(view, reset_camera);
        }
        self.refresh_status(None);
    }

    fn render_view(&mut self, view: Orientation, reset_camera: bool) {
        let spacing = view.spacing_pair(self.store.spacing());
        let index = self.navigation.index(view);
        let displayed = self.blended.as_ref().unwrap_or(self.store.display());
        let slice = Reslicer::extract(displayed.view(), view, Some(index));
        self.render.render_slice_2d(view, slice, spacing, reset_camera);
        self.handlers[view.index()].on_redraw();
    }

    /// Status line plus histogram; `changed` names the view that moved, if
    /// only one did.
    fn refresh_status(&mut self, changed: Option<Orientation>) {
        self.ui.show_status(&self.navigation.status_line());
        match (self.histogram_source, changed) {
            (HistogramSource::Slice(source), Some(view)) if source != view => {}
            _ => self.refresh_histogram(),
        }
    }

    fn refresh_histogram(&mut self) {
        let histogram = self.histogram();
        self.ui.show_histogram(&histogram);
    }
}
