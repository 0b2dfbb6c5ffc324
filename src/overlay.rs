use ndarray::{Array3, Zip};
use tracing::{info, warn};

use crate::config::ViewerConfig;
use crate::error::{Result, ViewerError};
use crate::transformer::Transformer;
use crate::volume_store::display_volume;

/// Placement of the secondary volume relative to the primary.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OverlayState {
    /// `(dx, dy, dz)` in voxels.
    pub translation: (f64, f64, f64),
    /// Rotation in degrees within the overlay rotation plane.
    pub rotation_angle: f64,
    pub visible: bool,
}

/// Blends a second, manually aligned volume onto the primary display volume.
#[derive(Debug)]
pub struct OverlayCompositor {
    secondary: Option<Array3<f32>>,
    state: OverlayState,
    blend: f32,
    rotation_axes: (usize, usize),
    percentiles: (f32, f32),
}

impl OverlayCompositor {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            secondary: None,
            state: OverlayState::default(),
            blend: config.overlay_blend,
            rotation_axes: config.overlay_rotation_axes,
            percentiles: (config.lower_percentile, config.upper_percentile),
        }
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn has_secondary(&self) -> bool {
        self.secondary.is_some()
    }

    /// Store the secondary raw volume and reset its placement.
    ///
    /// # Errors
    ///
    /// [`ViewerError::ShapeMismatch`] if `secondary` does not have the
    /// primary's shape; any previously stored overlay is kept.
    pub fn load_secondary(&mut self, primary_dim: (usize, usize, usize), secondary: Array3<f32>) -> Result<()> {
        if secondary.dim() != primary_dim {
            warn!(expected = ?primary_dim, actual = ?secondary.dim(), "overlay shape mismatch");
            return Err(ViewerError::ShapeMismatch {
                expected: primary_dim,
                actual: secondary.dim(),
            });
        }
        info!(shape = ?primary_dim, "overlay volume loaded");
        self.secondary = Some(secondary);
        self.state = OverlayState::default();
        Ok(())
    }

    pub fn set_params(&mut self, translation: (f64, f64, f64), rotation_angle: f64) {
        self.state.translation = translation;
        self.state.rotation_angle = rotation_angle;
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.state.visible = visible;
    }

    /// Blend the stored secondary volume, placed per the current state.
    pub fn compose(&self, primary_display: &Array3<u8>) -> Result<Array3<u8>> {
        let secondary = self.secondary.as_ref().ok_or(ViewerError::NoOverlayVolume)?;
        compose(
            primary_display,
            secondary,
            self.state.translation,
            self.state.rotation_angle,
            self.rotation_axes,
            self.blend,
            self.percentiles,
        )
    }
}

/// Normalize `secondary_raw` for display, translate then rotate it, and add
/// `blend` times it onto `primary_display`, saturating at 255.
///
/// Recomputed from the raw secondary on every call; nothing is cached.
pub fn compose(
    primary_display: &Array3<u8>,
    secondary_raw: &Array3<f32>,
    translation: (f64, f64, f64),
    rotation_angle: f64,
    rotation_axes: (usize, usize),
    blend: f32,
    percentiles: (f32, f32),
) -> Result<Array3<u8>> {
    if secondary_raw.dim() != primary_display.dim() {
        return Err(ViewerError::ShapeMismatch {
            expected: primary_display.dim(),
            actual: secondary_raw.dim(),
        });
    }
    let secondary = match display_volume(secondary_raw, percentiles.0, percentiles.1) {
        Ok(display) => display.mapv(f32::from),
        Err(_) => Array3::zeros(secondary_raw.dim()),
    };
    let (dx, dy, dz) = translation;
    let secondary = Transformer::translate(secondary.view(), dx, dy, dz);
    let secondary = Transformer::rotate(secondary.view(), rotation_angle, rotation_axes);

    Ok(Zip::from(primary_display)
        .and(&secondary)
        .par_map_collect(|&primary, &secondary| {
            (primary as f32 + blend * secondary).clamp(0.0, 255.0) as u8
        }))
}
