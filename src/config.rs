use serde::{Deserialize, Serialize};

use crate::transformer::EulerOrder;

/// Intensity window used by threshold segmentation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentationWindow {
    pub width: f32,
    pub level: f32,
}

impl Default for SegmentationWindow {
    fn default() -> Self {
        Self {
            width: 60.0,
            level: 230.0,
        }
    }
}

/// Tunables of the viewer engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Lower clip percentile of the display normalization.
    pub lower_percentile: f32,
    /// Upper clip percentile of the display normalization.
    pub upper_percentile: f32,
    /// Weight of the secondary volume when blending an overlay.
    pub overlay_blend: f32,
    /// Plane the in-plane rotation of the primary volume acts in.
    pub rotation_axes: (usize, usize),
    /// Plane the overlay rotation acts in.
    pub overlay_rotation_axes: (usize, usize),
    /// Composition order used by the matrix rotation path.
    pub euler_order: EulerOrder,
    pub histogram_bins: usize,
    /// Window applied when segmentation is requested from the toolbar.
    pub segmentation_window: SegmentationWindow,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            lower_percentile: 1.0,
            upper_percentile: 99.0,
            overlay_blend: 0.5,
            rotation_axes: (1, 2),
            overlay_rotation_axes: (1, 2),
            euler_order: EulerOrder::Zxy,
            histogram_bins: 100,
            segmentation_window: SegmentationWindow {
                width: 100.0,
                level: 200.0,
            },
        }
    }
}
