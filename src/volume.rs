use ndarray::{Array3, ArrayView2};

use crate::enums::Orientation;
use crate::reslice::Reslicer;

/// Raw intensity volume in source units, stored as `(z, y, x)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Volume {
    pub data: Array3<f32>,
    /// Physical spacing `(sx, sy, sz)` in millimeters per voxel.
    pub spacing: (f32, f32, f32),
}

impl Volume {
    pub fn new(data: Array3<f32>, spacing: (f32, f32, f32)) -> Self {
        Self { data, spacing }
    }

    /// Get the dimensions of the volume (depth, height, width)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Reslice the raw intensities along `orientation`; out-of-range indices
    /// are clamped.
    pub fn slice(&self, orientation: Orientation, index: Option<usize>) -> ArrayView2<'_, f32> {
        Reslicer::extract(self.data.view(), orientation, index)
    }
}
