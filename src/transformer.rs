//! Whole-volume spatial transforms.
//!
//! Two rotation paths exist: [`Transformer::rotate`] spins every slice of a
//! plane about the plane center, which is cheap and enough for reslice
//! inspection, while [`Transformer::apply_rotation_matrix`] resamples the
//! full volume through an arbitrary 3x3 rotation.

use std::fmt;
use std::str::FromStr;

use nalgebra::{Matrix3, Rotation3, Vector3};
use ndarray::{Array3, ArrayView3, Zip};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ViewerError};
use crate::interpolator::{Boundary, Interpolator};

/// Application order of the three elementary rotations.
///
/// For `Zxy` and angles `(a, b, c)` the matrix is `Rz(a) * Rx(b) * Ry(c)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EulerOrder {
    Zxy,
    Zyx,
    Xyz,
}

impl FromStr for EulerOrder {
    type Err = ViewerError;

    fn from_str(order: &str) -> Result<Self> {
        match order {
            "zxy" => Ok(EulerOrder::Zxy),
            "zyx" => Ok(EulerOrder::Zyx),
            "xyz" => Ok(EulerOrder::Xyz),
            other => Err(ViewerError::UnsupportedOrder(other.to_string())),
        }
    }
}

impl fmt::Display for EulerOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = match self {
            EulerOrder::Zxy => "zxy",
            EulerOrder::Zyx => "zyx",
            EulerOrder::Xyz => "xyz",
        };
        f.write_str(order)
    }
}

impl EulerOrder {
    pub fn matrix(self, angles_degrees: [f64; 3]) -> Matrix3<f64> {
        let [a, b, c] = angles_degrees.map(f64::to_radians);
        let rx = |angle: f64| Rotation3::from_axis_angle(&Vector3::x_axis(), angle).into_inner();
        let ry = |angle: f64| Rotation3::from_axis_angle(&Vector3::y_axis(), angle).into_inner();
        let rz = |angle: f64| Rotation3::from_axis_angle(&Vector3::z_axis(), angle).into_inner();
        match self {
            EulerOrder::Zxy => rz(a) * rx(b) * ry(c),
            EulerOrder::Zyx => rz(a) * ry(b) * rx(c),
            EulerOrder::Xyz => rx(a) * ry(b) * rz(c),
        }
    }
}

pub struct Transformer;

impl Transformer {
    /// Shift the volume by `dx`, `dy`, `dz` voxels.
    ///
    /// Storage order is `(z, y, x)`, so `dz` moves along the first axis and
    /// `dx` along the last. Edges are extended with the nearest voxel and
    /// fractional offsets are linearly interpolated. Interpolation is
    /// first order, not cubic spline, so fractional offsets and angles give
    /// different values than a spline resampler would; integer offsets are
    /// exact.
    pub fn translate(volume: ArrayView3<f32>, dx: f64, dy: f64, dz: f64) -> Array3<f32> {
        debug!(dx, dy, dz, "translating volume");
        if dx == 0.0 && dy == 0.0 && dz == 0.0 {
            return volume.to_owned();
        }
        let mut output = Array3::zeros(volume.dim());
        Zip::indexed(&mut output).par_for_each(|(z, y, x), value| {
            let source = [z as f64 - dz, y as f64 - dy, x as f64 - dx];
            *value = Interpolator::trilinear(&volume, source, Boundary::Nearest);
        });
        output
    }

    /// Rotate every slice of the `axes` plane by `angle_degrees` about the
    /// plane center.
    ///
    /// The output keeps the input extents, so corners may be clipped, and
    /// samples from outside the input take the nearest edge value. Sampling
    /// is linear, as in [`Transformer::translate`]. An
    /// `axes` pair that does not name two distinct axes leaves the volume
    /// unchanged.
    pub fn rotate(volume: ArrayView3<f32>, angle_degrees: f64, axes: (usize, usize)) -> Array3<f32> {
        debug!(angle_degrees, ?axes, "rotating volume in plane");
        let (first, second) = axes;
        if angle_degrees % 360.0 == 0.0 || first == second || first > 2 || second > 2 {
            return volume.to_owned();
        }

        let (depth, height, width) = volume.dim();
        let extents = [depth, height, width];
        let center_a = (extents[first] as f64 - 1.0) / 2.0;
        let center_b = (extents[second] as f64 - 1.0) / 2.0;
        let (sin, cos) = angle_degrees.to_radians().sin_cos();

        let mut output = Array3::zeros(volume.dim());
        Zip::indexed(&mut output).par_for_each(|(z, y, x), value| {
            let mut source = [z as f64, y as f64, x as f64];
            let a = source[first] - center_a;
            let b = source[second] - center_b;
            source[first] = cos * a + sin * b + center_a;
            source[second] = -sin * a + cos * b + center_b;
            *value = Interpolator::trilinear(&volume, source, Boundary::Nearest);
        });
        output
    }

    /// Compose three elementary rotations, angles in degrees.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::UnsupportedOrder`] for any order other than
    /// `"zxy"`, `"zyx"` or `"xyz"`.
    pub fn euler_to_rotation_matrix(angles_degrees: [f64; 3], order: &str) -> Result<Matrix3<f64>> {
        let order: EulerOrder = order.parse()?;
        Ok(order.matrix(angles_degrees))
    }

    /// Resample the whole volume through `matrix` about `center`.
    ///
    /// The output voxel `o` reads the input at `matrix * o + offset` with
    /// `offset = center - matrix * center`, so `center` stays fixed. Reads
    /// use linear interpolation and fall back to zero outside the input.
    /// `center` defaults to `shape / 2` in voxel indices.
    pub fn apply_rotation_matrix(
        volume: ArrayView3<f32>,
        matrix: &Matrix3<f64>,
        center: Option<[f64; 3]>,
    ) -> Array3<f32> {
        let (depth, height, width) = volume.dim();
        let center = center.unwrap_or([
            (depth / 2) as f64,
            (height / 2) as f64,
            (width / 2) as f64,
        ]);
        let center = Vector3::from(center);
        let offset = center - matrix * center;
        debug!(?center, "resampling volume through rotation matrix");

        let mut output = Array3::zeros(volume.dim());
        Zip::indexed(&mut output).par_for_each(|(z, y, x), value| {
            let source = matrix * Vector3::new(z as f64, y as f64, x as f64) + offset;
            *value = Interpolator::trilinear(
                &volume,
                [source[0], source[1], source[2]],
                Boundary::Constant(0.0),
            );
        });
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euler_orders_parse_and_print() {
        for order in ["zxy", "zyx", "xyz"] {
            let parsed: EulerOrder = order.parse().expect("supported order");
            assert_eq!(parsed.to_string(), order);
        }
        assert!(matches!(
            "yxz".parse::<EulerOrder>(),
            Err(ViewerError::UnsupportedOrder(order)) if order == "yxz"
        ));
    }
}
