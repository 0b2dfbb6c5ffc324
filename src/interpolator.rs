use ndarray::ArrayView3;

/// How samples outside the volume are resolved.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Boundary {
    /// Replicate the nearest edge voxel.
    Nearest,
    /// Anything outside `[0, extent - 1]` on any axis reads as the constant.
    /// Points within [`EDGE_TOLERANCE`] of an edge still count as inside.
    Constant(f32),
}

/// Slack for rotation round-off that lands a hair past the first or last
/// voxel, e.g. `sin(pi)` evaluating to `1.2e-16` instead of zero.
pub(crate) const EDGE_TOLERANCE: f64 = 1e-6;

pub(crate) struct Interpolator;

impl Interpolator {
    /// Linearly interpolate `volume` at the fractional index `(z, y, x)`.
    #[inline]
    pub(crate) fn trilinear(volume: &ArrayView3<f32>, point: [f64; 3], boundary: Boundary) -> f32 {
        let (depth, height, width) = volume.dim();
        let extents = [depth, height, width];

        let mut point = point;
        match boundary {
            Boundary::Nearest => {
                for (coord, &extent) in point.iter_mut().zip(&extents) {
                    *coord = coord.clamp(0.0, (extent - 1) as f64);
                }
            }
            Boundary::Constant(value) => {
                let outside = point.iter().zip(&extents).any(|(&coord, &extent)| {
                    coord.is_nan() || coord < -EDGE_TOLERANCE || coord > (extent - 1) as f64 + EDGE_TOLERANCE
                });
                if outside {
                    return value;
                }
                for (coord, &extent) in point.iter_mut().zip(&extents) {
                    *coord = coord.clamp(0.0, (extent - 1) as f64);
                }
            }
        }

        let z0 = point[0].floor() as usize;
        let y0 = point[1].floor() as usize;
        let x0 = point[2].floor() as usize;
        let z1 = (z0 + 1).min(depth - 1);
        let y1 = (y0 + 1).min(height - 1);
        let x1 = (x0 + 1).min(width - 1);

        let dz = point[0] - z0 as f64;
        let dy = point[1] - y0 as f64;
        let dx = point[2] - x0 as f64;

        let at = |z: usize, y: usize, x: usize| volume[[z, y, x]] as f64;

        let c00 = lerp_f64(at(z0, y0, x0), at(z0, y0, x1), dx);
        let c01 = lerp_f64(at(z0, y1, x0), at(z0, y1, x1), dx);
        let c10 = lerp_f64(at(z1, y0, x0), at(z1, y0, x1), dx);
        let c11 = lerp_f64(at(z1, y1, x0), at(z1, y1, x1), dx);

        let c0 = lerp_f64(c00, c01, dy);
        let c1 = lerp_f64(c10, c11, dy);

        lerp_f64(c0, c1, dz) as f32
    }
}

#[inline]
fn lerp_f64(a: f64, b: f64, t: f64) -> f64 {
    if t == 0.0 { a } else { a.mul_add(1.0 - t, b * t) }
}
