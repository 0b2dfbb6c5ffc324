use ndarray::{Array3, ArrayView2, Zip};
use tracing::{debug, info, warn};
use web_time::Instant;

use crate::enums::Orientation;
use crate::error::{Result, ViewerError};
use crate::reslice::Reslicer;
use crate::volume::Volume;

/// Owns the active raw volume and its display derivative.
///
/// The display volume is always recomputed from the raw volume as a whole
/// whenever the latter changes, so both share one shape at all times.
#[derive(Debug)]
pub struct VolumeStore {
    volume: Option<Volume>,
    display: Array3<u8>,
    lower_percentile: f32,
    upper_percentile: f32,
}

impl Default for VolumeStore {
    fn default() -> Self {
        Self::new(1.0, 99.0)
    }
}

impl VolumeStore {
    pub fn new(lower_percentile: f32, upper_percentile: f32) -> Self {
        Self {
            volume: None,
            display: Array3::zeros((0, 0, 0)),
            lower_percentile,
            upper_percentile,
        }
    }

    /// Replace the raw volume and spacing, then rebuild the display volume.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::EmptyVolume`] if `data` has no samples; the
    /// store keeps its previous state in that case. A volume with a single
    /// intensity is accepted and displayed as all zeros.
    pub fn load(&mut self, data: Array3<f32>, spacing: (f32, f32, f32)) -> Result<()> {
        if data.is_empty() {
            return Err(ViewerError::EmptyVolume);
        }
        let start = Instant::now();
        self.display = self.display_for(&data);
        info!(
            shape = ?data.dim(),
            ?spacing,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "volume loaded"
        );
        self.volume = Some(Volume::new(data, spacing));
        Ok(())
    }

    /// Swap in a transformed raw volume of the same shape, keeping spacing.
    pub fn replace(&mut self, data: Array3<f32>) -> Result<()> {
        let expected = self
            .volume
            .as_ref()
            .ok_or(ViewerError::NoVolumeLoaded)?
            .dim();
        if data.dim() != expected {
            return Err(ViewerError::ShapeMismatch {
                expected,
                actual: data.dim(),
            });
        }
        let start = Instant::now();
        self.display = self.display_for(&data);
        if let Some(volume) = self.volume.as_mut() {
            volume.data = data;
        }
        debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "volume replaced"
        );
        Ok(())
    }

    fn display_for(&self, data: &Array3<f32>) -> Array3<u8> {
        display_volume(data, self.lower_percentile, self.upper_percentile).unwrap_or_else(|_| {
            warn!("volume is uniform; display set to zero");
            Array3::zeros(data.dim())
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.volume.is_some()
    }

    pub fn volume(&self) -> Option<&Volume> {
        self.volume.as_ref()
    }

    pub fn display(&self) -> &Array3<u8> {
        &self.display
    }

    pub fn spacing(&self) -> (f32, f32, f32) {
        self.volume
            .as_ref()
            .map_or((1.0, 1.0, 1.0), |volume| volume.spacing)
    }

    pub fn dim(&self) -> (usize, usize, usize) {
        self.display.dim()
    }

    /// Inclusive index range along `orientation`.
    pub fn bounds(&self, orientation: Orientation) -> (usize, usize) {
        (0, orientation.extent(self.dim()).saturating_sub(1))
    }

    pub fn display_slice(&self, orientation: Orientation, index: Option<usize>) -> ArrayView2<'_, u8> {
        Reslicer::extract(self.display.view(), orientation, index)
    }

    pub fn percentiles(&self) -> (f32, f32) {
        (self.lower_percentile, self.upper_percentile)
    }
}

/// Contrast-stretch `data` to 8 bits.
///
/// Samples are clipped to the `[lower, upper]` percentile range, min-max
/// scaled onto `[0, 255]` and truncated to `u8`.
///
/// # Errors
///
/// Returns [`ViewerError::EmptyVolume`] when `data` is empty or the clip
/// range collapses to a single value.
pub fn display_volume(data: &Array3<f32>, lower: f32, upper: f32) -> Result<Array3<u8>> {
    if data.is_empty() {
        return Err(ViewerError::EmptyVolume);
    }
    let mut samples: Vec<f32> = data.iter().copied().collect();
    let low = percentile(&mut samples, lower);
    let high = percentile(&mut samples, upper);
    let range = high - low;
    if range.is_nan() || range <= 0.0 {
        return Err(ViewerError::EmptyVolume);
    }
    Ok(Zip::from(data).par_map_collect(|&value| {
        let clipped = (value as f64).clamp(low, high);
        ((clipped - low) / range * 255.0) as u8
    }))
}

/// Percentile of `samples`, interpolating linearly between the two
/// nearest ranks.
///
/// Only the two ranks are selected, in linear time; `samples` is left
/// partially reordered.
pub fn percentile(samples: &mut [f32], percent: f32) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let rank = (percent.clamp(0.0, 100.0) as f64 / 100.0) * (samples.len() - 1) as f64;
    let below = rank.floor() as usize;
    let fraction = rank - below as f64;
    let (_, &mut low, above) = samples.select_nth_unstable_by(below, f32::total_cmp);
    let low = low as f64;
    if fraction == 0.0 {
        return low;
    }
    // Everything past the selected rank is no smaller, so the next rank is
    // the minimum of that tail.
    let Some(high) = above.iter().copied().min_by(f32::total_cmp) else {
        return low;
    };
    low + (high as f64 - low) * fraction
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_interpolates_between_ranks() {
        let mut samples = [30.0, 0.0, 40.0, 10.0, 20.0];
        assert_eq!(percentile(&mut samples, 0.0), 0.0);
        assert_eq!(percentile(&mut samples, 50.0), 20.0);
        assert_eq!(percentile(&mut samples, 100.0), 40.0);
        assert!((percentile(&mut samples, 12.5) - 5.0).abs() < 1e-9);
        assert!((percentile(&mut samples, 99.0) - 39.6).abs() < 1e-9);
    }

    #[test]
    fn percentile_matches_a_full_sort() {
        let data: Vec<f32> = (0..257).map(|i| ((i * 7919) % 257) as f32 * 0.5 - 40.0).collect();
        let mut sorted = data.clone();
        sorted.sort_by(f32::total_cmp);
        for percent in [1.0, 25.0, 62.5, 99.0] {
            let rank = percent as f64 / 100.0 * 256.0;
            let (below, above) = (rank.floor() as usize, rank.ceil() as usize);
            let expected = sorted[below] as f64 + (sorted[above] - sorted[below]) as f64 * (rank - below as f64);
            let mut samples = data.clone();
            assert!((percentile(&mut samples, percent) - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn empty_samples_have_zero_percentile() {
        assert_eq!(percentile(&mut [], 50.0), 0.0);
    }

    #[test]
    fn uniform_volume_has_no_display_range() {
        let data = Array3::from_elem((2, 2, 2), 7.0);
        assert!(matches!(
            display_volume(&data, 1.0, 99.0),
            Err(ViewerError::EmptyVolume)
        ));
    }
}
