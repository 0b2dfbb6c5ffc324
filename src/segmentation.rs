use ndarray::{Array2, ArrayView2};

use crate::config::SegmentationWindow;

/// Binary threshold of a display slice.
///
/// Pixels strictly inside `(level - width / 2, level + width / 2)` become
/// 255, everything else 0.
pub fn segment_slice(slice: &ArrayView2<'_, u8>, window: SegmentationWindow) -> Array2<u8> {
    let half = window.width / 2.0;
    let (low, high) = (window.level - half, window.level + half);
    slice.mapv(|value| {
        let value = value as f32;
        if value > low && value < high { 255 } else { 0 }
    })
}
