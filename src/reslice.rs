use image::{ImageBuffer, Luma};
use ndarray::{ArrayView2, ArrayView3, Axis};
use rayon::prelude::*;

use crate::enums::Orientation;

pub type SliceImage = ImageBuffer<Luma<u8>, Vec<u8>>;

pub struct Reslicer;

impl Reslicer {
    /// Extract the 2D cross-section of `volume` at `index` along `orientation`.
    ///
    /// The returned view borrows the volume; nothing is copied. Indices past
    /// the last slice are clamped to it, and `None` selects the midpoint
    /// `extent / 2`. The volume must not have a zero-length axis.
    ///
    /// Result shapes for a `(z, y, x)` volume:
    ///  - Axial: `(y, x)`
    ///  - Sagittal: `(z, y)`
    ///  - Coronal: `(z, x)`
    pub fn extract<'a, A>(
        volume: ArrayView3<'a, A>,
        orientation: Orientation,
        index: Option<usize>,
    ) -> ArrayView2<'a, A> {
        let extent = orientation.extent(volume.dim());
        let index = Self::resolve_index(extent, index);
        volume.index_axis_move(Axis(orientation.axis()), index)
    }

    /// Clamp `index` into `[0, extent - 1]`, defaulting to the midpoint.
    pub fn resolve_index(extent: usize, index: Option<usize>) -> usize {
        let last = extent.saturating_sub(1);
        match index {
            Some(index) => index.min(last),
            None => extent / 2,
        }
    }

    /// Convert a display slice to a grayscale image snapshot, row-major.
    pub fn slice_to_image(slice: &ArrayView2<'_, u8>) -> Option<SliceImage> {
        let (height, width) = slice.dim();
        let pixel_data: Vec<u8> = slice.into_par_iter().map(|&v| v).collect();
        ImageBuffer::from_raw(width as u32, height as u32, pixel_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn resolve_index_defaults_to_midpoint() {
        assert_eq!(Reslicer::resolve_index(9, None), 4);
        assert_eq!(Reslicer::resolve_index(10, None), 5);
        assert_eq!(Reslicer::resolve_index(10, Some(42)), 9);
    }

    #[test]
    fn sagittal_slice_reads_last_axis() {
        let volume = Array3::from_shape_fn((2, 3, 4), |(z, y, x)| (z * 100 + y * 10 + x) as u16);
        let slice = Reslicer::extract(volume.view(), Orientation::Sagittal, Some(3));
        assert_eq!(slice.dim(), (2, 3));
        assert_eq!(slice[[1, 2]], 123);
    }

    #[test]
    fn slice_image_keeps_row_major_layout() {
        let volume = Array3::from_shape_fn((2, 2, 3), |(z, _, x)| (z * 3 + x) as u8);
        let slice = Reslicer::extract(volume.view(), Orientation::Coronal, Some(0));
        let image = Reslicer::slice_to_image(&slice).expect("buffer sized from slice");
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(2, 1).0[0], 5);
    }
}
