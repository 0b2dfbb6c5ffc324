use crate::{enums::SortBy, volume::Volume};

use dicom::{
    core::Tag,
    object::{FileDicomObject, InMemDicomObject, open_file},
    pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder, VoiLutOption},
};
use dicom_dictionary_std::tags;
use ndarray::{Array2, Array3, s};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum VolumeLoaderError {
    #[error("No DICOM series found in {0}")]
    SeriesNotFound(PathBuf),

    #[error("No valid DICOM images found")]
    NoValidImages,

    #[error("Inconsistent image dimensions")]
    InconsistentDimensions,

    #[error("Missing spacing information")]
    MissingSpacing,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("DICOM error: {0}")]
    Dicom(#[from] dicom::object::ReadError),
}

const BASIC_TAGS: [(Tag, &str); 8] = [
    (tags::MODALITY, "Modality"),
    (tags::STUDY_DATE, "Study Date"),
    (tags::STUDY_DESCRIPTION, "Study Description"),
    (tags::STUDY_INSTANCE_UID, "Study UID"),
    (tags::ROWS, "Rows"),
    (tags::COLUMNS, "Columns"),
    (tags::PIXEL_SPACING, "Pixel Spacing"),
    (tags::BITS_ALLOCATED, "Bits Allocated"),
];

const MAX_DISPLAY_VALUE_CHARS: usize = 100;

/// Descriptive tags of the first slice of a series.
///
/// Patient name and ID are never part of the basic block.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DicomMetadata {
    /// `(label, value)` for the fixed basic tag set; missing tags read "(none)".
    pub basic: Vec<(String, String)>,
    /// Every string-convertible tag, keyed `gggg|eeee`.
    pub all_tags: BTreeMap<String, String>,
}

impl DicomMetadata {
    fn from_object(dicom_object: &FileDicomObject<InMemDicomObject>) -> Self {
        let basic = BASIC_TAGS
            .iter()
            .map(|&(tag, label)| {
                let value = dicom_object
                    .element(tag)
                    .ok()
                    .and_then(|element| element.to_str().ok())
                    .map(|value| value.trim().to_string())
                    .unwrap_or_else(|| "(none)".to_string());
                (label.to_string(), value)
            })
            .collect();

        let all_tags = dicom_object
            .iter()
            .filter(|element| element.header().tag != tags::PIXEL_DATA)
            .filter_map(|element| {
                let value = element.to_str().ok()?;
                Some((tag_key(element.header().tag), value.trim().to_string()))
            })
            .collect();

        Self { basic, all_tags }
    }

    /// Rows for an info table: the basic block, then all remaining tags with
    /// long values shortened.
    pub fn display_rows(&self) -> Vec<(String, String)> {
        let shown: Vec<String> = BASIC_TAGS.iter().map(|&(tag, _)| tag_key(tag)).collect();
        let mut rows = vec![("[Basic]".to_string(), String::new())];
        rows.extend(self.basic.iter().cloned());
        rows.push(("[Tags]".to_string(), String::new()));
        rows.extend(
            self.all_tags
                .iter()
                .filter(|(key, _)| !shown.contains(key))
                .map(|(key, value)| (key.clone(), shorten(value))),
        );
        rows
    }
}

fn tag_key(tag: Tag) -> String {
    format!("{:04X}|{:04X}", tag.group(), tag.element())
}

fn shorten(value: &str) -> String {
    if value.chars().count() < MAX_DISPLAY_VALUE_CHARS {
        value.to_string()
    } else {
        let head: String = value.chars().take(MAX_DISPLAY_VALUE_CHARS).collect();
        format!("{head}...")
    }
}

/// A decoded series ready for the viewer.
#[derive(Debug)]
pub struct LoadedSeries {
    pub volume: Volume,
    pub metadata: DicomMetadata,
}

pub struct VolumeLoader;

impl VolumeLoader {
    /// Load the first series found in a directory of .dcm files.
    ///
    /// Files are grouped by Series Instance UID and the lexicographically
    /// first series is loaded.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeLoaderError::SeriesNotFound`] if the directory holds no
    /// readable DICOM series.
    pub fn load_series(path: impl AsRef<Path>, sort_by: SortBy) -> Result<LoadedSeries, VolumeLoaderError> {
        let path = path.as_ref();
        let paths = Self::dicom_paths(path)?;
        let mut series: BTreeMap<String, Vec<FileDicomObject<InMemDicomObject>>> = BTreeMap::new();
        for file in &paths {
            match open_file(file) {
                Ok(object) => {
                    let uid = object
                        .element(tags::SERIES_INSTANCE_UID)
                        .ok()
                        .and_then(|element| element.to_str().ok())
                        .map(|uid| uid.trim().to_string())
                        .unwrap_or_default();
                    series.entry(uid).or_default().push(object);
                }
                Err(error) => debug!(file = %file.display(), %error, "skipping unreadable file"),
            }
        }

        let Some((uid, objects)) = series.into_iter().next() else {
            return Err(VolumeLoaderError::SeriesNotFound(path.to_path_buf()));
        };
        info!(series = %uid, slices = objects.len(), "loading DICOM series");

        let volume = Self::load_from_dicom_objects(&objects, sort_by)?;
        let metadata = DicomMetadata::from_object(&objects[0]);
        Ok(LoadedSeries { volume, metadata })
    }

    /// Load a volume from DICOM objects
    ///
    /// # Arguments
    ///
    /// * `dicom_objects` - Slice of DICOM file objects
    /// * `sort_by` - Method to sort the slices
    ///
    /// # Errors
    ///
    /// Returns error if no valid images found or dimensions are inconsistent
    pub fn load_from_dicom_objects(
        dicom_objects: &[FileDicomObject<InMemDicomObject>],
        sort_by: SortBy,
    ) -> Result<Volume, VolumeLoaderError> {
        let mut images_with_order: Vec<_> = dicom_objects
            .iter()
            .filter_map(|dicom_object| Self::extract_image_with_order(dicom_object, &sort_by))
            .collect();

        if images_with_order.is_empty() {
            return Err(VolumeLoaderError::NoValidImages);
        }

        if !matches!(sort_by, SortBy::None) {
            images_with_order.sort_by(|a, b| a.0.total_cmp(&b.0));
        }

        let slice_gap = match (images_with_order.first(), images_with_order.get(1)) {
            (Some(first), Some(second)) if matches!(sort_by, SortBy::ImagePositionPatient) => {
                Some((second.0 - first.0).abs()).filter(|gap| *gap > 0.0)
            }
            _ => None,
        };

        let images: Vec<_> = images_with_order
            .into_iter()
            .map(|(_, image)| image)
            .collect();

        Self::validate_dimensions(&images)?;

        let volume_array = Self::build_volume_array(&images);
        let spacing = Self::get_spacing(dicom_objects, slice_gap).ok_or(VolumeLoaderError::MissingSpacing)?;

        Ok(Volume::new(volume_array, spacing))
    }

    fn dicom_paths(path: &Path) -> Result<Vec<PathBuf>, VolumeLoaderError> {
        if !path.is_dir() {
            return Err(VolumeLoaderError::SeriesNotFound(path.to_path_buf()));
        }
        let mut paths: Vec<_> = fs::read_dir(path)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|s| s.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("dcm"))
            })
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(VolumeLoaderError::SeriesNotFound(path.to_path_buf()));
        }
        Ok(paths)
    }

    fn extract_image_with_order(
        dicom_object: &FileDicomObject<InMemDicomObject>,
        sort_by: &SortBy,
    ) -> Option<(f32, Array2<f32>)> {
        let order = Self::get_sort_order(dicom_object, sort_by)?;
        let image_2d = Self::decode_image(dicom_object)?;
        Some((order, image_2d))
    }

    fn get_sort_order(dicom_object: &FileDicomObject<InMemDicomObject>, sort_by: &SortBy) -> Option<f32> {
        match sort_by {
            SortBy::ImagePositionPatient => {
                let pos = dicom_object
                    .element(tags::IMAGE_POSITION_PATIENT)
                    .ok()?
                    .to_multi_float32()
                    .ok()?;
                pos.get(2).copied()
            }
            SortBy::InstanceNumber => dicom_object
                .element(tags::INSTANCE_NUMBER)
                .ok()?
                .to_int::<i32>()
                .ok()
                .map(|n| n as f32),
            SortBy::None => Some(0.0),
        }
    }

    /// Decode the first frame with the modality LUT applied, so samples are
    /// in source units.
    fn decode_image(dicom_object: &FileDicomObject<InMemDicomObject>) -> Option<Array2<f32>> {
        let pixel_data = dicom_object.decode_pixel_data().ok()?;
        let options = ConvertOptions::new()
            .with_modality_lut(ModalityLutOption::Default)
            .with_voi_lut(VoiLutOption::Identity);
        pixel_data
            .to_ndarray_with_options::<f32>(&options)
            .ok()
            .map(|arr| arr.slice_move(s![0, .., .., 0]))
    }

    fn validate_dimensions(images: &[Array2<f32>]) -> Result<(), VolumeLoaderError> {
        let first_dim = images[0].dim();
        if images.iter().any(|img| img.dim() != first_dim) {
            return Err(VolumeLoaderError::InconsistentDimensions);
        }
        Ok(())
    }

    fn build_volume_array(images: &[Array2<f32>]) -> Array3<f32> {
        let (height, width) = images[0].dim();
        let depth = images.len();
        let mut volume = Array3::<f32>::zeros((depth, height, width));

        for (i, image) in images.iter().enumerate() {
            volume.slice_mut(s![i, .., ..]).assign(image);
        }

        volume
    }

    /// `(sx, sy, sz)`: Pixel Spacing is stored as (row, column), i.e. (y, x).
    /// The slice step prefers the measured gap between slice positions over
    /// the nominal Slice Thickness.
    fn get_spacing(
        dicom_objects: &[FileDicomObject<InMemDicomObject>],
        slice_gap: Option<f32>,
    ) -> Option<(f32, f32, f32)> {
        dicom_objects.iter().find_map(|dicom_object| {
            let pixel_spacing = dicom_object
                .element(tags::PIXEL_SPACING)
                .ok()?
                .to_multi_float32()
                .ok()?;
            let (row, column) = (*pixel_spacing.first()?, *pixel_spacing.get(1)?);

            let slice_step = match slice_gap {
                Some(gap) => gap,
                None => dicom_object
                    .element(tags::SLICE_THICKNESS)
                    .ok()?
                    .to_float32()
                    .ok()?,
            };

            Some((column, row, slice_step))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_values_are_shortened_for_display() {
        let long = "x".repeat(150);
        let shortened = shorten(&long);
        assert_eq!(shortened.len(), MAX_DISPLAY_VALUE_CHARS + 3);
        assert!(shortened.ends_with("..."));
        assert_eq!(shorten("CT"), "CT");
    }

    #[test]
    fn display_rows_skip_tags_already_in_basic_block() {
        let mut metadata = DicomMetadata {
            basic: vec![("Modality".to_string(), "CT".to_string())],
            all_tags: BTreeMap::new(),
        };
        metadata.all_tags.insert(tag_key(tags::MODALITY), "CT".to_string());
        metadata.all_tags.insert("0008|0070".to_string(), "Vendor".to_string());

        let rows = metadata.display_rows();
        assert_eq!(rows[0].0, "[Basic]");
        assert_eq!(rows[1], ("Modality".to_string(), "CT".to_string()));
        assert_eq!(rows[2].0, "[Tags]");
        assert_eq!(rows[3], ("0008|0070".to_string(), "Vendor".to_string()));
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn missing_directory_is_series_not_found() {
        let result = VolumeLoader::load_series("/nonexistent/cbct/series", SortBy::default());
        assert!(matches!(result, Err(VolumeLoaderError::SeriesNotFound(_))));
    }
}
