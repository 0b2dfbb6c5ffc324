//! # CBCT viewer engine
//!
//! This crate is the interactive core of a viewer for volumetric (CBCT)
//! images. It keeps a 3D intensity volume together with a contrast
//! stretched 8-bit display copy and slices it along the three medical
//! axes:
//!  - Axial
//!  - Sagittal
//!  - Coronal
//!
//! Each axis has its own independently scrolling view. On top of that the
//! engine can translate and rotate the whole volume, blend a second,
//! manually aligned volume onto the first, threshold the visible slices
//! and run a click-move-click distance measurement per view.
//!
//! Rendering and widgets stay outside the crate: the engine drives them
//! through the [`RenderService`] and [`UiShell`] traits and never hands out
//! more than a read-only 2D slice. DICOM series are read with
//! [`VolumeLoader`], which builds on the dicom-rs ecosystem.
//!
//! # Examples
//!
//! ## Slicing a loaded series
//!
//! Read the first series in the dicom/ directory and save the axial slice
//! at the center of the volume.
//!
//! ```no_run
//! # use cbct_viewer::{Orientation, Reslicer, SortBy, VolumeLoader, VolumeStore};
//! let series = VolumeLoader::load_series("dicom", SortBy::ImagePositionPatient)
//!     .expect("should have loaded a series from the directory");
//! let mut store = VolumeStore::default();
//! store
//!     .load(series.volume.data, series.volume.spacing)
//!     .expect("series should not be empty");
//! let slice = store.display_slice(Orientation::Axial, None);
//! let image = Reslicer::slice_to_image(&slice).expect("should have built an image");
//! image.save("axial.png").expect("should have written the image");
//! ```
//!
//! [`RenderService`]: render::RenderService
//! [`UiShell`]: render::UiShell

pub mod config;
pub mod enums;
pub mod error;
pub mod histogram;
pub mod interaction;
mod interpolator;
pub mod measurement;
pub mod navigation;
pub mod overlay;
pub mod render;
pub mod reslice;
pub mod segmentation;
pub mod transformer;
pub mod viewer;
pub mod volume;
pub mod volume_loader;
pub mod volume_store;
pub mod worker;

pub use config::{SegmentationWindow, ViewerConfig};
pub use enums::{Orientation, PointerButton, ScrollDirection, SortBy};
pub use error::{Result, ViewerError};
pub use interaction::{Interaction, PointerEvent, ViewInteractionHandler};
pub use measurement::{Measurement, MeasurementState, MeasurementStateMachine};
pub use navigation::NavigationState;
pub use overlay::{OverlayCompositor, OverlayState};
pub use render::{Pick, RenderService, UiShell};
pub use reslice::Reslicer;
pub use transformer::{EulerOrder, Transformer};
pub use viewer::Viewer;
pub use volume::Volume;
pub use volume_loader::{DicomMetadata, LoadedSeries, VolumeLoader, VolumeLoaderError};
pub use volume_store::VolumeStore;
