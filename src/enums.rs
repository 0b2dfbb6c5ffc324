use serde::{Deserialize, Serialize};

/// The three canonical viewing planes of a volume stored as `(z, y, x)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Axial,
    Sagittal,
    Coronal,
}

/// Per-orientation lookup entry: the array axis the orientation indexes and
/// how its 2D pixel spacing is derived from the volume spacing.
#[derive(Clone, Copy, Debug)]
pub struct OrientationInfo {
    pub orientation: Orientation,
    pub axis: usize,
    pub label: &'static str,
    spacing_pair: fn((f32, f32, f32)) -> (f32, f32),
}

impl OrientationInfo {
    pub fn spacing_pair(&self, spacing: (f32, f32, f32)) -> (f32, f32) {
        (self.spacing_pair)(spacing)
    }
}

const ORIENTATION_TABLE: [OrientationInfo; 3] = [
    OrientationInfo {
        orientation: Orientation::Axial,
        axis: 0,
        label: "Axial",
        spacing_pair: |(sx, sy, _)| (sx, sy),
    },
    OrientationInfo {
        orientation: Orientation::Sagittal,
        axis: 2,
        label: "Sagittal",
        spacing_pair: |(_, sy, sz)| (sy, sz),
    },
    OrientationInfo {
        orientation: Orientation::Coronal,
        axis: 1,
        label: "Coronal",
        spacing_pair: |(sx, _, sz)| (sx, sz),
    },
];

impl Orientation {
    pub const ALL: [Orientation; 3] = [
        Orientation::Axial,
        Orientation::Sagittal,
        Orientation::Coronal,
    ];

    pub fn info(self) -> &'static OrientationInfo {
        match self {
            Orientation::Axial => &ORIENTATION_TABLE[0],
            Orientation::Sagittal => &ORIENTATION_TABLE[1],
            Orientation::Coronal => &ORIENTATION_TABLE[2],
        }
    }

    /// Axis of the `(z, y, x)` array this orientation slices along.
    pub fn axis(self) -> usize {
        self.info().axis
    }

    pub fn label(self) -> &'static str {
        self.info().label
    }

    /// Number of slices along this orientation for a volume of shape `dim`.
    pub fn extent(self, dim: (usize, usize, usize)) -> usize {
        match self.axis() {
            0 => dim.0,
            1 => dim.1,
            _ => dim.2,
        }
    }

    /// Pixel spacing `(horizontal, vertical)` of a reslice, in millimeters.
    pub fn spacing_pair(self, spacing: (f32, f32, f32)) -> (f32, f32) {
        self.info().spacing_pair(spacing)
    }

    pub fn index(self) -> usize {
        match self {
            Orientation::Axial => 0,
            Orientation::Sagittal => 1,
            Orientation::Coronal => 2,
        }
    }
}

#[derive(Default, Clone, Copy, Debug)]
pub enum SortBy {
    #[default]
    ImagePositionPatient,
    InstanceNumber,
    None,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollDirection {
    /// Wheel forward; moves to the next slice.
    Forward,
    /// Wheel backward; moves to the previous slice.
    Backward,
}

impl ScrollDirection {
    pub fn step(self) -> isize {
        match self {
            ScrollDirection::Forward => 1,
            ScrollDirection::Backward => -1,
        }
    }
}
