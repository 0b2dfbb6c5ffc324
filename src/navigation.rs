use crate::enums::{Orientation, ScrollDirection};

/// Current slice index and extent per orientation.
///
/// Each orientation scrolls on its own; changing one index never moves the
/// other two.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NavigationState {
    indices: [usize; 3],
    extents: [usize; 3],
}

impl NavigationState {
    pub fn new(dim: (usize, usize, usize)) -> Self {
        let mut state = Self::default();
        state.reset(dim);
        state
    }

    /// Adopt the extents of a freshly loaded or replaced volume and park
    /// every orientation at its midpoint.
    pub fn reset(&mut self, dim: (usize, usize, usize)) {
        for orientation in Orientation::ALL {
            let extent = orientation.extent(dim);
            self.extents[orientation.index()] = extent;
            self.indices[orientation.index()] = extent / 2;
        }
    }

    pub fn index(&self, orientation: Orientation) -> usize {
        self.indices[orientation.index()]
    }

    pub fn extent(&self, orientation: Orientation) -> usize {
        self.extents[orientation.index()]
    }

    /// Inclusive bounds `(0, extent - 1)`.
    pub fn bounds(&self, orientation: Orientation) -> (usize, usize) {
        (0, self.extent(orientation).saturating_sub(1))
    }

    /// Clamp and store `index`. Returns whether the stored index changed.
    pub fn set_index(&mut self, orientation: Orientation, index: usize) -> bool {
        let (_, last) = self.bounds(orientation);
        let clamped = index.min(last);
        let slot = &mut self.indices[orientation.index()];
        let changed = *slot != clamped;
        *slot = clamped;
        changed
    }

    /// Move one slice in `direction`, staying inside the bounds.
    ///
    /// Returns the new index, or `None` when already at the bound.
    pub fn step(&mut self, orientation: Orientation, direction: ScrollDirection) -> Option<usize> {
        let current = self.index(orientation);
        let target = current.checked_add_signed(direction.step())?;
        if self.set_index(orientation, target) {
            Some(self.index(orientation))
        } else {
            None
        }
    }

    /// One-line position summary, e.g. `Axial: 5/10 | Sagittal: 1/4 | Coronal: 2/3`.
    pub fn status_line(&self) -> String {
        Orientation::ALL
            .iter()
            .map(|&orientation| {
                format!(
                    "{}: {}/{}",
                    orientation.label(),
                    self.index(orientation) + 1,
                    self.extent(orientation)
                )
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }
}
