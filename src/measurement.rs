//! Two-point distance measurement on a 2D view.
//!
//! A [`MeasurementStateMachine`] lives per view and consumes pick results
//! (already resolved from screen coordinates) rather than raw pointer
//! positions. It never draws anything itself; each transition returns the
//! [`MeasurementEffect`]s the caller forwards to the render service.

use tracing::{debug, info};

use crate::render::Pick;

pub type Point3 = [f64; 3];

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MeasurementState {
    /// Measurement mode is off for this view.
    Idle,
    /// Mode on, waiting for the first point.
    ArmedNoPoint,
    /// First point captured, waiting for the second.
    ArmedPending(Point3),
}

/// A committed two-point measurement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    pub start: Point3,
    pub end: Point3,
    /// In-plane distance between `start` and `end` in display units (mm).
    pub distance: f64,
}

impl Measurement {
    /// Both points lie in the same reslice plane, so only the first two
    /// display coordinates contribute to the distance.
    pub fn new(start: Point3, end: Point3) -> Self {
        let dx = start[0] - end[0];
        let dy = start[1] - end[1];
        Self {
            start,
            end,
            distance: dx.hypot(dy),
        }
    }

    pub fn label(&self) -> String {
        format!("{:.2} mm", self.distance)
    }

    /// Label anchor: the segment midpoint.
    pub fn midpoint(&self) -> Point3 {
        [
            (self.start[0] + self.end[0]) / 2.0,
            (self.start[1] + self.end[1]) / 2.0,
            (self.start[2] + self.end[2]) / 2.0,
        ]
    }
}

/// Drawing requests produced by a transition.
#[derive(Clone, Debug, PartialEq)]
pub enum MeasurementEffect {
    /// Replace the transient preview line with one from `from` to `to`.
    Preview { from: Point3, to: Point3 },
    /// Remove the transient preview line.
    ClearPreview,
    /// Draw a persistent line and distance label.
    Commit(Measurement),
}

#[derive(Debug)]
pub struct MeasurementStateMachine {
    state: MeasurementState,
    preview_visible: bool,
    committed: Vec<Measurement>,
}

impl Default for MeasurementStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementStateMachine {
    pub fn new() -> Self {
        Self {
            state: MeasurementState::Idle,
            preview_visible: false,
            committed: Vec::new(),
        }
    }

    pub fn state(&self) -> MeasurementState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        !matches!(self.state, MeasurementState::Idle)
    }

    pub fn pending_point(&self) -> Option<Point3> {
        match self.state {
            MeasurementState::ArmedPending(point) => Some(point),
            _ => None,
        }
    }

    /// Measurements committed since the view was last redrawn.
    pub fn committed(&self) -> &[Measurement] {
        &self.committed
    }

    /// The view was redrawn from scratch, which took every line with it.
    /// Committed measurements, the pending point and the preview are
    /// forgotten; an armed machine stays armed.
    pub fn view_redrawn(&mut self) {
        self.committed.clear();
        self.preview_visible = false;
        if self.is_armed() {
            self.state = MeasurementState::ArmedNoPoint;
        }
    }

    pub fn arm(&mut self) {
        if !self.is_armed() {
            self.state = MeasurementState::ArmedNoPoint;
        }
    }

    pub fn disarm(&mut self) -> Vec<MeasurementEffect> {
        let effects = self.take_preview();
        self.state = MeasurementState::Idle;
        effects
    }

    pub fn primary_click(&mut self, pick: Pick) -> Vec<MeasurementEffect> {
        let Pick::Hit(point) = pick else {
            if self.is_armed() {
                debug!("measurement click missed the volume; ignored");
            }
            return Vec::new();
        };
        match self.state {
            MeasurementState::Idle => Vec::new(),
            MeasurementState::ArmedNoPoint => {
                self.state = MeasurementState::ArmedPending(point);
                Vec::new()
            }
            MeasurementState::ArmedPending(start) => {
                let measurement = Measurement::new(start, point);
                info!(distance = measurement.distance, "measurement committed");
                self.committed.push(measurement);
                self.state = MeasurementState::ArmedNoPoint;
                let mut effects = vec![MeasurementEffect::Commit(measurement)];
                effects.extend(self.take_preview());
                effects
            }
        }
    }

    pub fn pointer_move(&mut self, pick: Pick) -> Vec<MeasurementEffect> {
        match (self.state, pick) {
            (MeasurementState::ArmedPending(start), Pick::Hit(point)) => {
                self.preview_visible = true;
                vec![MeasurementEffect::Preview {
                    from: start,
                    to: point,
                }]
            }
            _ => Vec::new(),
        }
    }

    /// Drop the pending first point without committing.
    pub fn secondary_click(&mut self) -> Vec<MeasurementEffect> {
        if !self.is_armed() {
            return Vec::new();
        }
        self.state = MeasurementState::ArmedNoPoint;
        self.take_preview()
    }

    fn take_preview(&mut self) -> Vec<MeasurementEffect> {
        if std::mem::take(&mut self.preview_visible) {
            vec![MeasurementEffect::ClearPreview]
        } else {
            Vec::new()
        }
    }
}
