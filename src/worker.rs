//! Off-thread matrix rotation.
//!
//! The worker owns a copy of the raw volume and only hands back a finished
//! array; applying it to the store stays with the interaction thread.

use futures::channel::oneshot;
use nalgebra::Matrix3;
use ndarray::Array3;
use tracing::debug;
use web_time::Instant;

use crate::error::{Result, ViewerError};
use crate::transformer::Transformer;

pub struct RotationWorker;

impl RotationWorker {
    /// Start resampling `volume` through `matrix` about its center on the
    /// rayon pool.
    pub fn spawn(volume: Array3<f32>, matrix: Matrix3<f64>) -> RotationJob {
        let (sender, receiver) = oneshot::channel();
        rayon::spawn(move || {
            let start = Instant::now();
            let rotated = Transformer::apply_rotation_matrix(volume.view(), &matrix, None);
            debug!(
                elapsed_ms = start.elapsed().as_millis() as u64,
                "background rotation finished"
            );
            // The receiver may have been dropped; the result is then unused.
            let _ = sender.send(rotated);
        });
        RotationJob { receiver }
    }
}

/// Pending result of a [`RotationWorker`].
pub struct RotationJob {
    receiver: oneshot::Receiver<Array3<f32>>,
}

impl RotationJob {
    /// Wait for the rotated volume.
    pub async fn result(self) -> Result<Array3<f32>> {
        self.receiver.await.map_err(|_| ViewerError::WorkerCancelled)
    }

    /// Non-blocking check for an event loop: `Ok(None)` while still running.
    pub fn try_result(&mut self) -> Result<Option<Array3<f32>>> {
        self.receiver
            .try_recv()
            .map_err(|_| ViewerError::WorkerCancelled)
    }
}
