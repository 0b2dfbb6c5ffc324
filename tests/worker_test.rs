mod common;

use cbct_viewer::transformer::EulerOrder;
use cbct_viewer::worker::RotationWorker;
use cbct_viewer::{Transformer, ViewerError};
use common::{loaded_viewer, ramp};

#[tokio::test]
async fn worker_matches_synchronous_rotation() {
    let volume = ramp((5, 6, 7));
    let matrix = EulerOrder::Zxy.matrix([30.0, 0.0, 15.0]);
    let expected = Transformer::apply_rotation_matrix(volume.view(), &matrix, None);

    let rotated = RotationWorker::spawn(volume, matrix).result().await.expect("worker finishes");
    assert_eq!(rotated, expected);
}

#[tokio::test]
async fn zero_angles_come_back_unchanged() {
    let mut viewer = loaded_viewer((4, 5, 6));
    let raw = viewer.store().volume().expect("loaded").data.clone();
    let display = viewer.store().display().clone();

    let job = viewer.spawn_rotation([0.0, 0.0, 0.0]).expect("volume loaded");
    let rotated = job.result().await.expect("worker finishes");
    assert_eq!(rotated, raw);

    viewer.apply_rotation_result(rotated).expect("same shape");
    assert_eq!(viewer.store().display(), &display);
    assert_eq!(viewer.render().slices().len(), 3);
}

#[test]
fn polling_eventually_yields_the_volume() {
    let mut job = RotationWorker::spawn(ramp((3, 3, 3)), EulerOrder::Xyz.matrix([0.0, 90.0, 0.0]));
    let rotated = loop {
        if let Some(rotated) = job.try_result().expect("worker alive") {
            break rotated;
        }
        std::thread::yield_now();
    };
    assert_eq!(rotated.dim(), (3, 3, 3));
}

#[test]
fn spawning_without_a_volume_fails() {
    let viewer = cbct_viewer::Viewer::new(
        cbct_viewer::ViewerConfig::default(),
        common::RecordingRender::default(),
        common::RecordingUi::default(),
    );
    assert!(matches!(
        viewer.spawn_rotation([10.0, 0.0, 0.0]),
        Err(ViewerError::NoVolumeLoaded)
    ));
}

#[test]
fn rotated_result_with_other_shape_is_rejected() {
    let mut viewer = loaded_viewer((4, 4, 4));
    let result = viewer.apply_rotation_result(ramp((4, 4, 3)));
    assert!(matches!(result, Err(ViewerError::ShapeMismatch { .. })));
    assert_eq!(viewer.store().dim(), (4, 4, 4));
}
