mod common;

use cbct_viewer::overlay::compose;
use cbct_viewer::volume_store::display_volume;
use cbct_viewer::{OverlayCompositor, Transformer, ViewerConfig, ViewerError};
use common::ramp;
use ndarray::Array3;

const PERCENTILES: (f32, f32) = (1.0, 99.0);

#[test]
fn blend_saturates_at_white() {
    let primary = Array3::from_elem((3, 3, 3), 200u8);
    let blended = compose(&primary, &ramp((3, 3, 3)), (0.0, 0.0, 0.0), 0.0, (1, 2), 0.5, PERCENTILES)
        .expect("same shape");

    assert_eq!(blended[[0, 0, 0]], 200);
    assert_eq!(blended[[2, 2, 2]], 255);
    assert!(blended.iter().all(|&v| v >= 200));
}

#[test]
fn secondary_is_translated_before_it_is_rotated() {
    let shape = (3, 4, 4);
    let primary = Array3::<u8>::zeros(shape);
    let secondary = ramp(shape);
    let normalized = display_volume(&secondary, PERCENTILES.0, PERCENTILES.1)
        .expect("ramp has a range")
        .mapv(f32::from);
    let to_u8 = |volume: Array3<f32>| volume.mapv(|v| v.clamp(0.0, 255.0) as u8);

    let blended = compose(&primary, &secondary, (1.0, 0.0, 0.0), 90.0, (1, 2), 1.0, PERCENTILES)
        .expect("same shape");

    let translated = Transformer::translate(normalized.view(), 1.0, 0.0, 0.0);
    let expected = to_u8(Transformer::rotate(translated.view(), 90.0, (1, 2)));
    assert_eq!(blended, expected);

    let rotated = Transformer::rotate(normalized.view(), 90.0, (1, 2));
    let reversed = to_u8(Transformer::translate(rotated.view(), 1.0, 0.0, 0.0));
    assert_ne!(blended, reversed);
}

#[test]
fn uniform_secondary_adds_nothing() {
    let primary = Array3::from_shape_fn((2, 3, 4), |(z, y, x)| (z * 40 + y * 10 + x) as u8);
    let secondary = Array3::from_elem((2, 3, 4), 7.0f32);
    let blended = compose(&primary, &secondary, (0.0, 0.0, 0.0), 0.0, (1, 2), 0.5, PERCENTILES)
        .expect("same shape");
    assert_eq!(blended, primary);
}

#[test]
fn shape_mismatch_is_rejected() {
    let primary = Array3::<u8>::zeros((4, 4, 4));
    let result = compose(&primary, &ramp((4, 4, 5)), (0.0, 0.0, 0.0), 0.0, (1, 2), 0.5, PERCENTILES);
    assert!(matches!(
        result,
        Err(ViewerError::ShapeMismatch { expected: (4, 4, 4), actual: (4, 4, 5) })
    ));
}

#[test]
fn compositor_keeps_previous_secondary_on_mismatch() {
    let mut compositor = OverlayCompositor::new(&ViewerConfig::default());
    let primary = Array3::<u8>::zeros((2, 2, 2));
    assert!(matches!(compositor.compose(&primary), Err(ViewerError::NoOverlayVolume)));

    compositor.load_secondary((2, 2, 2), ramp((2, 2, 2))).expect("same shape");
    compositor.set_params((0.5, 0.0, 0.0), 10.0);
    assert!(compositor.load_secondary((2, 2, 2), ramp((2, 2, 3))).is_err());

    assert!(compositor.has_secondary());
    assert_eq!(compositor.state().translation, (0.5, 0.0, 0.0));
    assert!(compositor.compose(&primary).is_ok());
}

#[test]
fn loading_a_secondary_resets_its_placement() {
    let mut compositor = OverlayCompositor::new(&ViewerConfig::default());
    compositor.load_secondary((2, 2, 2), ramp((2, 2, 2))).expect("same shape");
    compositor.set_params((1.0, 2.0, 3.0), 45.0);
    compositor.load_secondary((2, 2, 2), ramp((2, 2, 2))).expect("same shape");
    assert_eq!(compositor.state().translation, (0.0, 0.0, 0.0));
    assert_eq!(compositor.state().rotation_angle, 0.0);
}
