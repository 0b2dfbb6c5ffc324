use cbct_viewer::measurement::MeasurementEffect;
use cbct_viewer::{Measurement, MeasurementState, MeasurementStateMachine, Pick};

#[test]
fn click_move_click_commits_one_measurement() {
    let mut machine = MeasurementStateMachine::new();
    assert_eq!(machine.state(), MeasurementState::Idle);

    machine.arm();
    assert_eq!(machine.state(), MeasurementState::ArmedNoPoint);

    assert!(machine.primary_click(Pick::Hit([10.0, 20.0, 0.0])).is_empty());
    assert_eq!(machine.state(), MeasurementState::ArmedPending([10.0, 20.0, 0.0]));

    let effects = machine.pointer_move(Pick::Hit([15.0, 20.0, 0.0]));
    assert_eq!(
        effects,
        vec![MeasurementEffect::Preview {
            from: [10.0, 20.0, 0.0],
            to: [15.0, 20.0, 0.0],
        }]
    );
    assert_eq!(machine.state(), MeasurementState::ArmedPending([10.0, 20.0, 0.0]));

    let effects = machine.primary_click(Pick::Hit([15.0, 20.0, 0.0]));
    let expected = Measurement::new([10.0, 20.0, 0.0], [15.0, 20.0, 0.0]);
    assert_eq!(
        effects,
        vec![MeasurementEffect::Commit(expected), MeasurementEffect::ClearPreview]
    );
    assert_eq!(expected.distance, 5.0);
    assert_eq!(expected.label(), "5.00 mm");
    assert_eq!(expected.midpoint(), [12.5, 20.0, 0.0]);
    assert_eq!(machine.state(), MeasurementState::ArmedNoPoint);
    assert_eq!(machine.pending_point(), None);
    assert_eq!(machine.committed(), &[expected]);
}

#[test]
fn secondary_click_discards_pending_point() {
    let mut machine = MeasurementStateMachine::new();
    machine.arm();
    machine.primary_click(Pick::Hit([1.0, 1.0, 0.0]));
    machine.pointer_move(Pick::Hit([2.0, 2.0, 0.0]));

    assert_eq!(machine.secondary_click(), vec![MeasurementEffect::ClearPreview]);
    assert_eq!(machine.state(), MeasurementState::ArmedNoPoint);
    assert!(machine.committed().is_empty());

    machine.primary_click(Pick::Hit([7.0, 3.0, 0.0]));
    assert_eq!(machine.pending_point(), Some([7.0, 3.0, 0.0]));
}

#[test]
fn missed_picks_change_nothing() {
    let mut machine = MeasurementStateMachine::new();
    machine.arm();
    assert!(machine.primary_click(Pick::Miss).is_empty());
    assert_eq!(machine.state(), MeasurementState::ArmedNoPoint);

    machine.primary_click(Pick::Hit([0.0, 0.0, 0.0]));
    assert!(machine.pointer_move(Pick::Miss).is_empty());
    assert!(machine.primary_click(Pick::Miss).is_empty());
    assert_eq!(machine.pending_point(), Some([0.0, 0.0, 0.0]));
}

#[test]
fn idle_machine_ignores_clicks() {
    let mut machine = MeasurementStateMachine::new();
    assert!(machine.primary_click(Pick::Hit([1.0, 2.0, 3.0])).is_empty());
    assert!(machine.secondary_click().is_empty());
    assert_eq!(machine.state(), MeasurementState::Idle);
}

#[test]
fn disarm_clears_pending_point_and_preview() {
    let mut machine = MeasurementStateMachine::new();
    machine.arm();
    machine.primary_click(Pick::Hit([1.0, 1.0, 0.0]));
    machine.pointer_move(Pick::Hit([4.0, 5.0, 0.0]));

    assert_eq!(machine.disarm(), vec![MeasurementEffect::ClearPreview]);
    assert_eq!(machine.state(), MeasurementState::Idle);
    assert!(machine.disarm().is_empty());
}

#[test]
fn distance_ignores_the_out_of_plane_coordinate() {
    let measurement = Measurement::new([0.0, 0.0, 4.0], [3.0, 4.0, -9.0]);
    assert_eq!(measurement.distance, 5.0);
    assert_eq!(measurement.label(), "5.00 mm");
}

#[test]
fn redraw_forgets_lines_but_stays_armed() {
    let mut machine = MeasurementStateMachine::new();
    machine.arm();
    machine.primary_click(Pick::Hit([0.0, 0.0, 0.0]));
    machine.primary_click(Pick::Hit([1.0, 0.0, 0.0]));
    machine.primary_click(Pick::Hit([2.0, 2.0, 0.0]));
    machine.pointer_move(Pick::Hit([3.0, 2.0, 0.0]));
    assert_eq!(machine.committed().len(), 1);

    machine.view_redrawn();
    assert!(machine.committed().is_empty());
    assert_eq!(machine.state(), MeasurementState::ArmedNoPoint);
    assert!(machine.disarm().is_empty());

    machine.view_redrawn();
    assert_eq!(machine.state(), MeasurementState::Idle);
}
