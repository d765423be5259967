use fenris_transfer::animation::{deform, modal_signal, AnimationState};
use fenris_transfer::mesh::procedural::create_unit_box_uniform_tet_mesh;
use fenris_transfer::mesh::Tet4Mesh;
use fenris_transfer::nalgebra::{dvector, DMatrix, DVector, Point3, Vector3};
use fenris_transfer::TransferError;
use matrixcompare::{assert_matrix_eq, assert_scalar_eq};
use std::f64::consts::PI;

fn centroid(points: &[Point3<f64>]) -> Vector3<f64> {
    points.iter().fold(Vector3::zeros(), |sum, x| sum + x.coords) / points.len() as f64
}

#[test]
fn modal_signal_oscillates_with_scaled_frequency() {
    let mode = dvector![1.0, -2.0, 0.5];
    let frequency = 4.0;
    let wave_frequency = 0.25;
    let amplitude = 0.5;

    assert_eq!(modal_signal(frequency, &mode, 0.0, amplitude, wave_frequency), DVector::zeros(3));
    // k * omega * t = pi / 2 at the first peak
    let t_peak = PI / 2.0;
    let peak = modal_signal(frequency, &mode, t_peak, amplitude, wave_frequency);
    assert_matrix_eq!(peak, &mode * amplitude, comp = abs, tol = 1e-14);
    let trough = modal_signal(frequency, &mode, 3.0 * t_peak, amplitude, wave_frequency);
    assert_matrix_eq!(trough, &mode * -amplitude, comp = abs, tol = 1e-14);
}

#[test]
fn animation_state_wraps_after_full_turn() {
    let mut state = AnimationState::default();
    assert_eq!(state.mode, 6);
    assert_eq!(state.theta, 0.0);

    state.advance();
    assert_scalar_eq!(state.theta, PI / 120.0, comp = abs, tol = 1e-15);

    let mut max_theta: f64 = 0.0;
    let mut wrapped = false;
    for _ in 0..300 {
        let before = state.theta;
        state.advance();
        max_theta = max_theta.max(state.theta);
        wrapped |= state.theta < before;
    }
    assert!(wrapped);
    assert!(max_theta <= 2.0 * PI + state.dtheta);
    assert!(state.theta >= 0.0);
}

#[test]
fn frame_without_rotation_is_vibration_plus_translation() -> eyre::Result<()> {
    let mesh: Tet4Mesh<f64> = create_unit_box_uniform_tet_mesh(1);
    let n = 3 * mesh.num_nodes();
    let modes = DMatrix::from_fn(n, 2, |i, j| ((i + 1) * (j + 2)) as f64 / n as f64);
    let frequencies = [0.0, 10.0];
    let state = AnimationState {
        mode: 1,
        ..AnimationState::default()
    };

    let t = 2.0;
    let frame = state.frame(mesh.vertices(), &frequencies, &modes, t)?;
    let expected = modal_signal(10.0, &modes.column(1).into_owned(), t, state.amplitude, state.wave_frequency);
    assert_matrix_eq!(frame.displacement, expected, comp = abs, tol = 1e-14);
    assert_matrix_eq!(frame.transfer_input, expected.add_scalar(1.0), comp = abs, tol = 1e-14);
    Ok(())
}

#[test]
fn rotation_in_frame_preserves_distances_to_centroid() -> eyre::Result<()> {
    let mesh: Tet4Mesh<f64> = create_unit_box_uniform_tet_mesh(2);
    let rest = mesh.vertices();
    let n = 3 * rest.len();
    let state = AnimationState {
        mode: 0,
        amplitude: 0.0,
        theta: PI / 3.0,
        ..AnimationState::default()
    };
    let frame = state.frame(rest, &[1.0], &DMatrix::zeros(n, 1), 0.7)?;
    let deformed = deform(rest, &frame.displacement)?;

    let c = centroid(rest);
    assert_matrix_eq!(centroid(&deformed), c, comp = abs, tol = 1e-12);
    for (x, y) in rest.iter().zip(&deformed) {
        assert_scalar_eq!((y.coords - c).norm(), (x.coords - c).norm(), comp = abs, tol = 1e-12);
        // Rotation about the y axis keeps the y coordinate
        assert_scalar_eq!(y.y, x.y, comp = abs, tol = 1e-12);
    }
    Ok(())
}

#[test]
fn deform_adds_displacement_to_positions() -> eyre::Result<()> {
    let rest = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0)];
    let displacement = dvector![1.0, 0.0, -1.0, 0.5, 0.5, 0.5];
    let deformed = deform(&rest, &displacement)?;
    assert_eq!(deformed, vec![Point3::new(1.0, 0.0, -1.0), Point3::new(1.5, 2.5, 3.5)]);

    assert_eq!(
        deform(&rest, &DVector::zeros(5)),
        Err(TransferError::InputShapeMismatch {
            context: "displacement",
            expected: (6, 1),
            actual: (5, 1),
        })
    );
    Ok(())
}

#[test]
fn frame_rejects_invalid_modes() {
    let rest = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
    let state = AnimationState::default();

    let result = state.frame(&rest, &[1.0, 2.0], &DMatrix::zeros(6, 2), 0.0);
    assert!(matches!(result, Err(TransferError::InvalidSettings(_))));

    let result = state.frame(&rest, &[1.0; 7], &DMatrix::zeros(5, 7), 0.0);
    assert_eq!(
        result,
        Err(TransferError::InputShapeMismatch {
            context: "vibration modes",
            expected: (6, 7),
            actual: (5, 7),
        })
    );
}
