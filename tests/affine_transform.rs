//! User affines applied through a session.

mod helpers;

use helpers::{assert_close, matrix, output_names, with_brain, ATLAS};
use ngtools::space::MatrixInput;
use ngtools::{LoadRequest, SessionError};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn identity() -> Vec<Vec<f64>> {
    vec![
        vec![1., 0., 0., 0.],
        vec![0., 1., 0., 0.],
        vec![0., 0., 1., 0.],
    ]
}

fn shift_x(amount: f64) -> MatrixInput {
    MatrixInput::Flat(vec![
        1., 0., 0., amount, //
        0., 1., 0., 0., //
        0., 0., 1., 0.,
    ])
}

#[test]
fn translation_lands_in_current_display_space() {
    let mut session = with_brain();
    let applied = session.transform(&shift_x(10.0), &[], false).unwrap();

    assert_eq!(applied, 1);
    assert_eq!(output_names(&session, "brain"), vec!["x", "y", "z"]);
    assert_close(
        &matrix(&session, "brain"),
        &[
            vec![1., 0., 0., 10.],
            vec![0., 1., 0., 0.],
            vec![0., 0., 1., 0.],
        ],
    );
}

#[test]
fn inverse_restores_identity() {
    let mut session = with_brain();
    let rotate_and_shift = MatrixInput::Rows(vec![
        vec![0., -1., 0., 3.],
        vec![1., 0., 0., -2.],
        vec![0., 0., 2., 5.],
        vec![0., 0., 0., 1.],
    ]);

    session.transform(&rotate_and_shift, &[], false).unwrap();
    session.transform(&rotate_and_shift, &[], true).unwrap();

    assert_close(&matrix(&session, "brain"), &identity());
}

#[test]
fn layer_filter_limits_targets() {
    let mut session = with_brain();
    session.load(&LoadRequest::new(ATLAS)).unwrap();

    let applied = session
        .transform(&shift_x(1.0), &["brain".to_string()], false)
        .unwrap();
    assert_eq!(applied, 1);
    // routed through RAS and back, so only an explicit identity remains
    assert_close(&matrix(&session, "atlas.zarr"), &identity());
}

#[test]
fn display_order_survives_a_transform() {
    let mut session = with_brain();
    session.display(&["zyx"]).unwrap();
    session.transform(&shift_x(4.0), &[], false).unwrap();

    assert_eq!(session.display_dimensions().names(), &["z", "y", "x"]);
    assert_eq!(output_names(&session, "brain"), vec!["z", "y", "x"]);
    // x moved by 4, now the third display axis
    assert_close(
        &matrix(&session, "brain"),
        &[
            vec![0., 0., 1., 0.],
            vec![0., 1., 0., 0.],
            vec![1., 0., 0., 4.],
        ],
    );
}

#[test]
fn singular_inverse_is_rejected_without_commit() {
    let mut session = with_brain();
    let before = session.state();
    let commits = session.store().commits();

    let err = session
        .transform(&MatrixInput::Flat(vec![0.0; 12]), &[], true)
        .unwrap_err();

    assert_eq!(err.code(), "NUMERIC");
    assert_eq!(session.state(), before);
    assert_eq!(session.store().commits(), commits);
}

#[test]
fn two_dimensional_affine_is_a_convention_mismatch() {
    let mut session = with_brain();
    let err = session
        .transform(&MatrixInput::Flat(vec![1., 0., 0., 0., 1., 0.]), &[], false)
        .unwrap_err();
    assert_eq!(err.code(), "VALIDATION");
}

#[test]
fn unknown_layer_is_rejected() {
    let mut session = with_brain();
    let err = session
        .transform(&shift_x(1.0), &["nope".to_string()], false)
        .unwrap_err();
    assert!(matches!(err, SessionError::UnknownLayer(name) if name == "nope"));
}

#[test]
fn affine_on_load_applies_to_new_layer_only() {
    let mut session = with_brain();
    let mut request = LoadRequest::new(ATLAS);
    request.transform = Some(shift_x(2.0));
    session.load(&request).unwrap();

    assert_close(&matrix(&session, "brain"), &identity());
    assert_close(
        &matrix(&session, "atlas.zarr"),
        &[
            vec![1., 0., 0., 2.],
            vec![0., 1., 0., 0.],
            vec![0., 0., 1., 0.],
        ],
    );
}

#[test]
fn transform_from_file() {
    use std::io::Write;

    let mut session = with_brain();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "1 0 0 0\n0 1 0 7\n0 0 1 0\n0 0 0 1").unwrap();

    session
        .transform_file(file.path(), None, None, &[], false)
        .unwrap();
    assert_close(
        &matrix(&session, "brain"),
        &[
            vec![1., 0., 0., 0.],
            vec![0., 1., 0., 7.],
            vec![0., 0., 1., 0.],
        ],
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn any_translation_is_undone_by_its_inverse(
        dx in -100.0f64..100.0,
        dy in -100.0f64..100.0,
        dz in -100.0f64..100.0,
    ) {
        let mut session = with_brain();
        let shift = MatrixInput::Flat(vec![
            1., 0., 0., dx, //
            0., 1., 0., dy, //
            0., 0., 1., dz,
        ]);
        session.transform(&shift, &[], false).unwrap();
        session.transform(&shift, &[], true).unwrap();

        let result = matrix(&session, "brain");
        for (row, expected) in result.iter().zip(identity()) {
            for (x, y) in row.iter().zip(expected) {
                prop_assert!((x - y).abs() < 1e-9);
            }
        }
    }
}
