//! A host driving the facade with `?` and the unified error.

use colgrid::prelude::*;
use colgrid::{DragEffect, DragNoopReason, FixedMeasurer, MIN_WIDTH, MutationDecline, node_at};
use proptest::prelude::*;

fn build_and_edit() -> colgrid::Result<(EditorState, usize)> {
    let mut state = EditorState::new(
        Node::doc(vec![Node::paragraph_text("ab")]),
        GridConfig::default(),
    )?;
    let inserted = insert_grid(&mut state, 2, 3).into_result()?;
    let grid_pos = inserted.grid_pos.ok_or(MutationDecline::GridNotFound { anchor: 2 })?;
    resize_handle_by(&mut state, grid_pos, 0, 10.0).into_result()?;
    Ok((state, grid_pos))
}

#[test]
fn host_builds_and_resizes_a_grid() {
    let (state, grid_pos) = build_and_edit().expect("host flow");
    assert_eq!(state.doc().children().len(), 2);
    let widths = node_at(state.doc(), grid_pos).expect("grid").column_widths();
    assert_eq!(widths.len(), 3);
    assert!(widths[0] > widths[1]);
    assert!((widths.iter().sum::<f64>() - 100.0).abs() <= 0.1);
}

#[test]
fn declines_surface_through_question_mark() {
    let (mut state, grid_pos) = build_and_edit().expect("host flow");
    let first: colgrid::Result<_> = delete_column(&mut state, grid_pos, 2)
        .into_result()
        .map_err(Error::from);
    assert!(first.is_ok());

    let second: colgrid::Result<_> = delete_column(&mut state, grid_pos, 0)
        .into_result()
        .map_err(Error::from);
    let err = second.expect_err("two columns is the floor");
    assert!(matches!(
        err,
        Error::Mutation(MutationDecline::ColumnLimit { .. })
    ));
    assert_eq!(err.recovery(), Recovery::KeepDocument);
}

#[test]
fn drag_setup_failure_maps_to_skip() {
    let (state, grid_pos) = build_and_edit().expect("host flow");
    let mut drag = DragController::default();
    let dispatch = drag.pointer_down(&state, &FixedMeasurer::unmeasured(), grid_pos, 0, 10.0);
    assert!(dispatch.commands.is_empty());
    assert!(!drag.is_dragging());
    let DragEffect::Noop(DragNoopReason::Setup(setup)) = dispatch.transition.effect else {
        panic!("expected a setup noop, got {:?}", dispatch.transition.effect);
    };
    let err = Error::from(setup);
    assert_eq!(err.recovery(), Recovery::SkipDrag);
}

proptest! {
    /// Any run of toolbar commands either commits a valid grid or declines
    /// with an error the host can shrug off.
    #[test]
    fn command_runs_keep_grid_valid(
        ops in prop::collection::vec((0u8..4, 0usize..12), 1..24),
    ) {
        let (mut state, grid_pos) = build_and_edit().expect("host flow");
        for (op, index) in ops {
            let outcome = match op {
                0 => insert_column(&mut state, grid_pos, index, Direction::Right),
                1 => delete_column(&mut state, grid_pos, index),
                2 => resize_handle_by(&mut state, grid_pos, index, 7.5),
                _ => distribute_evenly(&mut state, grid_pos),
            };
            if let Err(decline) = outcome.into_result() {
                let err = Error::from(decline);
                prop_assert!(err.is_recoverable());
                prop_assert_eq!(err.recovery(), Recovery::KeepDocument);
            }
            let widths = node_at(state.doc(), grid_pos).expect("grid stays put").column_widths();
            prop_assert!((2..=10).contains(&widths.len()), "{:?}", widths);
            prop_assert!((widths.iter().sum::<f64>() - 100.0).abs() <= 0.1, "{:?}", widths);
            prop_assert!(widths.iter().all(|w| *w >= MIN_WIDTH - 0.005), "{:?}", widths);
        }
    }
}
