#![no_main]

use arbitrary::Arbitrary;
use colgrid_doc::{EditorState, Node, validate_document};
use colgrid_runtime::{
    ApplyWidthsOptions, Direction, DragController, FixedMeasurer, apply_widths, delete_column,
    distribute_evenly, insert_column, resize_handle_by,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Insert { column: u8, right: bool },
    Delete { column: u8 },
    Resize { handle: u8, delta: f64 },
    Distribute,
    Apply { widths: Vec<f64> },
    Drag { handle: u8, moves: Vec<f32> },
}

fuzz_target!(|ops: Vec<Op>| {
    let Ok(mut state) = EditorState::with_doc(Node::doc(vec![Node::grid(vec![
        Node::empty_column(50.0),
        Node::empty_column(50.0),
    ])])) else {
        return;
    };
    let mut drag = DragController::default();
    let measurer = FixedMeasurer::new(960.0, 16.0);

    for op in ops.into_iter().take(64) {
        match op {
            Op::Insert { column, right } => {
                let direction = if right { Direction::Right } else { Direction::Left };
                insert_column(&mut state, 0, usize::from(column), direction);
            }
            Op::Delete { column } => {
                delete_column(&mut state, 0, usize::from(column));
            }
            Op::Resize { handle, delta } => {
                resize_handle_by(&mut state, 0, usize::from(handle), delta);
            }
            Op::Distribute => {
                distribute_evenly(&mut state, 0);
            }
            Op::Apply { widths } => {
                apply_widths(&mut state, 0, &widths, ApplyWidthsOptions::default());
            }
            Op::Drag { handle, moves } => {
                drag.pointer_down(&state, &measurer, 0, usize::from(handle), 480.0);
                for x in moves.into_iter().take(16) {
                    drag.pointer_move(f64::from(x));
                    drag.animation_frame(&mut state);
                }
                drag.pointer_up(&mut state);
            }
        }

        // Every committed document keeps valid grids.
        let bounds = state.config().bounds();
        assert!(
            validate_document(state.doc(), bounds).is_ok(),
            "invalid document after commands"
        );
        assert!(!drag.is_dragging());
    }
});
