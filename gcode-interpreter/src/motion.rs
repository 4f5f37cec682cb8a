use gcode::{Axis, Target};

use crate::ModalState;

/// Adds two optional-component vectors componentwise; `None + anything =
/// None` (spec §4.6).
#[must_use]
pub fn vector_add(a: [Option<f64>; 3], b: [f64; 3]) -> [Option<f64>; 3] {
    let mut out = [None; 3];
    for i in 0..3 {
        out[i] = a[i].map(|v| v + b[i]);
    }
    out
}

/// Adds two optional-component vectors componentwise, where both sides may
/// be unset; `None + anything = None` either way (spec §4.8's repeated use
/// of `_vectorAdd` against a running, possibly partially-unset, target).
#[must_use]
pub fn vector_add_opt(
    a: [Option<f64>; 3],
    b: [Option<f64>; 3],
) -> [Option<f64>; 3] {
    let mut out = [None; 3];
    for i in 0..3 {
        out[i] = match (a[i], b[i]) {
            (Some(x), Some(y)) => Some(x + y),
            _ => None,
        };
    }
    out
}

/// Reads `X`/`Y`/`Z` words off `tokens`, scaled by `stretch`. Missing axes
/// are `None` (spec §4.6's `_readAxes`).
#[must_use]
pub fn read_axes(words: &[gcode::Word], stretch: f64) -> [Option<f64>; 3] {
    let mut out = [None; 3];
    for word in words {
        if let Some(axis) = Axis::from_letter(word.address) {
            out[axis.index()] = Some(word.value * stretch);
        }
    }
    out
}

/// Emits a straight motion to `target` if any axis actually changes,
/// updating `state.position`/`state.incr_position` (spec §4.6's
/// `_straightMotionToTarget`).
///
/// `target[i] == None` means "unchanged"; on the very first move in
/// incremental mode, an unset component instead defaults to the current
/// `incr_position` (spec §4.6, "On the first motion ever...").
pub fn straight_motion_to_target<T: Target>(
    state: &mut ModalState,
    target: &mut [Option<f64>; 3],
    rapid: bool,
    tgt: &mut T,
) {
    let mut long_move_axis: Option<Axis> = None;
    let mut dist = 0.0_f64;
    let mut machine_pos: [Option<i64>; 3] = [None; 3];
    let mut need_move = false;

    for (i, axis) in [Axis::X, Axis::Y, Axis::Z].into_iter().enumerate() {
        if state.first_move && !state.abs_distance_mode && target[i].is_none() {
            target[i] = Some(state.incr_position[i]);
        }

        if let Some(value) = target[i] {
            let delta = (value - state.position[i]).abs();
            if delta > dist {
                long_move_axis = Some(axis);
                dist = delta;
            }

            if (value - state.position[i]).abs() > f64::EPSILON {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "machine coordinates are bounded well within i64 range"
                )]
                let micrometers = (value * 1000.0).round() as i64;
                machine_pos[i] = Some(micrometers);
                need_move = true;
            }
        }
    }

    if !need_move {
        return;
    }

    tgt.straight_motion(rapid, long_move_axis, machine_pos);

    for (wanted, position, incr_position) in itertools::izip!(
        target.iter(),
        state.position.iter_mut(),
        state.incr_position.iter_mut()
    ) {
        if let Some(value) = wanted {
            *position = *value;
            *incr_position = *value;
        }
    }
    state.first_move = false;
}
