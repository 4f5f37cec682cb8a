use gcode::{Instruction, Target};

use crate::{
    motion::{read_axes, straight_motion_to_target, vector_add_opt},
    InterpretError, ModalState,
};

/// Emits one `G81`/`G82`/`G83` canned drilling cycle (spec §4.8's
/// `_processCannedCycle`). `peck` selects `G83`'s step-and-retract
/// plunging; `G81`/`G82` share the same non-peck path (spec.md doesn't
/// distinguish `G82`'s dwell from `G81` at the motion level — dwell is
/// inert here, matching `G4`).
///
/// # Errors
///
/// Returns a `CannedCycle*` error if `R`/`Z` can't be resolved, `L` isn't a
/// natural number, or (for `G83`) `Q` is missing or non-positive.
pub fn process_canned_cycle<T: Target>(
    state: &mut ModalState,
    instr: &Instruction,
    peck: bool,
    tgt: &mut T,
) -> Result<(), InterpretError> {
    let mut move_xyz = read_axes(&instr.params, state.stretch);
    let old_z_entry = state.position[2];

    if let Some(r) = instr.param('R') {
        state.canned_cycle_words.r = Some(r.value);
    }
    let r = state
        .canned_cycle_words
        .r
        .ok_or(InterpretError::CannedCycleMissingR)?;
    let mut clear_z = r * state.stretch;

    if let Some(z) = move_xyz[2] {
        state.canned_cycle_words.z = Some(z);
    } else {
        move_xyz[2] =
            Some(state.canned_cycle_words.z.ok_or(InterpretError::CannedCycleMissingZ)?);
    }

    if state.invert_z {
        move_xyz[2] = move_xyz[2].map(|z| -z);
        clear_z = -clear_z;
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::float_arithmetic,
        reason = "L is a small repeat count read straight off an L word"
    )]
    let l = instr.param('L').map_or(1_i64, |w| w.value as i64);
    if l < 1 {
        return Err(InterpretError::CannedCycleInvalidL(l));
    }

    let q = if peck {
        let q = instr
            .param('Q')
            .map(|w| w.value)
            .ok_or(InterpretError::CannedCycleMissingQ)?;
        if q <= 0.0 {
            return Err(InterpretError::CannedCycleInvalidQ(q));
        }
        Some(q)
    } else {
        None
    };

    let mut target = if state.abs_distance_mode {
        move_xyz
    } else {
        clear_z += state.incr_position[2];
        state.incr_position.map(Some)
    };
    let z = if state.abs_distance_mode {
        target[2].unwrap_or(0.0)
    } else {
        #[allow(clippy::arithmetic_side_effects, reason = "move_xyz[2] is always Some by this point")]
        let z = clear_z + move_xyz[2].unwrap_or(0.0);
        z
    };

    let mut old_z = old_z_entry;
    if old_z_entry > clear_z {
        old_z = clear_z;
        straight_motion_to_target(state, &mut [None, None, Some(clear_z)], true, tgt);
    }

    for _ in 0..l {
        if !state.abs_distance_mode {
            target = vector_add_opt(move_xyz, target);
        }

        straight_motion_to_target(state, &mut [target[0], target[1], None], true, tgt);
        straight_motion_to_target(state, &mut [None, None, Some(clear_z)], true, tgt);

        loop {
            let target_z = if peck {
                #[allow(clippy::arithmetic_side_effects, reason = "q is Some whenever peck is true")]
                let candidate = state.position[2] + q.unwrap_or(0.0);
                if z < candidate {
                    z
                } else {
                    candidate
                }
            } else {
                z
            };

            straight_motion_to_target(state, &mut [None, None, Some(target_z)], false, tgt);
            if (target_z - z).abs() < f64::EPSILON {
                break;
            }

            if peck {
                straight_motion_to_target(
                    state,
                    &mut [None, None, Some(clear_z)],
                    true,
                    tgt,
                );

                #[allow(clippy::arithmetic_side_effects, reason = "q is Some whenever peck is true")]
                let mut peck_offset = q.unwrap_or(0.0) / 3.0;
                if peck_offset > 0.1 {
                    peck_offset = 0.1;
                }
                let mut peck_z = target_z - peck_offset;
                if peck_z < clear_z {
                    peck_z = clear_z;
                }
                straight_motion_to_target(state, &mut [None, None, Some(peck_z)], true, tgt);
            }
        }

        straight_motion_to_target(state, &mut [None, None, Some(old_z)], true, tgt);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use coverage_helper::test;
    use gcode::{Axis, Word};

    use super::*;

    struct RecordingTarget {
        moves: alloc::vec::Vec<(bool, [Option<i64>; 3])>,
    }

    impl Target for RecordingTarget {
        fn axes(&self) -> alloc::vec::Vec<Axis> {
            alloc::vec![Axis::X, Axis::Y, Axis::Z]
        }
        fn append_preamble(&mut self) {}
        fn append_postamble(&mut self) {}
        fn set_feed_rate(&mut self, _micro_units_per_second: i64) {}
        fn set_spindle_speed(&mut self, _pwm: u8) {}
        fn set_spindle_config(
            &mut self,
            _ccw: Option<bool>,
            _enable: bool,
            _speed: Option<i64>,
        ) {
        }
        fn set_coolant_mist(&mut self) {}
        fn set_coolant_off(&mut self) {}
        fn straight_motion(
            &mut self,
            rapid: bool,
            _long_move_axis: Option<Axis>,
            machine_pos: [Option<i64>; 3],
        ) {
            self.moves.push((rapid, machine_pos));
        }
        fn circle_motion(&mut self, _dx: i64, _dy: i64, _sweep: i64) {}
    }

    #[test]
    fn missing_r_fails() {
        let mut state = ModalState::default();
        let instr = Instruction::new(Word::new('G', 81.0), alloc::vec![Word::new('Z', -5.0)]);
        let mut tgt = RecordingTarget { moves: alloc::vec::Vec::new() };
        assert_eq!(
            process_canned_cycle(&mut state, &instr, false, &mut tgt),
            Err(InterpretError::CannedCycleMissingR)
        );
    }

    #[test]
    fn peck_without_q_fails() {
        let mut state = ModalState::default();
        let instr = Instruction::new(
            Word::new('G', 83.0),
            alloc::vec![Word::new('Z', -5.0), Word::new('R', 2.0)],
        );
        let mut tgt = RecordingTarget { moves: alloc::vec::Vec::new() };
        assert_eq!(
            process_canned_cycle(&mut state, &instr, true, &mut tgt),
            Err(InterpretError::CannedCycleMissingQ)
        );
    }

    #[test]
    fn single_repeat_plain_drill_emits_rapid_down_feed_and_retract() {
        let mut state = ModalState::default();
        let instr = Instruction::new(
            Word::new('G', 81.0),
            alloc::vec![Word::new('X', 10.0), Word::new('Y', 0.0), Word::new('Z', -5.0), Word::new('R', 2.0)],
        );
        let mut tgt = RecordingTarget { moves: alloc::vec::Vec::new() };
        process_canned_cycle(&mut state, &instr, false, &mut tgt).unwrap();
        // Rapid to XY, rapid down to clearZ, feed to Z, rapid back to oldZ.
        assert!(tgt.moves.iter().any(|(rapid, pos)| *rapid && pos[2] == Some(2000)));
        assert!(tgt.moves.iter().any(|(rapid, pos)| !*rapid && pos[2] == Some(-5000)));
        assert_eq!(state.canned_cycle_words.r, Some(2.0));
        assert_eq!(state.canned_cycle_words.z, Some(-5.0));
    }

    #[test]
    fn repeated_cycle_honors_l() {
        let mut state = ModalState::default();
        let instr = Instruction::new(
            Word::new('G', 81.0),
            alloc::vec![Word::new('X', 10.0), Word::new('Z', -5.0), Word::new('R', 2.0), Word::new('L', 3.0)],
        );
        let mut tgt = RecordingTarget { moves: alloc::vec::Vec::new() };
        process_canned_cycle(&mut state, &instr, false, &mut tgt).unwrap();
        let feeds = tgt.moves.iter().filter(|(rapid, pos)| !*rapid && pos[2] == Some(-5000)).count();
        assert_eq!(feeds, 3);
    }
}
