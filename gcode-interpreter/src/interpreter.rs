use alloc::string::String;

use gcode::Target;

use crate::{dispatch::process_block, motion::straight_motion_to_target, InterpretError, ModalState};

/// External configuration knobs that aren't carried by the G-code itself
/// (spec §9, "Configuration"): everything a `Target` doesn't already own.
#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    /// Negates Z on every motion primitive, straight or canned-cycle.
    pub invert_z: bool,
}

/// Drives a program's canonical blocks against a [`Target`], owning all
/// modal state across a `run`/`resume` span (spec §4.9).
///
/// Never re-enters its `Target`: every primitive is emitted serially from
/// inside `run`/`resume`, and no `Target` method is called concurrently
/// with another.
pub struct Interpreter<'a, T: Target> {
    /// All durable interpreter attributes.
    state: ModalState,
    /// Index of the last block dispatched, `-1` before the first.
    current_block: i64,
    /// The downstream primitive sink.
    target: &'a mut T,
}

impl<'a, T: Target> Interpreter<'a, T> {
    /// Builds an interpreter in its initial modal state.
    #[must_use]
    pub fn new(target: &'a mut T, config: Config) -> Self {
        let state = ModalState {
            invert_z: config.invert_z,
            ..ModalState::default()
        };
        Self {
            state,
            current_block: -1,
            target,
        }
    }

    /// A read-only view of the interpreter's current modal state, e.g. to
    /// inspect position or tool state between runs.
    #[must_use]
    pub const fn state(&self) -> &ModalState {
        &self.state
    }

    /// Interprets `blocks` from the very start (spec §4.9's `run`).
    ///
    /// # Errors
    ///
    /// Propagates the first [`InterpretError`] raised while dispatching a
    /// block. Everything emitted before the failing block stands; nothing
    /// is rolled back.
    pub fn run(&mut self, blocks: &[String]) -> Result<(), InterpretError> {
        self.current_block = -1;
        self.resume(blocks)
    }

    /// Resumes interpretation after a pause (e.g. `M6`), restoring the
    /// saved position first, then continues dispatching blocks from where
    /// `run`/the previous `resume` left off (spec §4.9's `resume`).
    ///
    /// Blocks past the end of `blocks` are treated as an implicit `M30`.
    ///
    /// # Errors
    ///
    /// Propagates the first [`InterpretError`] raised while dispatching a
    /// block.
    pub fn resume(&mut self, blocks: &[String]) -> Result<(), InterpretError> {
        self.state.pause = false;
        self.target.append_preamble();
        self.state.current_tool = self.state.next_tool;

        if let Some(pause_position) = self.state.pause_position {
            let mut lateral = [Some(pause_position[0]), Some(pause_position[1]), None];
            straight_motion_to_target(&mut self.state, &mut lateral, true, self.target);
            let mut vertical = [None, None, Some(pause_position[2])];
            straight_motion_to_target(&mut self.state, &mut vertical, true, self.target);
        }

        while !self.state.end && !self.state.pause {
            self.current_block = self.current_block.saturating_add(1);
            #[allow(
                clippy::cast_sign_loss,
                reason = "current_block only ever decreases via saturating_add from -1, so it's always >= 0 here"
            )]
            let index = self.current_block as usize;

            let synthetic_end;
            let block: &str = if let Some(b) = blocks.get(index) {
                b.as_str()
            } else {
                synthetic_end = String::from("M30");
                synthetic_end.as_str()
            };

            process_block(&mut self.state, block, self.target)?;
        }

        self.target.append_postamble();
        self.state.pause_position = Some(self.state.position);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::{vec, vec::Vec};

    use coverage_helper::test;
    use gcode::Axis;

    use super::*;

    #[derive(Default)]
    struct RecordingTarget {
        preambles: u32,
        postambles: u32,
        moves: Vec<(bool, [Option<i64>; 3])>,
    }

    impl Target for RecordingTarget {
        fn axes(&self) -> Vec<Axis> {
            vec![Axis::X, Axis::Y, Axis::Z]
        }
        fn append_preamble(&mut self) {
            self.preambles += 1;
        }
        fn append_postamble(&mut self) {
            self.postambles += 1;
        }
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

    fn lines(blocks: &[&str]) -> Vec<String> {
        blocks.iter().map(|s| String::from(*s)).collect()
    }

    #[test]
    fn a_bare_m30_ends_immediately_with_one_preamble_and_postamble() {
        let mut tgt = RecordingTarget::default();
        let mut interp = Interpreter::new(&mut tgt, Config::default());
        interp.run(&lines(&["M30"])).unwrap();
        assert!(interp.state().end);
        assert_eq!(tgt.preambles, 1);
        assert_eq!(tgt.postambles, 1);
        assert!(tgt.moves.is_empty());
    }

    #[test]
    fn running_off_the_end_synthesizes_an_implicit_m30() {
        let mut tgt = RecordingTarget::default();
        let mut interp = Interpreter::new(&mut tgt, Config::default());
        interp.run(&lines(&["G0 X10"])).unwrap();
        assert!(interp.state().end);
        assert_eq!(tgt.moves.len(), 1);
    }

    #[test]
    fn m6_pauses_and_resume_restores_the_saved_position_before_continuing() {
        let mut tgt = RecordingTarget::default();
        let mut interp = Interpreter::new(&mut tgt, Config::default());
        interp
            .run(&lines(&["G0 X10 Y5 Z2", "M6", "M30"]))
            .unwrap();
        assert!(interp.state().pause);
        assert!(!interp.state().end);
        assert_eq!(interp.state().pause_position, Some([10.0, 5.0, 2.0]));

        let preambles_before_resume = tgt.preambles;
        interp.resume(&lines(&["G0 X10 Y5 Z2", "M6", "M30"])).unwrap();
        assert!(interp.state().end);
        // Resume continues from the block index it paused on (M30, index
        // 2), not from the start; the restored position already matches
        // the saved one, so no further motion is emitted, only a fresh
        // preamble/postamble pair for the resumed span.
        assert_eq!(tgt.preambles, preambles_before_resume + 1);
        assert_eq!(tgt.moves.len(), 1);
    }
}
