use alloc::{
    format,
    string::{String, ToString},
    vec::Vec,
};

use gcode::{Axis, Instruction, MotionCommand, Target, Word, value_is_integral};

use crate::{
    arc::circle_motion,
    canned_cycle::process_canned_cycle,
    motion::{read_axes, straight_motion_to_target, vector_add},
    split::split_block,
    CannedCycleWords, InterpretError, ModalState, Plane,
};

/// Processes one canonical block (spec §4.2): parameter assignment or
/// substitution, splitting, reordering, then dispatching each resulting
/// instruction in turn.
///
/// Returns `Ok(true)` if the block was a parameter assignment (and so
/// nothing further needs dispatching for it).
///
/// # Errors
///
/// Propagates any [`InterpretError`] raised while evaluating an expression,
/// substituting a parameter, splitting the block, or dispatching an
/// instruction.
pub fn process_block<T: Target>(
    state: &mut ModalState,
    block: &str,
    tgt: &mut T,
) -> Result<(), InterpretError> {
    if try_assign_parameter(state, block)? {
        return Ok(());
    }

    let substituted = substitute_parameters(block, state)?;
    let axes = tgt.axes();
    let mut instructions =
        split_block(&substituted, &axes, state.current_motion_command)?;
    reorder_feed_first(&mut instructions);

    for instr in &instructions {
        process_instruction(state, instr, tgt)?;
    }

    Ok(())
}

/// Matches `#<id> = <expr>`, evaluates `<expr>`, and writes it to the
/// parameter table (spec §4.2 step 1).
///
/// # Errors
///
/// Returns [`InterpretError::UnsupportedExpression`] if the right-hand side
/// isn't a bare signed-decimal literal, or an [`InterpretError::Parameter`]
/// if the id isn't writable.
fn try_assign_parameter(
    state: &mut ModalState,
    block: &str,
) -> Result<bool, InterpretError> {
    let trimmed = block.trim_start();
    let Some(rest) = trimmed.strip_prefix('#') else {
        return Ok(false);
    };

    let digits_end = rest
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map_or(0, |(i, _)| i + 1);
    if digits_end == 0 {
        return Ok(false);
    }

    let after_digits = rest[digits_end..].trim_start();
    let Some(expr) = after_digits.strip_prefix('=') else {
        return Ok(false);
    };

    let id: u32 = rest[..digits_end]
        .parse()
        .map_err(|_err| InterpretError::MalformedWord(block.to_string()))?;
    let value = eval_expression(expr.trim())?;
    state.parameters.write(id, value)?;
    Ok(true)
}

/// Evaluates a `#`-parameter assignment's right-hand side. Only a bare
/// signed-decimal literal is supported (spec §4.2 step 1).
///
/// # Errors
///
/// Returns [`InterpretError::UnsupportedExpression`] for anything else.
fn eval_expression(expr: &str) -> Result<f64, InterpretError> {
    let is_literal = !expr.is_empty()
        && expr
            .chars()
            .enumerate()
            .all(|(i, c)| c.is_ascii_digit() || c == '.' || (i == 0 && c == '-'));
    if !is_literal {
        return Err(InterpretError::UnsupportedExpression(expr.to_string()));
    }
    expr.parse::<f64>()
        .map_err(|_err| InterpretError::UnsupportedExpression(expr.to_string()))
}

/// Replaces every `#<id>` occurrence in `block` with its current value,
/// formatted as an integer when the value is integral, else as a plain
/// decimal (spec §4.2 step 2, spec §9 "Numeric formatting of substituted
/// parameters").
///
/// # Errors
///
/// Returns [`InterpretError::MissingParameter`] if a referenced id has
/// never been written.
fn substitute_parameters(
    block: &str,
    state: &ModalState,
) -> Result<String, InterpretError> {
    let mut out = String::with_capacity(block.len());
    let mut rest = block;

    while let Some(hash_pos) = rest.find('#') {
        out.push_str(&rest[..hash_pos]);
        let after_hash = &rest[hash_pos + 1..];
        let digits_end = after_hash
            .char_indices()
            .take_while(|(_, c)| c.is_ascii_digit())
            .last()
            .map_or(0, |(i, _)| i + 1);

        if digits_end == 0 {
            out.push('#');
            rest = after_hash;
            continue;
        }

        let id: u32 = after_hash[..digits_end]
            .parse()
            .map_err(|_err| InterpretError::MissingParameter(0))?;
        let value = state
            .parameters
            .read(id)
            .map_err(|_err| InterpretError::MissingParameter(id))?;
        out.push_str(&format_parameter_value(value));
        rest = &after_hash[digits_end..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Formats a substituted parameter value: an integer with no decimal point
/// when integral, else a plain decimal with no trailing noise (spec §9).
fn format_parameter_value(value: f64) -> String {
    if value_is_integral(value) {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "guarded by value_is_integral"
        )]
        let int_val = value as i64;
        format!("{int_val}")
    } else {
        format!("{value}")
    }
}

/// Stably reorders instructions so any `F` instruction comes first,
/// preserving relative order otherwise (spec §4.2 step 4).
fn reorder_feed_first(instructions: &mut [Instruction]) {
    instructions.sort_by_key(|instr| if instr.head.address == 'F' { 0 } else { 1 });
}

/// Dispatches one instruction by its head (spec §4.4).
///
/// # Errors
///
/// Returns [`InterpretError::UnsupportedInstruction`] for an unrecognized
/// head, or propagates errors from motion/arc/canned-cycle processing.
fn process_instruction<T: Target>(
    state: &mut ModalState,
    instr: &Instruction,
    tgt: &mut T,
) -> Result<(), InterpretError> {
    if let Some(mc) = MotionCommand::from_head(&instr.head.head()) {
        state.current_motion_command = Some(mc);
    }

    match instr.head.address {
        'F' => {
            process_feed(state, &instr.head, tgt);
            Ok(())
        }
        'S' => {
            process_spindle_speed(&instr.head, tgt);
            Ok(())
        }
        'T' => {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "tool numbers are small non-negative integers"
            )]
            let tool = instr.head.value as i64;
            state.next_tool = tool;
            Ok(())
        }
        'G' | 'M' => process_g_or_m(state, instr, tgt),
        _ => Err(InterpretError::UnsupportedInstruction(instr.head.head())),
    }
}

/// `F<v>`: feed rate in micrometers per second (spec §4.5).
fn process_feed<T: Target>(state: &ModalState, head: &Word, tgt: &mut T) {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "feed rates stay well within i64 range"
    )]
    let micro_units_per_second =
        (head.value * state.stretch * 1000.0 / 60.0).round() as i64;
    tgt.set_feed_rate(micro_units_per_second);
}

/// `S<v>` alone: PWM-style spindle duty (spec §4.5).
fn process_spindle_speed<T: Target>(head: &Word, tgt: &mut T) {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "clamped to at most 255 just above; negative speeds aren't meaningful"
    )]
    let pwm = (head.value * 0.0141).round().min(255.0) as u8;
    tgt.set_spindle_speed(pwm);
}

/// `M3`/`M4`/`M5`: spindle direction/enable, with an optional attached `S`
/// speed (spec §4.5). `speed` is the raw commanded value, not the PWM duty
/// — it's `0` (not `None`) when `S0` is given explicitly.
fn set_spindle_config<T: Target>(
    instr: &Instruction,
    ccw: Option<bool>,
    enable: bool,
    tgt: &mut T,
) {
    let speed = if enable {
        instr.param('S').map(|s| {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "spindle speeds stay well within i64 range"
            )]
            let value = s.value as i64;
            value
        })
    } else {
        None
    };
    tgt.set_spindle_config(ccw, enable, speed);
}

/// Dispatches a `G*`/`M*` head per the table in spec §4.4.
fn process_g_or_m<T: Target>(
    state: &mut ModalState,
    instr: &Instruction,
    tgt: &mut T,
) -> Result<(), InterpretError> {
    match instr.head.head().as_str() {
        "G0" => {
            straight_line(state, instr, true, tgt);
            Ok(())
        }
        "G1" => {
            straight_line(state, instr, false, tgt);
            Ok(())
        }
        "G2" => circle_motion(state, instr, false, tgt),
        "G3" => circle_motion(state, instr, true, tgt),
        "G4" | "G04" => Ok(()),
        "G17" => {
            state.plane = Plane::Xy;
            Ok(())
        }
        "G18" => {
            state.plane = Plane::Xz;
            Ok(())
        }
        "G19" => {
            state.plane = Plane::Yz;
            Ok(())
        }
        "G20" => {
            state.stretch = 25.4;
            Ok(())
        }
        "G21" => {
            state.stretch = 1.0;
            Ok(())
        }
        "G40" | "G49" | "G54" | "G61" | "G64" => Ok(()),
        "G80" => {
            state.canned_cycle_words = CannedCycleWords::default();
            Ok(())
        }
        "G81" => process_canned_cycle(state, instr, false, tgt),
        "G82" => process_canned_cycle(state, instr, false, tgt),
        "G83" => process_canned_cycle(state, instr, true, tgt),
        "G90" => {
            state.abs_distance_mode = true;
            Ok(())
        }
        "G90.1" => {
            state.abs_arc_distance_mode = true;
            Ok(())
        }
        "G91" => {
            state.abs_distance_mode = false;
            Ok(())
        }
        "G91.1" => {
            state.abs_arc_distance_mode = false;
            Ok(())
        }
        "G98" => {
            state.retract_to_old_z = true;
            Ok(())
        }
        "G99" => {
            state.retract_to_old_z = false;
            Ok(())
        }
        "M2" | "M30" => {
            state.end = true;
            Ok(())
        }
        "M3" => {
            set_spindle_config(instr, Some(false), true, tgt);
            Ok(())
        }
        "M4" => {
            set_spindle_config(instr, Some(true), true, tgt);
            Ok(())
        }
        "M5" => {
            set_spindle_config(instr, None, false, tgt);
            Ok(())
        }
        "M6" => {
            state.pause = true;
            Ok(())
        }
        "M7" | "M8" => {
            tgt.set_coolant_mist();
            Ok(())
        }
        "M9" => {
            tgt.set_coolant_off();
            Ok(())
        }
        other => Err(InterpretError::UnsupportedInstruction(other.to_string())),
    }
}

/// `G0`/`G1`: straight motion, rapid or coordinated (spec §4.6).
fn straight_line<T: Target>(
    state: &mut ModalState,
    instr: &Instruction,
    rapid: bool,
    tgt: &mut T,
) {
    let mut move_xyz = read_axes(&instr.params, state.stretch);
    if state.invert_z {
        move_xyz[Axis::Z.index()] = move_xyz[Axis::Z.index()].map(|z| -z);
    }

    let mut target = if state.abs_distance_mode {
        move_xyz
    } else {
        vector_add(move_xyz, state.incr_position)
    };

    straight_motion_to_target(state, &mut target, rapid, tgt);
}
