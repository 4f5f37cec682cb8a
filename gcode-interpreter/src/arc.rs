use gcode::{Instruction, Target};

use crate::{motion::vector_add, InterpretError, ModalState};

/// `angleCalc` for clockwise arcs (spec §4.7): the angle of `(x, y)` as seen
/// from the arc center, folded into `[0, 2π)` such that increasing angle
/// runs clockwise.
fn angle_calc_cw(x: f64, y: f64) -> f64 {
    let x = round_to(x, 6);
    let mut alpha = x.acos();
    if y > 0.0 {
        alpha = 2.0 * core::f64::consts::PI - alpha;
    }
    alpha
}

/// `angleCalc` for counterclockwise arcs (spec §4.7).
fn angle_calc_ccw(x: f64, y: f64) -> f64 {
    let x = round_to(x, 6);
    let mut alpha = x.acos();
    if y < 0.0 {
        alpha = 2.0 * core::f64::consts::PI - alpha;
    }
    alpha
}

/// Rounds `value` to `digits` decimal places.
fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}

/// The inner angle `beta - alpha` swept from `a` to `b` around candidate
/// center `(xc, yc)`, used only to pick between the two radius-form
/// candidate centers (spec §4.7's `_calcInnerAngle`).
///
/// # Errors
///
/// Returns [`InterpretError::StrangeCircle`] if the candidate center isn't
/// equidistant (within `1e-3`) from `a` and `b`.
fn inner_angle(
    xa: f64,
    ya: f64,
    xb: f64,
    yb: f64,
    xc: f64,
    yc: f64,
    angle_calc: fn(f64, f64) -> f64,
) -> Result<f64, InterpretError> {
    let a = ((xb - xc).powi(2) + (yb - yc).powi(2)).sqrt();
    let b = ((xc - xa).powi(2) + (yc - ya).powi(2)).sqrt();

    if round_to(a - b, 3).abs() > f64::EPSILON {
        return Err(InterpretError::StrangeCircle { a, b });
    }

    let alpha = angle_calc((xa - xc) / a, (ya - yc) / a);
    let mut beta = angle_calc((xb - xc) / a, (yb - yc) / a);
    if beta < alpha {
        beta += 2.0 * core::f64::consts::PI;
    }
    Ok(beta - alpha)
}

/// Emits a `G2`/`G3` arc motion (spec §4.7's `_circleMotion`).
///
/// # Errors
///
/// Returns [`InterpretError::StrangeCircle`] if the resolved center isn't
/// equidistant from the arc's start and end points within `1e-3`.
pub fn circle_motion<T: Target>(
    state: &mut ModalState,
    instr: &Instruction,
    ccw: bool,
    tgt: &mut T,
) -> Result<(), InterpretError> {
    let angle_calc = if ccw { angle_calc_ccw } else { angle_calc_cw };

    let move_xy = crate::motion::read_axes(&instr.params, state.stretch);
    let target = if state.abs_distance_mode {
        move_xy
    } else {
        vector_add(move_xy, state.incr_position)
    };

    let xa = state.position[0];
    let ya = state.position[1];
    let xb = target[0].unwrap_or(state.position[0]);
    let yb = target[1].unwrap_or(state.position[1]);

    let (xc, yc) = if let Some(radius) = instr.param('R') {
        resolve_radius_center(xa, ya, xb, yb, radius.value, angle_calc)?
    } else {
        let i = instr.param('I').map(|w| w.value * state.stretch);
        let j = instr.param('J').map(|w| w.value * state.stretch);
        if state.abs_arc_distance_mode {
            (i.unwrap_or(0.0), j.unwrap_or(0.0))
        } else {
            (
                i.map_or(xa, |v| xa + v),
                j.map_or(ya, |v| ya + v),
            )
        }
    };

    let a = ((xb - xc).powi(2) + (yb - yc).powi(2)).sqrt();
    let b = ((xc - xa).powi(2) + (yc - ya).powi(2)).sqrt();
    if round_to(a - b, 3).abs() > f64::EPSILON {
        return Err(InterpretError::StrangeCircle { a, b });
    }
    let c = ((xa - xb).powi(2) + (ya - yb).powi(2)).sqrt();

    let mut gamma = ((a.powi(2) + b.powi(2) - c.powi(2)) / (2.0 * a * b)).acos();

    let alpha = angle_calc((xa - xc) / a, (ya - yc) / a);
    let mut beta = angle_calc((xb - xc) / a, (yb - yc) / a);
    if beta < alpha {
        beta += 2.0 * core::f64::consts::PI;
    }
    if beta - alpha > core::f64::consts::PI {
        gamma += core::f64::consts::PI;
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "machine coordinates are bounded well within i64 range"
    )]
    let dx_center = ((xc - xa) * 1000.0).round() as i64;
    #[allow(
        clippy::cast_possible_truncation,
        reason = "machine coordinates are bounded well within i64 range"
    )]
    let dy_center = ((yc - ya) * 1000.0).round() as i64;

    let mut sweep = gamma * 1_000_000.0;
    if !ccw {
        sweep = -sweep;
    }
    // WinPC-NC seems to always ceil the value, for whatever reason.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "swept angle in microradians stays well within i64 range"
    )]
    let sweep_micro_rad = sweep.ceil() as i64;

    tgt.circle_motion(dx_center, dy_center, sweep_micro_rad);

    for i in 0..3 {
        if let Some(value) = target[i] {
            state.position[i] = value;
            state.incr_position[i] = value;
        }
    }
    state.first_move = false;

    Ok(())
}

/// Resolves the arc center for the radius form of `G2`/`G3` (spec §4.7,
/// "Radius form").
///
/// Of the two points equidistant from `a` at `|r|` that also sit on the
/// perpendicular bisector of `a`-`b`, picks whichever subtends the smaller
/// inner angle; a negative radius picks the other one (the major-arc
/// convention).
fn resolve_radius_center(
    xa: f64,
    ya: f64,
    xb: f64,
    yb: f64,
    radius: f64,
    angle_calc: fn(f64, f64) -> f64,
) -> Result<(f64, f64), InterpretError> {
    let r = radius.powi(2);

    let a = -((-2.0 * ya) - (-2.0 * yb)) / ((-2.0 * xa) - (-2.0 * xb));
    let b =
        -((xa * xa + ya * ya - r) - (xb * xb + yb * yb - r)) / ((-2.0 * xa) - (-2.0 * xb));
    let p = (-2.0 * (xa - b) * a - 2.0 * ya) / (a * a + 1.0);
    let q = ((xa - b) * (xa - b) + ya * ya - r) / (a * a + 1.0);
    let discriminant = (p * p) / 4.0 - q;
    let y1 = -p / 2.0 + discriminant.sqrt();
    let y2 = -p / 2.0 - discriminant.sqrt();
    let x1 = a * y1 + b;
    let x2 = a * y2 + b;

    let angle1 = inner_angle(xa, ya, xb, yb, x1, y1, angle_calc)?;
    let angle2 = inner_angle(xa, ya, xb, yb, x2, y2, angle_calc)?;
    let mut prefer_first = angle1 < angle2;
    if radius < 0.0 {
        prefer_first = !prefer_first;
    }

    Ok(if prefer_first { (x1, y1) } else { (x2, y2) })
}
