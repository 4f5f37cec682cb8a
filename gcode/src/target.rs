use alloc::vec::Vec;

use crate::Axis;

/// The downstream device codec that the interpreter drives.
///
/// Every method is fire-and-forget (spec §6): the interpreter never expects
/// a value back, and implementations should not fail — any validation that
/// can fail belongs to the interpreter itself, before it calls out here.
pub trait Target {
    /// The axis letters this target recognizes during block splitting
    /// (spec §4.3). Typically `[Axis::X, Axis::Y, Axis::Z]`.
    fn axes(&self) -> Vec<Axis>;

    /// Marks the start of a run/resume span (spec §4.9).
    fn append_preamble(&mut self);

    /// Marks the end of a run/resume span (spec §4.9).
    fn append_postamble(&mut self);

    /// Sets the feed rate, in micrometers per second.
    fn set_feed_rate(&mut self, micro_units_per_second: i64);

    /// Sets the spindle speed as a 0..=255 PWM-style duty code (spec §4.5).
    fn set_spindle_speed(&mut self, pwm: u8);

    /// Configures the spindle direction/enable state.
    ///
    /// `ccw` is `None` when the spindle is being disabled and direction is
    /// moot. `speed`, when present, is the *raw* commanded speed (spec §9:
    /// the PWM-duty and raw-speed interpretations of `S` disagree in the
    /// original source, so both are exposed and the choice is left to the
    /// target).
    fn set_spindle_config(&mut self, ccw: Option<bool>, enable: bool, speed: Option<i64>);

    /// Turns on mist/flood coolant (spec §4.4 aliases `M8` to `M7`).
    fn set_coolant_mist(&mut self);

    /// Turns coolant off.
    fn set_coolant_off(&mut self);

    /// Emits a straight motion. `machine_pos` holds integer micrometers per
    /// axis, or `None` for axes that didn't change (spec §4.6).
    fn straight_motion(
        &mut self,
        rapid: bool,
        long_move_axis: Option<Axis>,
        machine_pos: [Option<i64>; 3],
    );

    /// Emits an arc motion. `dx_center`/`dy_center` are integer
    /// micrometers from the current position to the arc center;
    /// `sweep_micro_rad` is the swept angle in microradians, negative for
    /// clockwise (spec §4.7).
    fn circle_motion(&mut self, dx_center: i64, dy_center: i64, sweep_micro_rad: i64);
}
