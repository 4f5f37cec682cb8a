use gcode::{MotionCommand, ParameterTable};

/// The sticky `R`/`Z` words of a canned cycle, cleared by `G80` (spec §3,
/// §4.4).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CannedCycleWords {
    /// The retract plane, in working units (before `stretch` is applied
    /// again downstream).
    pub r: Option<f64>,
    /// The drill depth, in working units.
    pub z: Option<f64>,
}

/// Which plane `G17`/`G18`/`G19` selected. Informational only: motion
/// semantics here only ever work in `XY` (spec §3).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Plane {
    /// `G17`: the X-Y plane.
    Xy,
    /// `G18`: the X-Z plane.
    Xz,
    /// `G19`: the Y-Z plane.
    Yz,
}

/// All durable interpreter attributes, grouped into one owned record (spec
/// §9, "Modal state... group modal fields into a single owned record to
/// make save/restore at pause points trivial").
#[derive(Clone, Debug)]
pub struct ModalState {
    /// Current machine position, in working units (post-`stretch`
    /// millimeters).
    pub position: [f64; 3],
    /// Reference point for incremental-distance moves.
    pub incr_position: [f64; 3],
    /// Unit multiplier: `1.0` for mm, `25.4` for inch.
    pub stretch: f64,
    /// `true` for `G90` (absolute), `false` for `G91` (incremental).
    pub abs_distance_mode: bool,
    /// `true` for `G90.1`, `false` for `G91.1`.
    pub abs_arc_distance_mode: bool,
    /// The active plane, set by `G17`/`G18`/`G19`.
    pub plane: Plane,
    /// Configured externally; negates Z of every move.
    pub invert_z: bool,
    /// `true` until the first motion has been emitted.
    pub first_move: bool,
    /// The last explicit motion command, sticky for axis-only blocks.
    pub current_motion_command: Option<MotionCommand>,
    /// The tool currently considered loaded.
    pub current_tool: i64,
    /// The tool requested by the most recent `T` word, adopted on resume.
    pub next_tool: i64,
    /// Sticky `R`/`Z` canned-cycle words.
    pub canned_cycle_words: CannedCycleWords,
    /// `true` for `G98` (retract to prior Z), `false` for `G99` (retract to
    /// `R`).
    pub retract_to_old_z: bool,
    /// Set by `M2`/`M30`; terminates the run/resume loop.
    pub end: bool,
    /// Set by `M6`; pauses the run/resume loop for a tool change.
    pub pause: bool,
    /// The position saved when `pause` was last set, restored on resume.
    pub pause_position: Option<[f64; 3]>,
    /// The `#`-parameter table.
    pub parameters: ParameterTable,
}

impl Default for ModalState {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            incr_position: [0.0, 0.0, 0.0],
            stretch: 1.0,
            abs_distance_mode: true,
            abs_arc_distance_mode: false,
            plane: Plane::Xy,
            invert_z: false,
            first_move: true,
            current_motion_command: None,
            current_tool: 1,
            next_tool: 1,
            canned_cycle_words: CannedCycleWords::default(),
            retract_to_old_z: true,
            end: false,
            pause: false,
            pause_position: None,
            parameters: ParameterTable::default(),
        }
    }
}
