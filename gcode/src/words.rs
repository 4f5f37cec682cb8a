use alloc::{
    string::{String, ToString},
    vec::Vec,
};
use core::fmt;

use serde::{Deserialize, Serialize};

/// One letter-address plus signed-decimal word, e.g. `X10` or `G1`.
///
/// Mirrors the grammar in spec §3: "A letter `A…Z` immediately followed by
/// a signed decimal."
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// The address letter, always uppercase.
    pub address: char,
    /// The signed decimal value following the address.
    pub value: f64,
}

impl Word {
    /// Builds a word from its address letter and numeric value.
    #[must_use]
    pub const fn new(address: char, value: f64) -> Self {
        Self { address, value }
    }

    /// Returns the integer-rounded head, e.g. `G1` for `Word::new('G',
    /// 1.0)`. Used to match against command heads such as `"G1"` or `"M3"`.
    #[must_use]
    pub fn head(&self) -> String {
        let mut out = String::new();
        out.push(self.address);
        if value_is_integral(self.value) {
            // SAFETY-free cast: only used for values already known to be
            // integral, so truncation never loses information.
            #[allow(
                clippy::cast_possible_truncation,
                reason = "guarded by value_is_integral"
            )]
            let int_val = self.value as i64;
            let _ = fmt::Write::write_fmt(&mut out, format_args!("{int_val}"));
        } else {
            let _ = fmt::Write::write_fmt(&mut out, format_args!("{}", self.value));
        }
        out
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.head())
    }
}

/// Returns `true` when `value` has no fractional part, within normal
/// floating-point rounding tolerance. Used both for formatting words and
/// for reproducing substituted `#`-parameters (spec §9, "Numeric formatting
/// of substituted parameters").
#[must_use]
pub fn value_is_integral(value: f64) -> bool {
    (value - value.trunc()).abs() < f64::EPSILON
}

/// An ordered command plus its parameter words (spec §3, "Instruction").
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// The head word, e.g. `G1` or `M3`.
    pub head: Word,
    /// Parameter words following the head, in original order.
    pub params: Vec<Word>,
}

impl Instruction {
    /// Builds an instruction from a head word and its parameters.
    #[must_use]
    pub const fn new(head: Word, params: Vec<Word>) -> Self {
        Self { head, params }
    }

    /// Returns the first parameter word with the given address letter, if
    /// present.
    #[must_use]
    pub fn param(&self, address: char) -> Option<Word> {
        self.params.iter().copied().find(|w| w.address == address)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.head)?;
        for p in &self.params {
            write!(f, " {p}")?;
        }
        Ok(())
    }
}

/// A machine axis. Controllers in this dialect move along up to three.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// The X axis.
    X,
    /// The Y axis.
    Y,
    /// The Z axis.
    Z,
}

impl Axis {
    /// The address letter for this axis, e.g. `'X'`.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::X => 'X',
            Self::Y => 'Y',
            Self::Z => 'Z',
        }
    }

    /// This axis's index into a `[T; 3]` position/offset array.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Maps an address letter to the axis it names, if it is one of `X`,
    /// `Y`, or `Z`.
    #[must_use]
    pub const fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'X' => Some(Self::X),
            'Y' => Some(Self::Y),
            'Z' => Some(Self::Z),
            _ => None,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// The sticky motion mode tracked by `currentMotionCommand` (spec §3).
///
/// Only these G-codes accept axis words directly (spec §4.3's
/// `axesCommands`), and only these remain in effect across axis-only
/// blocks.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum MotionCommand {
    /// `G0`: rapid straight motion.
    Rapid,
    /// `G1`: coordinated (feed-rate) straight motion.
    Linear,
    /// `G2`: clockwise arc.
    ArcCw,
    /// `G3`: counterclockwise arc.
    ArcCcw,
    /// `G81`: canned drilling cycle, no dwell, no peck.
    DrillPlain,
    /// `G82`: canned drilling cycle with dwell at the bottom.
    DrillDwell,
    /// `G83`: canned peck-drilling cycle.
    DrillPeck,
}

impl MotionCommand {
    /// Parses the `G*` head word of a motion command, if `head` names one.
    #[must_use]
    pub fn from_head(head: &str) -> Option<Self> {
        match head {
            "G0" => Some(Self::Rapid),
            "G1" => Some(Self::Linear),
            "G2" => Some(Self::ArcCw),
            "G3" => Some(Self::ArcCcw),
            "G81" => Some(Self::DrillPlain),
            "G82" => Some(Self::DrillDwell),
            "G83" => Some(Self::DrillPeck),
            _ => None,
        }
    }

    /// The canonical `G*` head string for this motion command.
    #[must_use]
    pub const fn as_head(self) -> &'static str {
        match self {
            Self::Rapid => "G0",
            Self::Linear => "G1",
            Self::ArcCw => "G2",
            Self::ArcCcw => "G3",
            Self::DrillPlain => "G81",
            Self::DrillDwell => "G82",
            Self::DrillPeck => "G83",
        }
    }

    /// Whether this motion command is one of the three canned drilling
    /// cycles (spec §4.8).
    #[must_use]
    pub const fn is_canned_cycle(self) -> bool {
        matches!(self, Self::DrillPlain | Self::DrillDwell | Self::DrillPeck)
    }
}

impl fmt::Display for MotionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_head())
    }
}

#[cfg(test)]
mod tests {
    use coverage_helper::test;

    use super::*;

    #[test]
    fn word_head_formats_integral_values_without_a_decimal_point() {
        assert_eq!(Word::new('G', 1.0).head(), "G1".to_string());
        assert_eq!(Word::new('X', 0.0).head(), "X0".to_string());
    }

    #[test]
    fn word_head_formats_fractional_values_with_a_decimal_point() {
        assert_eq!(Word::new('X', 0.5).head(), "X0.5".to_string());
    }

    #[test]
    fn instruction_param_finds_the_first_matching_address() {
        let instr = Instruction::new(
            Word::new('G', 1.0),
            alloc::vec![Word::new('X', 1.0), Word::new('Y', 2.0)],
        );
        assert_eq!(instr.param('Y'), Some(Word::new('Y', 2.0)));
        assert_eq!(instr.param('Z'), None);
    }

    #[test]
    fn axis_round_trips_through_its_letter() {
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            assert_eq!(Axis::from_letter(axis.letter()), Some(axis));
        }
        assert_eq!(Axis::from_letter('A'), None);
    }

    #[test]
    fn motion_command_round_trips_through_its_head() {
        for mc in [
            MotionCommand::Rapid,
            MotionCommand::Linear,
            MotionCommand::ArcCw,
            MotionCommand::ArcCcw,
            MotionCommand::DrillPlain,
            MotionCommand::DrillDwell,
            MotionCommand::DrillPeck,
        ] {
            assert_eq!(MotionCommand::from_head(mc.as_head()), Some(mc));
        }
        assert_eq!(MotionCommand::from_head("G17"), None);
    }
}
