use alloc::string::String;
use core::fmt;

use gcode::ParameterError;

/// The interpreter's fatal error taxonomy (spec §7). All variants are
/// terminal: the run/resume loop stops as soon as one is produced, with no
/// partial emission beyond what already happened.
#[derive(Clone, Debug, PartialEq)]
pub enum InterpretError {
    /// Writing to a read-only `#`-parameter, or reading one that was never
    /// set.
    Parameter(ParameterError),
    /// `#<id> = <expr>` where `<expr>` isn't a bare signed-decimal literal.
    UnsupportedExpression(String),
    /// A block referenced a `#<id>` that substitution couldn't resolve.
    MissingParameter(u32),
    /// Dispatch found no handler for this instruction head.
    UnsupportedInstruction(String),
    /// A token couldn't be lexed as a word (spec §4.1: "malformed words
    /// surface at interpret time").
    MalformedWord(String),
    /// `|CA|` and `|CB|` disagree by more than `1e-3` for an arc (spec
    /// §4.7).
    StrangeCircle {
        /// Distance from the candidate center to the arc's start point.
        a: f64,
        /// Distance from the candidate center to the arc's end point.
        b: f64,
    },
    /// A canned cycle is missing its sticky `R` word.
    CannedCycleMissingR,
    /// A canned cycle is missing its sticky `Z` word.
    CannedCycleMissingZ,
    /// `L` on a canned cycle wasn't a natural number.
    CannedCycleInvalidL(i64),
    /// `G83` is missing its `Q` peck increment.
    CannedCycleMissingQ,
    /// `G83`'s `Q` peck increment wasn't strictly positive.
    CannedCycleInvalidQ(f64),
}

impl fmt::Display for InterpretError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parameter(err) => write!(f, "{err}"),
            Self::UnsupportedExpression(expr) => {
                write!(f, "unsupported expression: {expr}")
            }
            Self::MissingParameter(id) => {
                write!(f, "parameter #{id} has not been set")
            }
            Self::UnsupportedInstruction(head) => {
                write!(f, "unsupported G-Code instruction: {head}")
            }
            Self::MalformedWord(token) => {
                write!(f, "malformed word: {token}")
            }
            Self::StrangeCircle { a, b } => {
                write!(f, "strange circle a={a}, b={b}")
            }
            Self::CannedCycleMissingR => {
                write!(f, "R not set for canned cycle")
            }
            Self::CannedCycleMissingZ => {
                write!(f, "Z not set for canned cycle")
            }
            Self::CannedCycleInvalidL(l) => {
                write!(f, "L of canned cycle must be a natural number, got {l}")
            }
            Self::CannedCycleMissingQ => {
                write!(f, "Q of G83 not set")
            }
            Self::CannedCycleInvalidQ(q) => {
                write!(f, "Q of G83 must not be zero or negative, got {q}")
            }
        }
    }
}

impl From<ParameterError> for InterpretError {
    fn from(err: ParameterError) -> Self {
        Self::Parameter(err)
    }
}
