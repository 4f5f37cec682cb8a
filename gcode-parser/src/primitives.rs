use gcode::Word;
use nom::{
    character::complete::{anychar, char, digit0, digit1},
    combinator::{map, opt, recognize},
    error::VerboseError,
    sequence::{pair, preceded},
    IResult,
};

/// Consumes exactly one address letter, `A`..`Z`.
pub fn address_letter(input: &str) -> IResult<&str, char, VerboseError<&str>> {
    let (rest, c) = anychar(input)?;
    if c.is_ascii_uppercase() {
        Ok((rest, c))
    } else {
        Err(nom::Err::Error(VerboseError {
            errors: alloc_errors(input, "expected an uppercase address letter"),
        }))
    }
}

/// Consumes a signed decimal literal: an optional leading `-`, digits,
/// optionally followed by `.` and more digits.
pub fn signed_number(input: &str) -> IResult<&str, f64, VerboseError<&str>> {
    let (rest, text) = recognize(pair(
        opt(char('-')),
        pair(digit1, opt(pair(char('.'), digit0))),
    ))(input)?;
    text.parse::<f64>().map_or_else(
        |_err| {
            Err(nom::Err::Error(VerboseError {
                errors: alloc_errors(input, "malformed signed decimal literal"),
            }))
        },
        |value| Ok((rest, value)),
    )
}

/// Consumes one word: an address letter immediately followed by a signed
/// decimal (spec §3).
pub fn word(input: &str) -> IResult<&str, Word, VerboseError<&str>> {
    map(
        pair(address_letter, preceded(opt(char('+')), signed_number)),
        |(address, value)| Word::new(address, value),
    )(input)
}

/// Builds a one-element `VerboseError` error list; kept out of the hot path
/// so the two call sites above stay readable.
fn alloc_errors<'a>(
    input: &'a str,
    msg: &'static str,
) -> Vec<(&'a str, nom::error::VerboseErrorKind)> {
    vec![(input, nom::error::VerboseErrorKind::Context(msg))]
}

#[cfg(test)]
mod tests {
    use coverage_helper::test;

    use super::*;

    #[test]
    fn parses_a_simple_axis_word() {
        assert_eq!(word("X10"), Ok(("", Word::new('X', 10.0))));
    }

    #[test]
    fn parses_a_command_word_with_trailing_input() {
        assert_eq!(word("G1X10"), Ok(("X10", Word::new('G', 1.0))));
    }

    #[test]
    fn parses_negative_and_fractional_values() {
        assert_eq!(word("Z-0.5"), Ok(("", Word::new('Z', -0.5))));
        assert_eq!(word("I-1.25"), Ok(("", Word::new('I', -1.25))));
    }

    #[test]
    fn rejects_a_lowercase_address() {
        assert!(word("x10").is_err());
    }

    #[test]
    fn rejects_a_missing_number() {
        assert!(word("X").is_err());
    }
}
