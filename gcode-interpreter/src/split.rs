use alloc::{string::ToString, vec, vec::Vec};

use gcode::{Axis, Instruction, MotionCommand, Word};

use crate::InterpretError;

/// Parses one whitespace-delimited token, e.g. `"X10"` or `"G1"`, into a
/// [`Word`]. Tokens reaching here are already normalized (spec §4.1), so
/// this is deliberately just the address letter plus `str::parse`, not a
/// general-purpose grammar.
///
/// # Errors
///
/// Returns [`InterpretError::MalformedWord`] if `token` is empty, its first
/// character isn't an uppercase address letter, or the remainder isn't a
/// valid signed decimal.
fn parse_word(token: &str) -> Result<Word, InterpretError> {
    let mut chars = token.chars();
    let address = chars
        .next()
        .filter(|c| c.is_ascii_uppercase())
        .ok_or_else(|| InterpretError::MalformedWord(token.to_string()))?;
    let rest = chars.as_str();
    let value = rest
        .parse::<f64>()
        .map_err(|_err| InterpretError::MalformedWord(token.to_string()))?;
    Ok(Word::new(address, value))
}

/// Splits one canonical block string into instructions (spec §4.3).
///
/// `axes` is the Target's declared axis-letter set (spec §6,
/// `Target::axes`); `current_motion_command`, when set, is the sticky
/// motion mode used for axis-only blocks.
///
/// # Errors
///
/// Returns [`InterpretError::MalformedWord`] if any token fails to lex as a
/// word.
pub fn split_block(
    block: &str,
    axes: &[Axis],
    current_motion_command: Option<MotionCommand>,
) -> Result<Vec<Instruction>, InterpretError> {
    let mut instructions: Vec<Vec<Word>> = Vec::new();
    let mut axes_command_index: Option<usize> = None;
    let mut axis_words: Vec<Word> = Vec::new();
    let mut cur: Vec<Word> = Vec::new();

    for token in block.split(' ').filter(|t| !t.is_empty()) {
        let word = parse_word(token)?;
        let first = token
            .chars()
            .next()
            .ok_or_else(|| InterpretError::MalformedWord(token.to_string()))?;

        if axes.iter().any(|axis| axis.letter() == first) {
            axis_words.push(word);
        } else if cur.first().is_some_and(|head| {
            matches!(head.head().as_str(), "M3" | "M4")
        }) && first == 'S'
        {
            cur.push(word);
        } else if first == 'F' {
            instructions.push(vec![word]);
            if let Some(idx) = axes_command_index.as_mut() {
                *idx = idx.saturating_add(1);
            }
        } else if matches!(first, 'G' | 'M' | 'S' | 'T') {
            if !cur.is_empty() {
                instructions.push(core::mem::take(&mut cur));
            }
            if is_axes_command(&word.head()) {
                axes_command_index = Some(instructions.len());
            }
            cur.push(word);
        } else {
            cur.push(word);
        }
    }

    if !cur.is_empty() {
        instructions.push(cur);
    }

    if !axis_words.is_empty() {
        if let Some(idx) = axes_command_index {
            if let Some(target) = instructions.get_mut(idx) {
                target.extend(axis_words);
            }
        } else {
            let head_str = current_motion_command.ok_or_else(|| {
                InterpretError::UnsupportedInstruction(
                    "axis words with no active motion command".to_string(),
                )
            })?;
            let head = parse_word(head_str.as_head())?;
            let mut instr = vec![head];
            instr.extend(axis_words);
            instructions.push(instr);
        }
    }

    Ok(instructions
        .into_iter()
        .filter_map(|mut words| {
            if words.is_empty() {
                None
            } else {
                let head = words.remove(0);
                Some(Instruction::new(head, words))
            }
        })
        .collect())
}

/// Whether a head word like `"G1"` names one of the motion commands that
/// accept axis words directly (spec §4.3's `axesCommands`).
fn is_axes_command(head: &str) -> bool {
    MotionCommand::from_head(head).is_some()
}

#[cfg(test)]
mod tests {
    use coverage_helper::test;

    use super::*;

    const AXES: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    #[test]
    fn splits_a_simple_motion_block() {
        let instrs = split_block("G1 X10 Y20", &AXES, None).unwrap();
        assert_eq!(instrs.len(), 1);
        assert_eq!(instrs[0].head, Word::new('G', 1.0));
        assert_eq!(instrs[0].params.len(), 2);
    }

    #[test]
    fn spindle_start_absorbs_its_speed() {
        let instrs = split_block("M3 S3000", &AXES, None).unwrap();
        assert_eq!(instrs.len(), 1);
        assert_eq!(instrs[0].head, Word::new('M', 3.0));
        assert_eq!(instrs[0].param('S'), Some(Word::new('S', 3000.0)));
    }

    #[test]
    fn feed_rate_is_flushed_as_its_own_instruction() {
        let instrs = split_block("F100 G1 X10", &AXES, None).unwrap();
        assert_eq!(instrs.len(), 2);
        assert_eq!(instrs[0].head, Word::new('F', 100.0));
        assert_eq!(instrs[1].head, Word::new('G', 1.0));
    }

    #[test]
    fn axis_only_block_uses_the_current_motion_command() {
        let instrs =
            split_block("X10 Y20", &AXES, Some(MotionCommand::Linear)).unwrap();
        assert_eq!(instrs.len(), 1);
        assert_eq!(instrs[0].head, Word::new('G', 1.0));
    }

    #[test]
    fn axis_only_block_with_no_motion_command_fails() {
        assert!(split_block("X10", &AXES, None).is_err());
    }

    #[test]
    fn malformed_token_fails() {
        assert!(split_block("x10", &AXES, None).is_err());
    }
}
