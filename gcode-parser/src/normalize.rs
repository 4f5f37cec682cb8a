use std::collections::BTreeMap;

/// The canonical blocks and `N`-word index produced by [`normalize`] (spec
/// §3, "Block"; spec §4.1 step 8).
///
/// This is the Block Source's entire output: a pure transformation of the
/// input text, with no further validation (spec §4.1, "The parser itself
/// raises none; malformed words surface at interpret time").
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ParsedProgram {
    /// Canonical block strings, in source order.
    blocks: Vec<String>,
    /// Maps a sequence number (the integer following `N`) to the index of
    /// the block it labeled, with the `N` word itself stripped.
    sequence_numbers: BTreeMap<u32, usize>,
}

impl ParsedProgram {
    /// The canonical blocks, in source order.
    #[must_use]
    pub fn blocks(&self) -> &[String] {
        &self.blocks
    }

    /// The block at `index`, if any.
    #[must_use]
    pub fn block(&self, index: usize) -> Option<&str> {
        self.blocks.get(index).map(String::as_str)
    }

    /// The number of canonical blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether there are no canonical blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Looks up the block index that was labeled `Nn` in the source.
    #[must_use]
    pub fn block_for_sequence_number(&self, n: u32) -> Option<usize> {
        self.sequence_numbers.get(&n).copied()
    }
}

/// Runs the full normalization pipeline over raw G-code source text (spec
/// §4.1). Each step is idempotent; running the whole pipeline twice is
/// equivalent to running it once.
#[must_use]
pub fn normalize(source: &str) -> ParsedProgram {
    let mut lines = load_and_trim(source);
    strip_tape_markers(&mut lines);
    for line in &mut lines {
        strip_inline_comments(line);
    }
    for line in &mut lines {
        strip_eol_comments(line);
    }
    strip_block_skip_lines(&mut lines);
    for line in &mut lines {
        collapse_address_whitespace(line);
    }
    for line in &mut lines {
        strip_leading_zeros(line);
    }
    let sequence_numbers = strip_sequence_numbers(&mut lines);

    ParsedProgram {
        blocks: lines,
        sequence_numbers,
    }
}

/// Step 1: trim every line, then drop lines that are empty after trimming
/// from the leading and trailing edges (spec §4.1 step 1 keeps interior
/// blank lines out entirely too — a G-code program has no notion of
/// intentional blank blocks).
fn load_and_trim(source: &str) -> Vec<String> {
    source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Step 2: drop a leading/trailing tape-marker (`%`) line.
fn strip_tape_markers(lines: &mut Vec<String>) {
    if lines.first().is_some_and(|l| l.starts_with('%')) {
        lines.remove(0);
    }
    if lines.last().is_some_and(|l| l.starts_with('%')) {
        lines.pop();
    }
}

/// Step 3: repeatedly remove `(...)` spans (no nested parens) together with
/// any whitespace touching them, substituting a single space for the whole
/// matched span, until a full pass makes no change — mirroring the
/// original's `re.sub(r'\s*\([^()]+\)\s*', ' ', x)` exactly, so a comment
/// abutting two words with no whitespace of its own (`S1000(rpm)M3`) still
/// ends up with a separating space (`S1000 M3`) rather than merging them.
fn strip_inline_comments(line: &mut String) {
    loop {
        // Innermost pair first: the nearest unmatched `(` before the first
        // `)` that follows it, same as `[^()]+` refusing to span a nested
        // open paren.
        let mut last_open = None;
        let mut pair = None;
        for (i, c) in line.char_indices() {
            match c {
                '(' => last_open = Some(i),
                ')' => {
                    if let Some(open) = last_open {
                        pair = Some((open, i));
                        break;
                    }
                }
                _ => {}
            }
        }
        let Some((open, close)) = pair else { break };

        let before_start = line[..open].trim_end().len();
        let after_end = close + 1 + line[close + 1..].len()
            - line[close + 1..].trim_start().len();

        let mut replacement = String::with_capacity(before_start + 1 + (line.len() - after_end));
        replacement.push_str(&line[..before_start]);
        replacement.push(' ');
        replacement.push_str(&line[after_end..]);
        *line = replacement;
    }
    let trimmed = line.trim();
    if trimmed.len() != line.len() {
        *line = trimmed.to_string();
    }
}

/// Step 4: delete `;` and everything after it.
fn strip_eol_comments(line: &mut String) {
    if let Some(pos) = line.find(';') {
        line.truncate(pos);
        let trimmed_len = line.trim_end().len();
        line.truncate(trimmed_len);
    }
}

/// Step 5: drop every line whose first non-whitespace character is `/`.
fn strip_block_skip_lines(lines: &mut Vec<String>) {
    lines.retain(|line| !line.trim_start().starts_with('/'));
}

/// Step 6: collapse whitespace between an address letter and its number,
/// e.g. `X 10` -> `X10`, `G  0` -> `G0`.
fn collapse_address_whitespace(line: &mut String) {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        out.push(c);
        if c.is_ascii_uppercase() {
            let mut j = i + 1;
            while j < chars.len() && chars[j] == ' ' {
                j += 1;
            }
            if j > i + 1 && j < chars.len() && is_number_start(chars[j]) {
                i = j;
                continue;
            }
        }
        i += 1;
    }
    *line = out;
}

/// Whether `c` can start the numeric tail of a word.
const fn is_number_start(c: char) -> bool {
    matches!(c, '0'..='9' | '.' | '-' | '+')
}

/// Step 7: strip runs of leading zeros in the integer part of a word's
/// number, e.g. `G01` -> `G1`, `X007` -> `X7`, while preserving `X0` and
/// `X0.5`.
fn strip_leading_zeros(line: &mut String) {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        out.push(c);
        if c.is_ascii_uppercase() && i + 1 < chars.len() {
            let mut j = i + 1;
            let negative = chars[j] == '-';
            if negative {
                out.push('-');
                j += 1;
            }
            let zeros_start = j;
            while j < chars.len() && chars[j] == '0' {
                j += 1;
            }
            let stripped_more_than_needed =
                j > zeros_start && j < chars.len() && chars[j].is_ascii_digit();
            if stripped_more_than_needed {
                // Drop every leading zero; the remaining digit (or
                // fractional number like `0.5`) carries the value.
                i = j;
                continue;
            } else if j > zeros_start {
                // All zeros, next char isn't a digit (e.g. "X0", "X0.5"):
                // keep exactly one zero.
                out.push('0');
                i = j;
                continue;
            }
            i = zeros_start;
            continue;
        }
        i += 1;
    }
    *line = out;
}

/// Step 8: for any line beginning (after optional whitespace) with
/// `N<digits>`, strip the `N` word and record the block index it labeled.
fn strip_sequence_numbers(lines: &mut [String]) -> BTreeMap<u32, usize> {
    let mut sequence_numbers = BTreeMap::new();
    for (index, line) in lines.iter_mut().enumerate() {
        let trimmed = line.trim_start();
        if !trimmed.starts_with('N') {
            continue;
        }
        let digits_end = trimmed[1..]
            .char_indices()
            .take_while(|(_, c)| c.is_ascii_digit())
            .last()
            .map_or(0, |(i, _)| i + 1);
        if digits_end == 0 {
            continue;
        }
        let Ok(n) = trimmed[1..=digits_end].parse::<u32>() else {
            continue;
        };
        sequence_numbers.insert(n, index);
        let rest = trimmed[1 + digits_end..].trim_start().to_string();
        *line = rest;
    }
    sequence_numbers
}

#[cfg(test)]
mod tests {
    use coverage_helper::test;

    use super::*;

    #[test]
    fn trims_and_drops_empty_lines() {
        let program = normalize("\n  G0 X0  \n\n  G1 Y1\n\n");
        assert_eq!(program.blocks(), &["G0 X0", "G1 Y1"]);
    }

    #[test]
    fn strips_leading_and_trailing_tape_markers() {
        let program = normalize("%\nG0 X0\n%");
        assert_eq!(program.blocks(), &["G0 X0"]);
    }

    #[test]
    fn strips_multiple_inline_comments_per_line() {
        let program = normalize("G0 (go home) X0 (fast)");
        assert_eq!(program.blocks(), &["G0 X0"]);
    }

    #[test]
    fn inline_comment_abutting_both_neighbors_still_separates_them() {
        let program = normalize("S1000(rpm)M3");
        assert_eq!(program.blocks(), &["S1000 M3"]);
    }

    #[test]
    fn strips_eol_comments() {
        let program = normalize("G0 X0 ; rapid to home");
        assert_eq!(program.blocks(), &["G0 X0"]);
    }

    #[test]
    fn drops_block_skip_lines() {
        let program = normalize("G0 X0\n/G1 Y1\nG1 Z1");
        assert_eq!(program.blocks(), &["G0 X0", "G1 Z1"]);
    }

    #[test]
    fn collapses_address_whitespace() {
        let program = normalize("X 10 G  0");
        assert_eq!(program.blocks(), &["X10 G0"]);
    }

    #[test]
    fn strips_leading_zeros_but_preserves_zero_and_decimals() {
        let program = normalize("G01 X007 X0 X0.5");
        assert_eq!(program.blocks(), &["G1 X7 X0 X0.5"]);
    }

    #[test]
    fn records_sequence_numbers_and_strips_the_n_word() {
        let program = normalize("N10 G0 X0\nN20 G1 Y1");
        assert_eq!(program.blocks(), &["G0 X0", "G1 Y1"]);
        assert_eq!(program.block_for_sequence_number(10), Some(0));
        assert_eq!(program.block_for_sequence_number(20), Some(1));
    }

    #[test]
    fn pipeline_is_idempotent() {
        let source = "N10 G01 X 007 (comment) ; trailing\n/G1 Y1\n%\nG0 X0\n%";
        let once = normalize(source);
        let twice_source = once.blocks().join("\n");
        let twice = normalize(&twice_source);
        assert_eq!(once.blocks(), twice.blocks());
    }

    #[test]
    fn normalization_closes_out_comment_characters() {
        let program = normalize("G0 (a (nested-looking) comment) X0 ; tail");
        for block in program.blocks() {
            assert!(!block.contains('('));
            assert!(!block.contains(')'));
            assert!(!block.contains(';'));
        }
    }
}
