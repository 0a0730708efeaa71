// CLI text adapter - line-oriented "show" output parsed by ordered regex alternatives
//
// Each grammar exposes an ordered list of (pattern, kind) pairs. `parse_lines`
// walks the text one line at a time, tries the patterns in order and hands the
// first match to the grammar. Lines matching nothing (headers, legends, blank
// lines) are skipped.

pub mod ospf;
pub mod route;

use regex::{Captures, Regex};

use crate::error::AppResult;

/// One alternative of a line grammar
pub struct LinePattern<K> {
    pub regex: Regex,
    pub kind: K,
}

impl<K> LinePattern<K> {
    /// Build a pattern from a regex known at compile time
    pub fn new(pattern: &str, kind: K) -> Self {
        let regex = Regex::new(pattern).unwrap_or_else(|e| panic!("invalid line pattern {pattern}: {e}"));
        LinePattern { regex, kind }
    }
}

pub trait LineGrammar {
    type Kind: Copy + std::fmt::Debug + 'static;

    /// Alternatives in priority order; the first match wins
    fn patterns() -> &'static [LinePattern<Self::Kind>];

    fn on_match(&mut self, kind: Self::Kind, caps: &Captures<'_>, line_no: usize, line: &str) -> AppResult<()>;
}

/// Feed every line of `text` to `grammar`. Returns the number of matched lines.
pub fn parse_lines<G: LineGrammar>(grammar: &mut G, text: &str) -> AppResult<usize> {
    let mut matched = 0;

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        tracing::trace!("{}: LINE={}", line_no, line);

        let hit = G::patterns()
            .iter()
            .find_map(|p| p.regex.captures(line).map(|caps| (p.kind, caps)));

        if let Some((kind, caps)) = hit {
            tracing::trace!("{}: matched {:?}", line_no, kind);
            grammar.on_match(kind, &caps, line_no, line)?;
            matched += 1;
        }
    }

    Ok(matched)
}

/// Named capture as an owned string
pub(crate) fn capture(caps: &Captures<'_>, name: &str) -> Option<String> {
    caps.name(name).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::LazyLock;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Word {
        Number,
        Name,
    }

    static PATTERNS: LazyLock<Vec<LinePattern<Word>>> = LazyLock::new(|| {
        vec![
            LinePattern::new(r"^(?P<v>\d+)$", Word::Number),
            LinePattern::new(r"^(?P<v>\w+)$", Word::Name),
        ]
    });

    #[derive(Default)]
    struct Recorder {
        seen: Vec<(Word, String, usize)>,
    }

    impl LineGrammar for Recorder {
        type Kind = Word;

        fn patterns() -> &'static [LinePattern<Word>] {
            &PATTERNS
        }

        fn on_match(&mut self, kind: Word, caps: &Captures<'_>, line_no: usize, _line: &str) -> AppResult<()> {
            self.seen.push((kind, capture(caps, "v").unwrap_or_default(), line_no));
            Ok(())
        }
    }

    #[test]
    fn test_first_pattern_wins_and_unmatched_lines_are_skipped() {
        let mut recorder = Recorder::default();
        let matched = parse_lines(&mut recorder, "42\n\n-- header --\nrt1\n").unwrap();

        assert_eq!(matched, 2);
        assert_eq!(
            recorder.seen,
            vec![(Word::Number, "42".to_string(), 1), (Word::Name, "rt1".to_string(), 4)]
        );
    }
}
