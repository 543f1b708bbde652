//! Splitting mixed prose/math strings into spans.
//!
//! Math runs are delimited by paired `$` characters. Everything between an
//! opening and a closing `$` is math source, everything else is prose. A
//! `$` with no partner opens a run that extends to the end of the string.

use std::borrow::Cow;

/// Marks the start and end of an inline math run.
pub const DELIMITER: char = '$';

/// One contiguous run of mixed content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Span<'a> {
    /// Literal prose, shown verbatim.
    Text(&'a str),
    /// Math source between two delimiters.
    Math {
        source: &'a str,
        /// False for a trailing run whose closing delimiter is missing.
        closed: bool,
    },
}

impl<'a> Span<'a> {
    /// A math span with both delimiters present.
    pub const fn math(source: &'a str) -> Self {
        Span::Math {
            source,
            closed: true,
        }
    }

    /// The span as it appeared in the input, delimiters included.
    pub fn literal(&self) -> Cow<'a, str> {
        match *self {
            Span::Text(value) => Cow::Borrowed(value),
            Span::Math {
                source,
                closed: true,
            } => Cow::Owned(format!("{DELIMITER}{source}{DELIMITER}")),
            Span::Math {
                source,
                closed: false,
            } => Cow::Owned(format!("{DELIMITER}{source}")),
        }
    }
}

/// Split `input` into prose and math spans, in order.
///
/// Empty prose between delimiters is skipped; empty math (`$$`) is kept so
/// that [`reconstruct`] gives back the input. Empty input yields no spans.
pub fn parse(input: &str) -> Vec<Span<'_>> {
    let mut spans = Vec::new();
    let mut pieces = input.split(DELIMITER).enumerate().peekable();

    while let Some((index, piece)) = pieces.next() {
        if index % 2 == 0 {
            if !piece.is_empty() {
                spans.push(Span::Text(piece));
            }
        } else {
            // the split only yields another piece if a closing `$` follows
            let closed = pieces.peek().is_some();
            spans.push(Span::Math {
                source: piece,
                closed,
            });
        }
    }

    spans
}

/// Concatenate spans back into mixed content.
pub fn reconstruct(spans: &[Span<'_>]) -> String {
    spans.iter().map(Span::literal).collect()
}

/// The math runs of `input`, without delimiters.
pub fn math_sources(input: &str) -> impl Iterator<Item = &str> {
    input
        .split(DELIMITER)
        .enumerate()
        .filter_map(|(index, piece)| (index % 2 == 1).then_some(piece))
}
