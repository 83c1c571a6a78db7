//! PHP parser for rephp: recursive descent with Pratt precedence, plus the
//! matching pretty-printer.

pub mod ast;
pub mod fmt;
pub mod parser;

pub use fmt::{format_expr, format_program};
pub use parser::{parse, ParseError, ParseErrorKind, ParseResult};
pub use rephp_lexer::{is_name_char, is_name_start};

/// Maps byte offsets to 1-indexed line and column numbers.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    #[must_use]
    pub fn new(source: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { line_starts }
    }

    /// 1-indexed `(line, column)` of `offset`. Columns count bytes.
    #[must_use]
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        (line + 1, offset - self.line_starts[line] + 1)
    }

    /// 1-indexed line of `offset`.
    #[must_use]
    pub fn line(&self, offset: usize) -> usize {
        self.line_col(offset).0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_index_maps_offsets() {
        let index = LineIndex::new("ab\ncd\n\nx");
        assert_eq!(index.line_col(0), (1, 1));
        assert_eq!(index.line_col(1), (1, 2));
        assert_eq!(index.line_col(3), (2, 1));
        assert_eq!(index.line_col(6), (3, 1));
        assert_eq!(index.line_col(7), (4, 1));
        assert_eq!(index.line(100), 4);
    }
}
