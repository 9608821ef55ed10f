//! Statement-boundary detection.
//!
//! [`DelimiterSplitter`] cuts on every delimiter character, including ones
//! inside string literals, quoted identifiers and comments.
//! [`SqlAwareSplitter`] runs the MySQL tokenizer and cuts only on top-level
//! semicolons. Both return raw segments; the batch executor trims them and
//! skips blanks.

use sqlparser::dialect::MySqlDialect;
use sqlparser::tokenizer::{Location, Token, Tokenizer};

use crate::config::SplitterKind;
use crate::error::{LoaderError, LoaderResult};

/// Splits script text into candidate statements.
pub trait StatementSplitter: Send + Sync {
    fn split<'t>(&self, text: &'t str) -> LoaderResult<Vec<&'t str>>;
}

/// Build the splitter selected by configuration.
pub fn splitter_for(kind: SplitterKind, delimiter: char) -> Box<dyn StatementSplitter> {
    match kind {
        SplitterKind::Naive => Box::new(DelimiterSplitter::new(delimiter)),
        SplitterKind::SqlAware => Box::new(SqlAwareSplitter),
    }
}

// ---------------------------------------------------------------------------
// DelimiterSplitter
// ---------------------------------------------------------------------------

/// Plain character split.
#[derive(Debug, Clone, Copy)]
pub struct DelimiterSplitter {
    delimiter: char,
}

impl DelimiterSplitter {
    pub fn new(delimiter: char) -> Self {
        Self { delimiter }
    }
}

impl Default for DelimiterSplitter {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_DELIMITER)
    }
}

impl StatementSplitter for DelimiterSplitter {
    fn split<'t>(&self, text: &'t str) -> LoaderResult<Vec<&'t str>> {
        Ok(text.split(self.delimiter).collect())
    }
}

// ---------------------------------------------------------------------------
// SqlAwareSplitter
// ---------------------------------------------------------------------------

/// Tokenizer-driven split on top-level `;`.
///
/// Segments holding only whitespace or comments are dropped. `DELIMITER`
/// client directives are not understood.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlAwareSplitter;

impl StatementSplitter for SqlAwareSplitter {
    fn split<'t>(&self, text: &'t str) -> LoaderResult<Vec<&'t str>> {
        let tokens = Tokenizer::new(&MySqlDialect {}, text)
            .tokenize_with_location()
            .map_err(|e| LoaderError::StatementSplit(e.to_string()))?;
        let index = LineIndex::new(text);

        let mut statements = Vec::new();
        let mut start = 0;
        let mut has_content = false;

        for token in &tokens {
            match &token.token {
                Token::SemiColon => {
                    let end = index.offset(text, token.span.start)?;
                    if has_content {
                        statements.push(&text[start..end]);
                    }
                    start = end + 1;
                    has_content = false;
                }
                Token::Whitespace(_) | Token::EOF => {}
                _ => has_content = true,
            }
        }
        if has_content {
            statements.push(&text[start..]);
        }
        Ok(statements)
    }
}

/// Maps tokenizer line/column locations back to byte offsets.
struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { line_starts }
    }

    /// Byte offset of a 1-based, character-counted location.
    fn offset(&self, text: &str, location: Location) -> LoaderResult<usize> {
        let out_of_range = || {
            LoaderError::StatementSplit(format!(
                "token location {}:{} is outside the script",
                location.line, location.column
            ))
        };
        let line = usize::try_from(location.line.saturating_sub(1)).map_err(|_| out_of_range())?;
        let column = usize::try_from(location.column.saturating_sub(1)).map_err(|_| out_of_range())?;
        let line_start = *self.line_starts.get(line).ok_or_else(out_of_range)?;
        text[line_start..]
            .char_indices()
            .nth(column)
            .map(|(i, _)| line_start + i)
            .ok_or_else(out_of_range)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
