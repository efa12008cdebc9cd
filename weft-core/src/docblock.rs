//! Documentation Blocks: `/*{md}` comments rendered as prose.

use crate::lexer::{Comment, LineIndex, scan_comments};

/// Opens a Documentation Block. Must be followed by a line break.
pub const DOC_MARKER: &str = "/*{md}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocBlock {
    /// 1-based line of the opening `/*{md}`.
    pub start_line: usize,
    /// 1-based line of the closing `*/`.
    pub end_line: usize,
    /// 0-based char column of the opening `/*`.
    pub column: usize,
    /// Whitespace in front of the block on its first line. Removed from the
    /// start of every continuation line.
    pub indent: String,
    /// The comment exactly as written, delimiters included.
    pub raw: String,
}

impl DocBlock {
    /// The block's text with its delimiters and indentation removed.
    ///
    /// The line break after the marker is dropped, as is any whitespace left
    /// in front of the closing `*/`. Indentation is removed from the first
    /// prose line too.
    pub fn prose(&self) -> String {
        let text = self.raw.strip_prefix(DOC_MARKER).unwrap_or(&self.raw);
        let text = text.strip_suffix("*/").unwrap_or(text);
        let text = if self.indent.is_empty() {
            text.to_string()
        } else {
            text.replace(&format!("\n{}", self.indent), "\n")
        };

        let text = text
            .strip_prefix("\r\n")
            .or_else(|| text.strip_prefix('\n'))
            .unwrap_or(&text);
        text.trim_end_matches([' ', '\t']).to_string()
    }
}

fn is_doc_comment(text: &str) -> bool {
    text.strip_prefix(DOC_MARKER)
        .is_some_and(|rest| rest.starts_with('\n') || rest.starts_with("\r\n"))
}

/// Every Documentation Block in `source`, in source order.
pub fn find_doc_blocks(source: &str, index: &LineIndex) -> Vec<DocBlock> {
    scan_comments(source)
        .into_iter()
        .filter(|c| c.block && is_doc_comment(c.text(source)))
        .map(|c| doc_block(source, index, c))
        .collect()
}

fn doc_block(source: &str, index: &LineIndex, comment: Comment) -> DocBlock {
    let (start_line, column) = index.position(source, comment.start);
    let (end_line, _) = index.position(source, comment.end.saturating_sub(1));

    let first = index.line(source, start_line);
    let indent: String = first
        .chars()
        .take(column)
        .take_while(|c| c.is_whitespace())
        .collect();
    if indent.chars().count() != column {
        tracing::warn!(
            "doc block at line {} shares its line with code; that code will not be rendered",
            start_line
        );
    }

    DocBlock {
        start_line,
        end_line,
        column,
        indent,
        raw: comment.text(source).to_string(),
    }
}
