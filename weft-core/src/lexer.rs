//! Comment scanner for Rust source.
//!
//! `syn` throws plain comments away, so they are found here with a small
//! byte-level lexer. It only needs to know enough Rust to not mistake the
//! inside of a string or char literal for a comment.

/// A comment found in the source, as a byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comment {
    pub start: usize,
    pub end: usize,
    pub block: bool,
}

impl Comment {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// Maps byte offsets to 1-based lines and 0-based character columns.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self { line_starts }
    }

    /// `(line, column)` of `offset`. Line is 1-based, column counts chars.
    pub fn position(&self, source: &str, offset: usize) -> (usize, usize) {
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let start = self.line_starts[line - 1];
        (line, source[start..offset].chars().count())
    }

    /// Byte offset of a 1-based line and 0-based char column.
    pub fn offset(&self, source: &str, line: usize, column: usize) -> Option<usize> {
        let start = *self.line_starts.get(line.checked_sub(1)?)?;
        let end = self.line_starts.get(line).copied().unwrap_or(source.len());
        source[start..end]
            .char_indices()
            .nth(column)
            .map(|(i, _)| start + i)
    }

    /// The text of a 1-based line, without its terminator.
    pub fn line<'a>(&self, source: &'a str, line: usize) -> &'a str {
        let start = self.line_starts[line - 1];
        let end = self
            .line_starts
            .get(line)
            .map(|next| next - 1)
            .unwrap_or(source.len());
        source[start..end].trim_end_matches('\r')
    }
}

/// Every comment in `source`, in order.
///
/// Handles nested block comments, string and byte-string literals with
/// escapes, raw strings with any number of `#`, char literals and
/// lifetimes. An unterminated comment or literal runs to end of input.
pub fn scan_comments(source: &str) -> Vec<Comment> {
    let mut scanner = Scanner {
        bytes: source.as_bytes(),
        pos: 0,
        comments: Vec::new(),
    };
    scanner.run();
    scanner.comments
}

struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
    comments: Vec<Comment>,
}

impl Scanner<'_> {
    fn peek(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn run(&mut self) {
        while let Some(b) = self.peek(0) {
            match b {
                b'/' if self.peek(1) == Some(b'/') => self.line_comment(),
                b'/' if self.peek(1) == Some(b'*') => self.block_comment(),
                b'"' => self.string(),
                b'\'' => self.char_or_lifetime(),
                b'r' if self.raw_string_start() => self.raw_string(),
                _ => self.pos += 1,
            }
        }
    }

    fn line_comment(&mut self) {
        let start = self.pos;
        while let Some(b) = self.peek(0) {
            if b == b'\n' {
                break;
            }
            self.pos += 1;
        }
        self.comments.push(Comment {
            start,
            end: self.pos,
            block: false,
        });
    }

    fn block_comment(&mut self) {
        let start = self.pos;
        self.pos += 2;
        let mut depth = 1usize;
        while depth > 0 {
            match (self.peek(0), self.peek(1)) {
                (None, _) => break,
                (Some(b'/'), Some(b'*')) => {
                    depth += 1;
                    self.pos += 2;
                }
                (Some(b'*'), Some(b'/')) => {
                    depth -= 1;
                    self.pos += 2;
                }
                _ => self.pos += 1,
            }
        }
        self.comments.push(Comment {
            start,
            end: self.pos.min(self.bytes.len()),
            block: true,
        });
    }

    /// `"..."`, also reached for `b"..."` and `c"..."`.
    fn string(&mut self) {
        self.pos += 1;
        while let Some(b) = self.peek(0) {
            self.pos += 1;
            match b {
                b'\\' => self.pos += 1,
                b'"' => return,
                _ => {}
            }
        }
    }

    /// `r"..."`, `r#"..."#`, and the `br` / `cr` forms. Not `r#ident`.
    fn raw_string_start(&self) -> bool {
        if let Some(prev) = self.pos.checked_sub(1).map(|i| self.bytes[i]) {
            let prefixed = matches!(prev, b'b' | b'c')
                && self
                    .pos
                    .checked_sub(2)
                    .is_none_or(|i| !is_ident_byte(self.bytes[i]));
            if is_ident_byte(prev) && !prefixed {
                return false;
            }
        }
        let mut ahead = 1;
        while self.peek(ahead) == Some(b'#') {
            ahead += 1;
        }
        self.peek(ahead) == Some(b'"')
    }

    fn raw_string(&mut self) {
        self.pos += 1;
        let mut hashes = 0;
        while self.peek(0) == Some(b'#') {
            hashes += 1;
            self.pos += 1;
        }
        self.pos += 1;
        while let Some(b) = self.peek(0) {
            self.pos += 1;
            if b == b'"' && (0..hashes).all(|i| self.peek(i) == Some(b'#')) {
                self.pos += hashes;
                return;
            }
        }
    }

    /// `'x'`, `'\n'`, `'\u{1F600}'`, or a lifetime / label like `'a`.
    fn char_or_lifetime(&mut self) {
        if self.peek(1) == Some(b'\\') {
            self.pos += 3;
            while let Some(b) = self.peek(0) {
                self.pos += 1;
                if b == b'\'' {
                    return;
                }
            }
            return;
        }

        let width = self.peek(1).map(utf8_width).unwrap_or(1);
        if self.peek(1 + width) == Some(b'\'') {
            self.pos += width + 2;
        } else {
            self.pos += 1;
        }
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

fn utf8_width(first: u8) -> usize {
    match first {
        0xf0..=0xff => 4,
        0xe0..=0xef => 3,
        0xc0..=0xdf => 2,
        _ => 1,
    }
}
