//! Fence sizing.

use std::fmt;

pub const FENCE_CHAR: char = '`';
pub const MIN_FENCE_LEN: usize = 3;

/// A run of backticks long enough that nothing it encloses can close it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fence {
    delimiter: String,
}

impl Fence {
    /// Size a fence for the given texts: one longer than the longest run of
    /// [`FENCE_CHAR`] in any of them, at least [`MIN_FENCE_LEN`].
    pub fn for_texts<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        let longest = texts.into_iter().map(longest_run).max().unwrap_or(0);
        Self::with_len((longest + 1).max(MIN_FENCE_LEN))
    }

    pub fn with_len(len: usize) -> Self {
        Self {
            delimiter: FENCE_CHAR.to_string().repeat(len),
        }
    }

    pub fn width(&self) -> usize {
        self.delimiter.len()
    }

    pub fn as_str(&self) -> &str {
        &self.delimiter
    }
}

impl fmt::Display for Fence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.delimiter)
    }
}

/// Longest run of consecutive [`FENCE_CHAR`]s in `text`.
pub fn longest_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == FENCE_CHAR {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}
