//! Byte ranges within a line
//!
//! All offsets are byte offsets into the UTF-8 text of a single line.

use std::fmt;

/// Half-open interval `[start, end)` of byte offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Range {
    /// Byte offset where this range starts (inclusive)
    pub start: usize,
    /// Byte offset where this range ends (exclusive)
    pub end: usize,
}

impl Range {
    /// Create a new range
    ///
    /// # Panics
    ///
    /// Panics if `end < start`.
    pub fn new(start: usize, end: usize) -> Self {
        let range = Self { start, end };
        range.assert_valid();
        range
    }

    /// Range covering `[0, length)`
    pub fn whole(length: usize) -> Self {
        Self { start: 0, end: length }
    }

    pub fn with_length(start: usize, length: usize) -> Self {
        Self::new(start, start + length)
    }

    pub fn is_null(&self) -> bool {
        self.start == self.end
    }

    pub fn set_null(&mut self) -> &mut Self {
        self.end = self.start;
        self
    }

    pub fn set_start(&mut self, start: usize) -> &mut Self {
        self.start = start;
        self.assert_valid();
        self
    }

    pub fn set_end(&mut self, end: usize) -> &mut Self {
        self.end = end;
        self.assert_valid();
        self
    }

    /// Get the length of this range in bytes
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.is_null()
    }

    /// Check if this range contains a byte position
    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }

    /// Check if `other` lies entirely within this range
    pub fn contains_range(&self, other: &Range) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn is_intersecting(&self, other: &Range) -> bool {
        self.start.max(other.start) < self.end.min(other.end)
    }

    /// Shift both ends by `offset`
    pub fn offset(&self, offset: usize) -> Self {
        Self::new(self.start + offset, self.end + offset)
    }

    /// Slice `text` by this range
    pub fn slice<'t>(&self, text: &'t str) -> &'t str {
        &text[self.start..self.end]
    }

    fn assert_valid(&self) {
        assert!(
            self.end >= self.start,
            "Range end {} is smaller than range start {}",
            self.end,
            self.start
        );
    }
}

impl From<std::ops::Range<usize>> for Range {
    fn from(r: std::ops::Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
