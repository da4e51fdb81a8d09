//! Byte ranges into query text.

/// A half-open byte range in the text a match was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Creates a new span.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns true if both spans share at least one byte.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Shifts the span right by `offset` bytes.
    #[must_use]
    pub const fn offset(self, offset: usize) -> Self {
        Self::new(self.start + offset, self.end + offset)
    }

    /// Returns the slice of `text` this span covers.
    ///
    /// # Panics
    ///
    /// Panics if the span is out of bounds or not on a char boundary of `text`.
    #[must_use]
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

impl From<regex::Match<'_>> for Span {
    fn from(m: regex::Match<'_>) -> Self {
        Self::new(m.start(), m.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_overlaps() {
        let span = Span::new(5, 10);
        assert!(span.overlaps(&Span::new(8, 15)));
        assert!(span.overlaps(&Span::new(0, 6)));
        assert!(!span.overlaps(&Span::new(10, 12)));
        assert!(!span.overlaps(&Span::new(0, 5)));
    }

    #[test]
    fn test_span_offset_and_slice() {
        let text = "WHERE a = :x";
        let span = Span::new(0, 5);
        assert_eq!(span.slice(text), "WHERE");
        assert_eq!(Span::new(1, 3).offset(9).slice(text), ":x");
    }
}
