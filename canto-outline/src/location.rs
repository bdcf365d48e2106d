//! Location
//!
//! The ordered key every other component hangs off: which work, which
//! chapter, which verse, and optionally an inclusive range end. The range
//! end is carried for display and remapping but never takes part in ordering
//! or equality, so two locations that differ only in `up_to_verse` sort and
//! deduplicate as one.
//!
//! Verse numbers are opaque integers with ordering semantics only. Verse 0
//! is reserved for introductory material before verse 1 of a chapter, and
//! negative verses act as "before the chapter body" placeholders (chapter
//! and work markers sit at verse -1).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A position inside the corpus: work ordinal, chapter, verse, and an
/// optional inclusive range end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Location {
    pub work: i32,
    pub chapter: i32,
    pub verse: i32,
    pub up_to_verse: Option<i32>,
}

impl Location {
    pub fn new(work: i32, chapter: i32, verse: i32) -> Self {
        Self {
            work,
            chapter,
            verse,
            up_to_verse: None,
        }
    }

    pub fn up_to(mut self, verse: i32) -> Self {
        self.up_to_verse = Some(verse);
        self
    }

    /// The "before everything" sentinel.
    pub fn zero() -> Self {
        Self::new(0, 0, -1)
    }

    /// The chapter/verse pair, the part a versification map operates on.
    pub fn position(&self) -> (i32, i32) {
        (self.chapter, self.verse)
    }
}

impl Ord for Location {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.work, self.chapter, self.verse).cmp(&(other.work, other.chapter, other.verse))
    }
}

impl PartialOrd for Location {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Equality is defined to agree with the ordering, so `up_to_verse` is
// ignored here as well.
impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Location {}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.work, self.chapter, self.verse)?;
        if let Some(up_to) = self.up_to_verse {
            write!(f, "-{}", up_to)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_is_work_then_chapter_then_verse() {
        let a = Location::new(1, 2, 3);
        assert!(a < Location::new(2, 0, 0));
        assert!(a < Location::new(1, 3, 0));
        assert!(a < Location::new(1, 2, 4));
        assert!(a > Location::new(1, 2, 2));
        assert!(a > Location::new(0, 99, 99));
    }

    #[test]
    fn test_range_end_ignored_by_order_and_equality() {
        let plain = Location::new(3, 4, 5);
        let ranged = Location::new(3, 4, 5).up_to(9);

        assert_eq!(plain, ranged);
        assert_eq!(plain.cmp(&ranged), Ordering::Equal);
    }

    #[test]
    fn test_zero_sorts_before_chapter_content() {
        let zero = Location::zero();
        assert!(zero < Location::new(0, 0, 0));
        assert!(zero < Location::new(0, 1, -1));
    }

    #[test]
    fn test_negative_verse_accepted() {
        assert!(Location::new(1, 1, -1) < Location::new(1, 1, 0));
    }

    #[test]
    fn test_display() {
        assert_eq!(Location::new(1, 12, 16).to_string(), "1:12:16");
        assert_eq!(Location::new(1, 12, 16).up_to(20).to_string(), "1:12:16-20");
    }
}
