//! Outline items
//!
//! The annotation stream is a flat list of tagged items, each pinned to a
//! [`Location`]. Work and chapter markers carry the structure; titles,
//! footnotes and paragraph breaks carry the content. The variants form a
//! closed set on purpose: the sort tie-break and the weave both match
//! exhaustively, so adding a variant fails loudly everywhere it matters.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::location::Location;
use crate::work::Work;

/// Introduces a work and the document file backing it. Sits at the work's
/// zero location (chapter 0, verse -1), before all of its content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkMarker {
    pub location: Location,
    pub name: String,
    pub file: String,
    /// Render every verse as its own paragraph (psalm and proverb layout).
    pub verse_paragraphs: bool,
}

impl WorkMarker {
    pub fn new(work: &Work, file: impl Into<String>) -> Self {
        Self {
            location: Location::new(work.ordinal, 0, -1),
            name: work.name.clone(),
            file: file.into(),
            verse_paragraphs: false,
        }
    }
}

/// A chapter boundary, at verse -1 so it precedes the chapter's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterMarker {
    pub location: Location,
}

impl ChapterMarker {
    pub fn new(work: i32, chapter: i32) -> Self {
        Self {
            location: Location::new(work, chapter, -1),
        }
    }
}

/// A short heading attached to a chapter/verse position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub location: Location,
    pub text: String,
}

/// Free-text note content attached to a chapter/verse position. The text is
/// stored without its `^[` `]` markup wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footnote {
    pub location: Location,
    pub text: String,
}

/// A structural break with no payload besides its location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphBreak {
    pub location: Location,
}

/// One entry of the annotation stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OutlineItem {
    Work(WorkMarker),
    Chapter(ChapterMarker),
    Title(Title),
    Footnote(Footnote),
    Paragraph(ParagraphBreak),
}

impl OutlineItem {
    pub fn location(&self) -> &Location {
        match self {
            OutlineItem::Work(w) => &w.location,
            OutlineItem::Chapter(c) => &c.location,
            OutlineItem::Title(t) => &t.location,
            OutlineItem::Footnote(f) => &f.location,
            OutlineItem::Paragraph(p) => &p.location,
        }
    }

    pub fn location_mut(&mut self) -> &mut Location {
        match self {
            OutlineItem::Work(w) => &mut w.location,
            OutlineItem::Chapter(c) => &mut c.location,
            OutlineItem::Title(t) => &mut t.location,
            OutlineItem::Footnote(f) => &mut f.location,
            OutlineItem::Paragraph(p) => &mut p.location,
        }
    }

    /// Versification maps move content items only; structural markers keep
    /// their positions.
    pub fn is_remappable(&self) -> bool {
        matches!(
            self,
            OutlineItem::Title(_) | OutlineItem::Footnote(_) | OutlineItem::Paragraph(_)
        )
    }

    /// Secondary sort key among items sharing a location: titles and
    /// paragraph breaks come after markers and footnotes.
    pub(crate) fn tie_rank(&self) -> u8 {
        match self {
            OutlineItem::Title(_) | OutlineItem::Paragraph(_) => 1,
            OutlineItem::Work(_) | OutlineItem::Chapter(_) | OutlineItem::Footnote(_) => 0,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            OutlineItem::Work(_) => "work",
            OutlineItem::Chapter(_) => "chapter",
            OutlineItem::Title(_) => "title",
            OutlineItem::Footnote(_) => "footnote",
            OutlineItem::Paragraph(_) => "paragraph",
        }
    }
}

impl fmt::Display for OutlineItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutlineItem::Work(w) => write!(f, "work '{}' ({})", w.name, w.file),
            OutlineItem::Chapter(c) => write!(f, "chapter {} at {}", c.location.chapter, c.location),
            OutlineItem::Title(t) => write!(f, "title '{}' at {}", t.text, t.location),
            OutlineItem::Footnote(n) => write!(f, "footnote at {}", n.location),
            OutlineItem::Paragraph(p) => write!(f, "paragraph break at {}", p.location),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_locations_precede_content() {
        let work = Work::new(3, "Ruth");
        let marker = WorkMarker::new(&work, "03-Ruth.md");
        let chapter = ChapterMarker::new(3, 1);

        assert!(marker.location < chapter.location);
        assert!(chapter.location < Location::new(3, 1, 0));
    }

    #[test]
    fn test_tie_rank_orders_titles_after_footnotes() {
        let title = OutlineItem::Title(Title {
            location: Location::new(1, 1, 1),
            text: "Creation".into(),
        });
        let footnote = OutlineItem::Footnote(Footnote {
            location: Location::new(1, 1, 1),
            text: "note".into(),
        });
        assert!(footnote.tie_rank() < title.tie_rank());
    }
}
