//! The outline: annotation items, the flat set, and its two surfaces
//!
//! The file structure:
//!     .
//!     ├── item.rs          # OutlineItem and its variants
//!     ├── set.rs           # OutlineSet: sort, dedup, merge, child index
//!     ├── markup.rs        # free-text surface (parse + serialize)
//!     └── structured.rs    # XML surface (parse + serialize)
//!
//! Both surfaces fold into the same [`set::OutlineSet`]; parsing either kind
//! of file twice, or parsing the same data from both kinds, leaves a single
//! copy of every item.

pub mod item;
pub mod markup;
pub mod set;
pub mod structured;

pub use item::{ChapterMarker, Footnote, OutlineItem, ParagraphBreak, Title, WorkMarker};
pub use markup::{MarkupStyle, VerseMarkerStyle};
pub use set::OutlineSet;
pub use structured::{ChapterEntry, OutlineDoc, WorkElement};
