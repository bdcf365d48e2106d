//! # canto-weave
//!
//! Re-synchronizes a location-keyed annotation stream with the flowing
//! document text it describes. The document and its work's sorted
//! annotation list are walked in lock-step: an explicit tokenizer turns the
//! document into chapter, verse and lead-in events, and a two-pointer
//! merge-join splices each annotation in at the exact point it belongs.
//!
//! The file structure:
//!     .
//!     ├── tokenizer.rs    # document event scan (stateful line classifier)
//!     ├── apply.rs        # outline -> document splice (the merge-join)
//!     ├── derive.rs       # document -> outline scan (building direction)
//!     ├── footnotes.rs    # deferred footnote resolve / defer passes
//!     └── stats.rs        # per-chapter verse counts for versification work
//!
//! Like canto-outline, this crate does no I/O and never aborts a run: a
//! document that cannot be matched to a work passes through unmodified with
//! a diagnostic. Weaving only reads the outline set, so one sorted set can
//! serve many documents concurrently; the per-document transforms
//! themselves are plain synchronous functions.

pub mod apply;
pub mod derive;
pub mod footnotes;
pub mod stats;
pub mod tokenizer;

pub use apply::apply;
pub use derive::derive;
pub use footnotes::{defer_footnotes, resolve_deferred};
pub use stats::{render_stats, verse_stats, ChapterStats};
pub use tokenizer::{tokenize, DocToken, DocTokenKind};
