//! # canto-outline
//!
//! A location-indexed annotation engine for long-form structured texts:
//! books divided into chapters and verses, annotated by a separate stream of
//! chapter titles, footnotes and paragraph breaks that is keyed by location
//! instead of being embedded inline.
//!
//! The pieces, leaf first:
//!
//!     - Location: the totally ordered key (work, chapter, verse, optional
//!       range end) everything else hangs off.
//!     - Work / WorkRegistry: the language-scoped name and ordinal lookup,
//!       an explicit value passed into every call rather than a global.
//!     - VersificationMap: piecewise remapping of locations between two
//!       editions' chapter/verse numbering schemes.
//!     - OutlineItem / OutlineSet: the annotation stream itself, with two
//!       interchangeable on-disk surfaces (markup and XML), deterministic
//!       sort + dedup, and merging.
//!     - parallel: cross-reference link trees compiled into append-mode
//!       footnote outlines.
//!
//! The engine does no I/O. Parse operations take text the caller read,
//! serialize operations return text the caller writes, and the only file
//! indirection (a declared versification map name) goes through the
//! [`versification::MapSource`] trait. Failures degrade per item or per
//! file and are surfaced through [`diagnostics::Diagnostics`]; splicing the
//! stream back into document text lives in the companion canto-weave crate.

pub mod diagnostics;
pub mod error;
pub mod location;
pub mod outline;
pub mod parallel;
mod sections;
pub mod versification;
pub mod work;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{OutlineError, OutlineResult};
pub use location::Location;
pub use outline::{MarkupStyle, OutlineItem, OutlineSet, VerseMarkerStyle};
pub use versification::{MapSource, NoMaps, VersificationMap};
pub use work::{Work, WorkRegistry};
