//! Document tokenizer
//!
//! Turns a document into the ordered event stream the splice pass walks:
//! chapter heading lines, verse markers in either spelling, and the lead-in
//! span a chapter can open with before its first numbered verse (psalm
//! superscriptions and the like).
//!
//! The scan is a stateful line classifier. After a chapter heading it is in
//! the header state, where blank lines and title lines pass by; the first
//! content line either starts the verse body (it leads with a verse marker)
//! or opens a lead-in span. Once in the body, only verse markers and the
//! next chapter heading matter. Tokens are consumed strictly forward, no
//! backtracking.
//!
//! Spans: a chapter token covers its heading line; verse and lead-in tokens
//! run from their start to the start of the next token, so a token's span
//! carries the text that belongs to it.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

pub(crate) static CHAPTER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[ \t]+([0-9]+)[ \t]*$").unwrap());
pub(crate) static VERSE_MARK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\^([0-9]+)\^|@([0-9]+)").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocTokenKind {
    /// A `# N` heading line.
    Chapter(i32),
    /// A `^n^` or `@n` marker and the verse text that follows it.
    Verse(i32),
    /// Unnumbered material between a chapter heading and its first verse.
    LeadIn,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocToken {
    pub kind: DocTokenKind,
    pub span: Range<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Just past a `# N` line; titles and blanks may follow.
    ChapterHeader,
    /// Inside numbered verse text.
    VerseBody,
    /// Inside a chapter's unnumbered lead-in.
    LeadIn,
}

pub fn tokenize(text: &str) -> Vec<DocToken> {
    // kind, start, end of the token's own text (only meaningful for chapters)
    let mut found: Vec<(DocTokenKind, usize, usize)> = Vec::new();
    let mut state = State::VerseBody;

    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let start = offset;
        offset += line.len();
        let content = line.trim_end_matches('\n').trim_end_matches('\r');

        if let Some(caps) = CHAPTER_LINE.captures(content) {
            let number = caps[1].parse().unwrap_or(0);
            found.push((DocTokenKind::Chapter(number), start, start + line.len()));
            state = State::ChapterHeader;
            continue;
        }

        let markers: Vec<(usize, i32)> = VERSE_MARK
            .captures_iter(content)
            .filter_map(|caps| {
                let m = caps.get(0)?;
                let verse = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .and_then(|v| v.as_str().parse().ok())?;
                Some((start + m.start(), verse))
            })
            .collect();

        if state == State::ChapterHeader {
            if content.trim().is_empty() || content.trim_start().starts_with('#') {
                // blank or title line, still in the header
            } else if let Some((first, _)) = markers.first() {
                let lead = &text[start..*first];
                if !lead.trim().is_empty() {
                    found.push((DocTokenKind::LeadIn, start, start));
                }
                state = State::VerseBody;
            } else {
                found.push((DocTokenKind::LeadIn, start, start));
                state = State::LeadIn;
            }
        }
        if !markers.is_empty() {
            state = State::VerseBody;
        }
        for (position, verse) in markers {
            found.push((DocTokenKind::Verse(verse), position, position));
        }
    }

    let mut tokens = Vec::with_capacity(found.len());
    for (i, (kind, start, own_end)) in found.iter().enumerate() {
        let end = match kind {
            DocTokenKind::Chapter(_) => *own_end,
            _ => found.get(i + 1).map(|next| next.1).unwrap_or(text.len()),
        };
        tokens.push(DocToken {
            kind: *kind,
            span: *start..end,
        });
    }
    tokens
}
