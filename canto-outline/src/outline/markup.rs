//! Markup outline surface
//!
//! The free-text outline syntax. Works are level-1 headings, chapters
//! level-2 headings, chapter titles level-3 headings. Inside a chapter body
//! a token scan tracks the current verse and attaches everything it finds to
//! it:
//!
//!   # Genesis
//!   ## 1
//!   @1
//!   ### Creation
//!   @2 ^[over the face of the deep] @5 \
//!
//! Verse markers come in two spellings, `@n` and `^n^`. `\` marks a
//! paragraph break, `^[...]` a footnote (one level of nested brackets is
//! tolerated). Comments `/* ... */` and `// ...` are stripped unless they
//! open with `!`, which makes them directives: `//!append` latches the
//! set's append flag, `//!map <name>` names a versification map applied to
//! every title, footnote and paragraph break parsed from the file, and
//! `//!verse-paragraphs` inside a work section sets that work's layout flag.
//!
//! Titles, footnotes and paragraph breaks with no preceding verse marker
//! attach to verse 0, the slot for introductory material.

use logos::{FilterResult, Lexer, Logos};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::diagnostics::{Diagnostics, Severity};
use crate::location::Location;
use crate::outline::item::{Footnote, OutlineItem, ParagraphBreak, Title};
use crate::outline::set::OutlineSet;
use crate::sections::sections;
use crate::versification::{MapSource, VersificationMap};
use crate::work::{work_name, Work, WorkRegistry};

/// Which verse marker spelling the serializer emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerseMarkerStyle {
    #[default]
    At,
    Superscript,
}

/// Serializer knobs, deserializable so callers can keep them in their own
/// configuration files.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarkupStyle {
    #[serde(default)]
    pub verse_markers: VerseMarkerStyle,
}

impl MarkupStyle {
    fn marker(&self, verse: i32) -> String {
        match self.verse_markers {
            VerseMarkerStyle::At => format!("@{}", verse),
            VerseMarkerStyle::Superscript => format!("^{}^", verse),
        }
    }
}

static APPEND: Lazy<Regex> = Lazy::new(|| Regex::new(r"(//|/\*)!append\b").unwrap());
static MAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"(//|/\*)!map[ \t]*([^\r\n*]*)").unwrap());
static VERSE_PARAGRAPHS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(//|/\*)!verse-paragraphs").unwrap());
static BLOCK_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"//[^\r\n]*").unwrap());

/// Remove comments, keeping `!` directives and `://` protocol tails alone.
pub(crate) fn strip_comments(text: &str) -> String {
    let without_blocks = BLOCK_COMMENT.replace_all(text, |caps: &regex::Captures| {
        if caps[0].starts_with("/*!") {
            caps[0].to_string()
        } else {
            String::new()
        }
    });
    let text: &str = without_blocks.as_ref();

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in LINE_COMMENT.find_iter(&text) {
        if m.as_str().starts_with("//!") || text[..m.start()].ends_with(':') {
            continue;
        }
        out.push_str(&text[last..m.start()]);
        last = m.end();
    }
    out.push_str(&text[last..]);
    out
}

/// Chapter-body tokens. Anything that is not a marker is plain text and gets
/// skipped; the lexer only surfaces the positions the outline cares about.
#[derive(Logos, Debug, PartialEq)]
#[logos(extras = Vec<String>)]
#[logos(skip r"[^\^@\\#]+")]
enum BodyToken {
    #[regex(r"\^-?[0-9]+\^", sup_verse)]
    SupVerse(i32),

    #[regex(r"@-?[0-9]+", at_verse)]
    AtVerse(i32),

    #[token("\\")]
    Break,

    #[token("^[", footnote_body)]
    Footnote(String),

    #[token("###", title_line)]
    Title(String),
}

fn sup_verse(lex: &mut Lexer<BodyToken>) -> Option<i32> {
    lex.slice().trim_matches('^').parse().ok()
}

fn at_verse(lex: &mut Lexer<BodyToken>) -> Option<i32> {
    lex.slice()[1..].parse().ok()
}

/// Consume a footnote body up to its matching close bracket, tolerating
/// nested brackets by depth counting.
fn footnote_body(lex: &mut Lexer<BodyToken>) -> Option<String> {
    let rest = lex.remainder();
    let mut depth = 1usize;
    for (i, ch) in rest.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    let body = rest[..i].trim().to_string();
                    lex.bump(i + 1);
                    return Some(body);
                }
            }
            _ => {}
        }
    }
    lex.extras
        .push("footnote reaches end of chapter without a closing bracket".to_string());
    None
}

/// A title is a `###` heading at the start of a line; a `###` in running
/// text is plain content and falls through as an error the scan skips.
fn title_line(lex: &mut Lexer<BodyToken>) -> FilterResult<String, ()> {
    let start = lex.span().start;
    let at_line_start = start == 0 || lex.source().as_bytes()[start - 1] == b'\n';
    let rest = lex.remainder();
    if !at_line_start || !rest.starts_with([' ', '\t']) {
        return FilterResult::Error(());
    }
    let end = rest.find('\n').unwrap_or(rest.len());
    let title = rest[..end].trim().to_string();
    lex.bump(end);
    FilterResult::Emit(title)
}

fn remap(
    map: Option<&VersificationMap>,
    location: Location,
    registry: &WorkRegistry,
    diagnostics: &mut Diagnostics,
) -> Location {
    match map {
        Some(map) => map.map_audited(&location, registry, diagnostics),
        None => location,
    }
}

fn load_declared_map(
    text: &str,
    registry: &WorkRegistry,
    maps: &dyn MapSource,
    diagnostics: &mut Diagnostics,
) -> Option<VersificationMap> {
    let caps = MAP.captures(text)?;
    let name = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
    match maps.load(name) {
        Some(text) => Some(VersificationMap::parse(&text, registry, diagnostics)),
        None => {
            diagnostics.report(
                Severity::Warning,
                "missing-map",
                format!("declared versification map '{}' could not be loaded", name),
            );
            None
        }
    }
}

impl OutlineSet {
    /// Parse one markup outline file into a fresh set.
    pub fn from_markup(
        text: &str,
        registry: &WorkRegistry,
        maps: &dyn MapSource,
        diagnostics: &mut Diagnostics,
    ) -> OutlineSet {
        let mut set = OutlineSet::new();
        set.add_markup(text, registry, maps, diagnostics);
        set
    }

    /// Parse one markup outline file into this set, reusing work and chapter
    /// markers that already exist. Callable repeatedly; unparseable sections
    /// are skipped with a diagnostic, never fatal.
    pub fn add_markup(
        &mut self,
        text: &str,
        registry: &WorkRegistry,
        maps: &dyn MapSource,
        diagnostics: &mut Diagnostics,
    ) {
        let text = strip_comments(text);
        if APPEND.is_match(&text) {
            self.append = true;
        }
        let map = load_declared_map(&text, registry, maps, diagnostics);

        for work_section in sections(&text, 1) {
            let name = work_name(work_section.heading);
            let Some(work) = registry.by_name(None, &name) else {
                diagnostics.report(
                    Severity::Warning,
                    "unknown-work",
                    format!("outline names unknown work '{}'", name),
                );
                continue;
            };
            let work = work.clone();
            let verse_paragraphs = VERSE_PARAGRAPHS.is_match(work_section.body);
            self.ensure_work(&work, &work.file_name(), verse_paragraphs);

            for chapter_section in sections(work_section.body, 2) {
                let number = chapter_section
                    .heading
                    .split_whitespace()
                    .next()
                    .and_then(|word| word.parse::<i32>().ok());
                let Some(chapter) = number else {
                    diagnostics.report(
                        Severity::Warning,
                        "malformed-source",
                        format!(
                            "chapter heading '{}' in {} has no number",
                            chapter_section.heading, work.name
                        ),
                    );
                    continue;
                };
                self.ensure_chapter(work.ordinal, chapter);
                self.scan_chapter_body(
                    chapter_section.body,
                    &work,
                    chapter,
                    map.as_ref(),
                    registry,
                    diagnostics,
                );
            }
        }
    }

    fn scan_chapter_body(
        &mut self,
        body: &str,
        work: &Work,
        chapter: i32,
        map: Option<&VersificationMap>,
        registry: &WorkRegistry,
        diagnostics: &mut Diagnostics,
    ) {
        let mut lexer = BodyToken::lexer(body);
        let mut verse = 0;
        while let Some(token) = lexer.next() {
            let Ok(token) = token else { continue };
            match token {
                BodyToken::SupVerse(v) | BodyToken::AtVerse(v) => verse = v,
                BodyToken::Break => {
                    let location = remap(
                        map,
                        Location::new(work.ordinal, chapter, verse),
                        registry,
                        diagnostics,
                    );
                    self.push_unique(OutlineItem::Paragraph(ParagraphBreak { location }));
                }
                BodyToken::Footnote(text) => {
                    let location = remap(
                        map,
                        Location::new(work.ordinal, chapter, verse),
                        registry,
                        diagnostics,
                    );
                    self.push_unique(OutlineItem::Footnote(Footnote { location, text }));
                }
                BodyToken::Title(text) => {
                    let location = remap(
                        map,
                        Location::new(work.ordinal, chapter, verse),
                        registry,
                        diagnostics,
                    );
                    self.push_unique(OutlineItem::Title(Title { location, text }));
                }
            }
        }
        for note in lexer.extras.drain(..) {
            diagnostics.report(
                Severity::Warning,
                "malformed-source",
                format!("{} {}: {}", work.name, chapter, note),
            );
        }
    }

    /// Serialize to the markup syntax, in the set's current item order
    /// (sort first for the canonical form). Verse markers are emitted
    /// whenever the location changes from the previous item.
    pub fn to_markup(&self, style: &MarkupStyle) -> String {
        let mut out = String::new();
        if self.append {
            out.push_str("//!append\n");
        }
        let mut last = Location::zero();
        for item in self.iter() {
            match item {
                OutlineItem::Work(w) => {
                    out.push_str(&format!("\n# {}\n", w.name));
                    if w.verse_paragraphs {
                        out.push_str("//!verse-paragraphs\n");
                    }
                }
                OutlineItem::Chapter(c) => {
                    out.push_str(&format!("\n## {}\n", c.location.chapter));
                }
                OutlineItem::Title(t) => {
                    if last != t.location {
                        out.push_str(&style.marker(t.location.verse));
                        out.push('\n');
                    }
                    out.push_str(&format!("\n### {}\n", t.text.trim()));
                }
                OutlineItem::Footnote(f) => {
                    if last != f.location {
                        out.push_str(&style.marker(f.location.verse));
                        out.push(' ');
                    }
                    out.push_str(&format!("^[{}] ", f.text));
                }
                OutlineItem::Paragraph(p) => {
                    if last != p.location {
                        out.push_str(&style.marker(p.location.verse));
                        out.push(' ');
                    }
                    out.push_str("\\ ");
                }
            }
            last = *item.location();
        }
        out
    }
}
