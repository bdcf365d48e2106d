//! Deriving an outline from a bare document
//!
//! The building direction: when no persisted outline exists yet, scan a
//! document and lift its structure out. Chapters come from `# N` lines,
//! titles from `## T` lines, paragraph breaks from blank lines separating
//! verse text, footnotes from inline `^[...]` bodies (deferred ones are
//! resolved first). The verse cursor follows the same rules as the outline
//! markup parser: markers in either spelling move it, and anything found
//! before the first marker of a chapter attaches to verse 0.

use canto_outline::diagnostics::{Diagnostics, Severity};
use canto_outline::location::Location;
use canto_outline::outline::{
    ChapterMarker, Footnote, OutlineItem, OutlineSet, ParagraphBreak, Title, WorkMarker,
};
use canto_outline::work::Work;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::footnotes::{matching_bracket, resolve_deferred};
use crate::tokenizer::{CHAPTER_LINE, VERSE_MARK};

static LAYOUT_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(//|/\*)!verse-paragraphs").unwrap());
static VERSE_LEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*(\^[0-9]+\^|@[0-9]+)").unwrap());

/// Scan one document into a fresh outline for its work. The result is
/// sorted and ready to merge or serialize.
pub fn derive(
    source: &str,
    work: &Work,
    file: &str,
    diagnostics: &mut Diagnostics,
) -> OutlineSet {
    let text = resolve_deferred(source);
    let mut set = OutlineSet::new();

    let mut marker = WorkMarker::new(work, file);
    marker.verse_paragraphs = LAYOUT_DIRECTIVE.is_match(&text);
    set.push(OutlineItem::Work(marker));

    let lines: Vec<&str> = text.lines().collect();
    let mut chapter = 0i32;
    let mut verse = 0i32;

    for (i, line) in lines.iter().enumerate() {
        if let Some(caps) = CHAPTER_LINE.captures(line) {
            chapter = caps[1].parse().unwrap_or(chapter + 1);
            verse = 0;
            set.push(OutlineItem::Chapter(ChapterMarker::new(work.ordinal, chapter)));
            continue;
        }
        if chapter == 0 {
            continue; // front matter before the first chapter
        }
        if let Some(title) = line.strip_prefix("##").filter(|t| t.starts_with([' ', '\t'])) {
            set.push(OutlineItem::Title(Title {
                location: Location::new(work.ordinal, chapter, verse),
                text: title.trim().to_string(),
            }));
            continue;
        }
        if line.trim().is_empty() {
            // a paragraph break, but only between runs of verse text
            let continues = lines[i + 1..]
                .iter()
                .find(|l| !l.trim().is_empty())
                .map(|l| VERSE_LEAD.is_match(l))
                .unwrap_or(false);
            if continues && verse > 0 {
                set.push(OutlineItem::Paragraph(ParagraphBreak {
                    location: Location::new(work.ordinal, chapter, verse),
                }));
            }
            continue;
        }
        scan_verse_line(&mut set, line, work, chapter, &mut verse, diagnostics);
    }

    set.sort();
    set
}

/// Walk one line of verse text, moving the cursor over markers and lifting
/// inline footnotes.
fn scan_verse_line(
    set: &mut OutlineSet,
    line: &str,
    work: &Work,
    chapter: i32,
    verse: &mut i32,
    diagnostics: &mut Diagnostics,
) {
    let mut i = 0;
    while i < line.len() {
        let marker = VERSE_MARK
            .captures(&line[i..])
            .and_then(|caps| {
                let m = caps.get(0)?;
                let number: i32 = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .and_then(|v| v.as_str().parse().ok())?;
                Some((i + m.start(), i + m.end(), number))
            });
        let footnote = line[i..].find("^[").map(|found| i + found);

        match (marker, footnote) {
            (Some((start, end, number)), at) if at.map_or(true, |at| start < at) => {
                *verse = number;
                i = end;
            }
            (_, Some(start)) => match matching_bracket(&line[start + 2..]) {
                Some(close) => {
                    set.push(OutlineItem::Footnote(Footnote {
                        location: Location::new(work.ordinal, chapter, *verse),
                        text: line[start + 2..start + 2 + close].trim().to_string(),
                    }));
                    i = start + 2 + close + 1;
                }
                None => {
                    diagnostics.report(
                        Severity::Warning,
                        "malformed-source",
                        format!(
                            "{} {}: footnote reaches end of line without a closing bracket",
                            work.name, chapter
                        ),
                    );
                    i = line.len();
                }
            },
            _ => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genesis() -> Work {
        Work::new(1, "Genesis")
    }

    fn derive_kinds(source: &str) -> Vec<&'static str> {
        let mut diagnostics = Diagnostics::new();
        let set = derive(source, &genesis(), "01-Genesis.md", &mut diagnostics);
        set.iter().map(|i| i.kind()).collect()
    }

    #[test]
    fn test_chapters_titles_and_breaks() {
        let source = "# 1\n## Creation\n@1 In the beginning\n@2 the earth was void\n\n@3 and there was light\n# 2\n@1 Thus were finished\n";
        let mut diagnostics = Diagnostics::new();
        let set = derive(source, &genesis(), "01-Genesis.md", &mut diagnostics);

        assert!(diagnostics.is_empty());
        let kinds: Vec<_> = set.iter().map(|i| i.kind()).collect();
        assert_eq!(
            kinds,
            ["work", "chapter", "title", "paragraph", "chapter"]
        );
        let title = set
            .iter()
            .find_map(|i| match i {
                OutlineItem::Title(t) => Some(t),
                _ => None,
            })
            .expect("title");
        assert_eq!(title.text, "Creation");
        assert_eq!(title.location.position(), (1, 0));
        let break_item = set
            .iter()
            .find_map(|i| match i {
                OutlineItem::Paragraph(p) => Some(p),
                _ => None,
            })
            .expect("paragraph");
        assert_eq!(break_item.location.position(), (1, 2));
    }

    #[test]
    fn test_footnotes_lifted_from_verse_text() {
        let source = "# 1\n@1 In the beginning ^[or: when God began] God created\n";
        let mut diagnostics = Diagnostics::new();
        let set = derive(source, &genesis(), "01-Genesis.md", &mut diagnostics);

        let footnote = set
            .iter()
            .find_map(|i| match i {
                OutlineItem::Footnote(f) => Some(f),
                _ => None,
            })
            .expect("footnote");
        assert_eq!(footnote.text, "or: when God began");
        assert_eq!(footnote.location.position(), (1, 1));
    }

    #[test]
    fn test_deferred_footnotes_resolved_before_scan() {
        let source = "# 1\n@1 In the beginning^a^ God created\n^a^[or: when God began]\n";
        assert_eq!(
            derive_kinds(source),
            ["work", "chapter", "footnote"]
        );
    }

    #[test]
    fn test_layout_directive_sets_the_work_flag() {
        let source = "//!verse-paragraphs\n# 1\n@1 Blessed is the one\n";
        let mut diagnostics = Diagnostics::new();
        let set = derive(source, &genesis(), "01-Genesis.md", &mut diagnostics);
        assert!(set.work_markers().next().expect("marker").verse_paragraphs);
    }

    #[test]
    fn test_blank_line_before_heading_is_not_a_break() {
        let source = "# 1\n@1 one\n@2 two\n\n# 2\n@1 three\n";
        assert_eq!(derive_kinds(source), ["work", "chapter", "chapter"]);
    }
}
