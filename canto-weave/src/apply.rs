//! Applying an outline to a document
//!
//! The merge-join between a document and its work's sorted annotation list.
//! Both sides advance monotonically: the tokenizer yields document events in
//! order, a second cursor walks the annotations, and after every document
//! token all annotations at or before the resulting chapter/verse position
//! are spliced in. Nothing is spliced ahead of its position and neither
//! cursor ever moves backwards.
//!
//! In replace mode (the set's append flag off) the document's own titles,
//! paragraph breaks and inline footnotes are stripped first, class by class,
//! for the classes the incoming annotations actually carry. In append mode
//! the existing material stays and the annotations land alongside it.
//!
//! A document whose file name is not in the outline is reported and passed
//! through untouched. Annotations that outrun the document (their position
//! never appears) are appended at the end, each with a diagnostic, so a
//! weave cannot silently lose data.

use once_cell::sync::Lazy;
use regex::Regex;

use canto_outline::diagnostics::{Diagnostic, Diagnostics, Severity};
use canto_outline::outline::{OutlineItem, OutlineSet};

use crate::footnotes::{defer_footnotes, matching_bracket, resolve_deferred};
use crate::tokenizer::{tokenize, DocTokenKind};

static SUBHEADINGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^##+[^\n]*\n?").unwrap());
static MULTISPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"  +").unwrap());
static LAYOUT_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(//|/\*)!verse-paragraphs[^\n]*\n?").unwrap());
static INDENTED_VERSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]+(\^[0-9]+\^|@[0-9]+)").unwrap());
static BLANK_AFTER_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(##[^\n]*\n)([ \t]*\n)+").unwrap());
static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n([ \t]*\n){2,}").unwrap());

/// Weave the outline's annotations for one document into its text. `file`
/// is the document's file name, used to find its work marker in the set.
pub fn apply(source: &str, set: &OutlineSet, file: &str, diagnostics: &mut Diagnostics) -> String {
    if set.is_empty() {
        return source.to_string();
    }
    let Some(marker) = set.work_by_file(file) else {
        diagnostics.report(
            Severity::Warning,
            "unknown-work",
            format!("document '{}' has no work in the outline", file),
        );
        return source.to_string();
    };
    let work = marker.location.work;
    let verse_paragraphs = marker.verse_paragraphs;
    let annotations: Vec<&OutlineItem> = set.children_of(work).collect();

    let has_titles = annotations
        .iter()
        .any(|i| matches!(i, OutlineItem::Title(_)));
    let has_footnotes = annotations
        .iter()
        .any(|i| matches!(i, OutlineItem::Footnote(_)));
    let has_breaks = annotations
        .iter()
        .any(|i| matches!(i, OutlineItem::Paragraph(_)));

    let mut text = source.to_string();
    if !set.append {
        if has_footnotes {
            text = resolve_deferred(&text);
            text = strip_inline_footnotes(&text);
        }
        if has_breaks {
            text = remove_blank_lines(&text);
        }
        if has_titles {
            text = SUBHEADINGS.replace_all(&text, "").into_owned();
        }
    }
    text = MULTISPACE.replace_all(&text, " ").into_owned();
    text = LAYOUT_DIRECTIVE.replace_all(&text, "").into_owned();
    if verse_paragraphs {
        text = format!("//!verse-paragraphs\n{}", text);
    }

    let tokens = tokenize(&text);
    let mut out = String::with_capacity(text.len() + 128);
    let mut pos = 0usize;
    let mut chapter = 0i32;
    let mut verse = -1i32;
    let mut next = 0usize;
    let mut prev_kind: Option<DocTokenKind> = None;

    for token in &tokens {
        out.push_str(&text[pos..token.span.start]);
        match token.kind {
            DocTokenKind::Chapter(number) => {
                chapter = number;
                verse = -1;
            }
            DocTokenKind::Verse(number) => verse = number,
            DocTokenKind::LeadIn => verse = 0,
        }
        let position = (chapter, verse);
        let under_heading = matches!(prev_kind, Some(DocTokenKind::Chapter(_)));

        // Annotations that belong before this token's text: everything
        // strictly behind it, plus titles and markers sitting exactly on it
        // (a title heads the verse it is attached to).
        while next < annotations.len() {
            let item = annotations[next];
            let key = (item.location().chapter, item.location().verse);
            let heads_position = matches!(
                item,
                OutlineItem::Title(_) | OutlineItem::Work(_) | OutlineItem::Chapter(_)
            );
            if !(key < position || (key == position && heads_position)) {
                break;
            }
            let tight = under_heading && item.location().chapter == chapter;
            splice(&mut out, item, tight);
            next += 1;
        }

        out.push_str(&text[token.span.start..token.span.end]);
        pos = token.span.end;

        // Annotations on this position that follow the text: footnotes and
        // paragraph breaks, plus titles queued behind them.
        while next < annotations.len() {
            let key = (
                annotations[next].location().chapter,
                annotations[next].location().verse,
            );
            if key > position {
                break;
            }
            splice(&mut out, annotations[next], false);
            next += 1;
        }
        prev_kind = Some(token.kind);
    }
    out.push_str(&text[pos..]);

    for item in &annotations[next..] {
        if item.is_remappable() {
            diagnostics.push(
                Diagnostic::new(
                    Severity::Warning,
                    format!("no position for {} in '{}'", item, file),
                )
                .with_code("unplaced-annotation")
                .at(*item.location()),
            );
            splice(&mut out, item, false);
        }
    }

    let mut result = INDENTED_VERSE.replace_all(&out, "$1").into_owned();
    result = BLANK_AFTER_TITLE.replace_all(&result, "$1").into_owned();
    result = BLANK_RUNS.replace_all(&result, "\n\n").into_owned();
    if result.contains("^[") {
        result = defer_footnotes(&result);
    }
    result
}

/// Insert one annotation at the current end of the output. A title right
/// under its chapter heading is appended as the next line; everything else
/// goes in front of the trailing whitespace, so insertions sit against the
/// verse text they belong to.
fn splice(out: &mut String, item: &OutlineItem, under_heading: bool) {
    match item {
        OutlineItem::Title(title) => {
            if under_heading {
                out.push_str(&format!("## {}\n", title.text.trim()));
            } else {
                before_trailing_ws(out, &format!("\n\n## {}\n", title.text.trim()));
            }
        }
        OutlineItem::Footnote(footnote) => {
            before_trailing_ws(out, &format!(" ^[{}]", footnote.text));
        }
        OutlineItem::Paragraph(_) => {
            before_trailing_ws(out, "\n\n");
        }
        // structure markers carry no text of their own
        OutlineItem::Work(_) | OutlineItem::Chapter(_) => {}
    }
}

fn before_trailing_ws(out: &mut String, insertion: &str) {
    let kept = out.trim_end().len();
    let tail = out.split_off(kept);
    out.push_str(insertion);
    out.push_str(&tail);
}

fn remove_blank_lines(text: &str) -> String {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let mut out = String::with_capacity(text.len());
    for (i, line) in lines.iter().enumerate() {
        let blank = line.trim().is_empty();
        let next_is_heading = lines
            .get(i + 1)
            .map(|l| l.trim_start().starts_with('#'))
            .unwrap_or(false);
        if blank && !next_is_heading {
            continue;
        }
        out.push_str(line);
    }
    out
}

fn strip_inline_footnotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while let Some(found) = text[i..].find("^[") {
        let start = i + found;
        match matching_bracket(&text[start + 2..]) {
            Some(close) => {
                let kept = &text[i..start];
                out.push_str(kept.strip_suffix(' ').unwrap_or(kept));
                i = start + 2 + close + 1;
            }
            None => {
                out.push_str(&text[i..start + 2]);
                i = start + 2;
            }
        }
    }
    out.push_str(&text[i..]);
    out
}
