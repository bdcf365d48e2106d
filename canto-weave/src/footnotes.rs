//! Deferred footnotes
//!
//! Documents allow a readable footnote spelling that keeps verse text clean:
//! a marker `^a^` at the reference point with the body `^a^[...]` parked at
//! the end of the paragraph. The weave works on the inline form `^[...]`
//! only, so these passes fold the two spellings into each other:
//! [`resolve_deferred`] moves every parked body back to its reference point,
//! [`defer_footnotes`] parks inline bodies at paragraph end and hands out
//! `a`, `b`, ... labels. Both are pure text transforms and inverse enough
//! that resolve(defer(x)) returns x for well-formed input.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

static REFERENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\^([a-zA-Z]+)\^").unwrap());
static DEF_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\^[a-zA-Z]+$").unwrap());
static PARAGRAPH_SEP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*\n+").unwrap());

/// Byte index of the bracket closing a body that starts right after `^[`,
/// counting nested brackets.
pub(crate) fn matching_bracket(text: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, ch) in text.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Fold deferred footnotes back into inline form: `^a^ text ^a^[body]`
/// becomes `^[body] text`. Iterated to a fixpoint so nested and repeated
/// labels resolve too; a reference without a body is left alone.
pub fn resolve_deferred(text: &str) -> String {
    let mut text = text.to_string();
    while let Some((reference, definition, body)) = find_deferred(&text) {
        let mut out = String::with_capacity(text.len());
        out.push_str(&text[..reference.start]);
        out.push_str("^[");
        out.push_str(&body);
        out.push(']');
        out.push_str(&text[reference.end..definition.start]);
        out.push_str(&text[definition.end..]);
        text = out;
    }
    text
}

fn find_deferred(text: &str) -> Option<(Range<usize>, Range<usize>, String)> {
    for caps in REFERENCE.captures_iter(text) {
        let reference = caps.get(0)?.range();
        if text[reference.end..].starts_with('[') {
            continue; // a parked body, not a reference
        }
        let needle = format!("^{}^[", &caps[1]);
        let Some(found) = text[reference.end..].find(&needle) else {
            continue;
        };
        let definition_start = reference.end + found;
        let body_start = definition_start + needle.len();
        let Some(close) = matching_bracket(&text[body_start..]) else {
            continue;
        };
        let body_end = body_start + close;

        // swallow trailing spaces and one line break left behind by the body
        let bytes = text.as_bytes();
        let mut definition_end = body_end + 1;
        while bytes.get(definition_end) == Some(&b' ') || bytes.get(definition_end) == Some(&b'\t')
        {
            definition_end += 1;
        }
        if bytes.get(definition_end) == Some(&b'\r') {
            definition_end += 1;
        }
        if bytes.get(definition_end) == Some(&b'\n') {
            definition_end += 1;
        }

        let body = text[body_start..body_end].to_string();
        return Some((reference, definition_start..definition_end, body));
    }
    None
}

/// Park inline footnotes at the end of their paragraph, replacing each with
/// a fresh label. Labels run a, b, ..., z, aa, ... across the document.
pub fn defer_footnotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut counter = 0usize;
    let mut last = 0;
    for separator in PARAGRAPH_SEP.find_iter(text) {
        out.push_str(&defer_in_paragraph(&text[last..separator.start()], &mut counter));
        out.push_str(separator.as_str());
        last = separator.end();
    }
    out.push_str(&defer_in_paragraph(&text[last..], &mut counter));
    out
}

fn defer_in_paragraph(paragraph: &str, counter: &mut usize) -> String {
    let mut bodies: Vec<(String, String)> = Vec::new();
    let mut rebuilt = String::with_capacity(paragraph.len());
    let mut i = 0;
    while let Some(found) = paragraph[i..].find("^[") {
        let start = i + found;
        let Some(close) = matching_bracket(&paragraph[start + 2..]) else {
            break;
        };
        let end = start + 2 + close + 1;
        if DEF_PREFIX.is_match(&paragraph[..start]) {
            // already parked under a label
            rebuilt.push_str(&paragraph[i..end]);
            i = end;
            continue;
        }
        *counter += 1;
        let label = label_for(*counter);
        rebuilt.push_str(&paragraph[i..start]);
        rebuilt.push('^');
        rebuilt.push_str(&label);
        rebuilt.push('^');
        bodies.push((label, paragraph[start + 2..end - 1].to_string()));
        i = end;
    }
    rebuilt.push_str(&paragraph[i..]);

    if bodies.is_empty() {
        return rebuilt;
    }
    if !rebuilt.ends_with('\n') {
        rebuilt.push('\n');
    }
    for (i, (label, body)) in bodies.iter().enumerate() {
        if i > 0 {
            rebuilt.push(' ');
        }
        rebuilt.push('^');
        rebuilt.push_str(label);
        rebuilt.push_str("^[");
        rebuilt.push_str(body);
        rebuilt.push(']');
    }
    rebuilt
}

fn label_for(mut n: usize) -> String {
    let mut label = String::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        label.insert(0, (b'a' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    label
}
