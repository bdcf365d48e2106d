//! Heading-delimited section splitting
//!
//! Both the outline markup and the versification map files are organized by
//! markdown-style headings. The splitter is line based: a line made of
//! exactly `level` hash marks followed by whitespace opens a section running
//! until the next heading of the same level (deeper headings stay inside the
//! body). Text before the first heading is not part of any section.

pub(crate) struct Section<'a> {
    pub heading: &'a str,
    pub body: &'a str,
}

pub(crate) fn sections(text: &str, level: usize) -> Vec<Section<'_>> {
    let mut found = Vec::new();
    let mut current: Option<(&str, usize)> = None;

    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let start = offset;
        offset += line.len();

        if let Some(heading) = heading_text(line, level) {
            if let Some((head, body_start)) = current.take() {
                found.push(Section {
                    heading: head,
                    body: &text[body_start..start],
                });
            }
            current = Some((heading, offset));
        }
    }
    if let Some((head, body_start)) = current {
        found.push(Section {
            heading: head,
            body: &text[body_start..],
        });
    }
    found
}

/// The heading text if `line` is a heading of exactly the given level.
pub(crate) fn heading_text(line: &str, level: usize) -> Option<&str> {
    let rest = line.trim_start();
    let hashes = rest.len() - rest.trim_start_matches('#').len();
    if hashes != level {
        return None;
    }
    let after = &rest[hashes..];
    if !after.starts_with([' ', '\t']) {
        return None;
    }
    Some(after.trim())
}
