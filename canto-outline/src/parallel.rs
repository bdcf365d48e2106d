//! Parallel-verse cross references
//!
//! A link tree pairs one verse with the places that parallel it in other
//! works. Compiled into an outline, every group becomes an append-mode
//! footnote citing the parallels by abbreviation, ready to be woven into the
//! documents alongside hand-written annotations:
//!
//!   <links>
//!     <verse bn="1" cn="1" vn="1">
//!       <link bn="43" cn1="1" vn1="1" vn2="3"/>
//!     </verse>
//!   </links>

use serde::Deserialize;

use crate::diagnostics::{Diagnostics, Severity};
use crate::error::{OutlineError, OutlineResult};
use crate::location::Location;
use crate::outline::item::{Footnote, OutlineItem};
use crate::outline::set::OutlineSet;
use crate::versification::VersificationMap;
use crate::work::WorkRegistry;

/// One verse and its parallels elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct ParallelVerse {
    pub verse: Location,
    pub parallels: Vec<Location>,
}

#[derive(Debug, Deserialize)]
struct LinkListDoc {
    #[serde(rename = "verse", default)]
    verses: Vec<VerseElement>,
}

#[derive(Debug, Deserialize)]
struct VerseElement {
    #[serde(rename = "@bn")]
    work: i32,
    #[serde(rename = "@cn")]
    chapter: i32,
    #[serde(rename = "@vn")]
    verse: i32,
    #[serde(rename = "link", default)]
    links: Vec<LinkElement>,
}

#[derive(Debug, Deserialize)]
struct LinkElement {
    #[serde(rename = "@bn")]
    work: i32,
    #[serde(rename = "@cn1")]
    chapter: i32,
    #[serde(rename = "@vn1")]
    verse: i32,
    #[serde(rename = "@vn2", default)]
    up_to: Option<i32>,
}

/// Read a link tree. Entries naming works absent from the registry are
/// skipped with a diagnostic; an optional versification map is applied to
/// every location. The result is ordered by verse location.
pub fn parse_links(
    xml: &str,
    map: Option<&VersificationMap>,
    registry: &WorkRegistry,
    diagnostics: &mut Diagnostics,
) -> OutlineResult<Vec<ParallelVerse>> {
    let doc: LinkListDoc =
        quick_xml::de::from_str(xml).map_err(|e| OutlineError::Xml(e.to_string()))?;

    let remap = |location: Location, diagnostics: &mut Diagnostics| match map {
        Some(map) => map.map_audited(&location, registry, diagnostics),
        None => location,
    };

    let mut verses = Vec::with_capacity(doc.verses.len());
    for element in doc.verses {
        if registry.by_ordinal(None, element.work).is_none() {
            diagnostics.report(
                Severity::Warning,
                "unknown-work",
                format!("parallel verse names unknown work ordinal {}", element.work),
            );
            continue;
        }
        let verse = remap(
            Location::new(element.work, element.chapter, element.verse),
            diagnostics,
        );

        let mut parallels = Vec::with_capacity(element.links.len());
        for link in element.links {
            if registry.by_ordinal(None, link.work).is_none() {
                diagnostics.report(
                    Severity::Warning,
                    "unknown-work",
                    format!("parallel link names unknown work ordinal {}", link.work),
                );
                continue;
            }
            let mut location = Location::new(link.work, link.chapter, link.verse.abs());
            if let Some(up_to) = link.up_to {
                location = location.up_to(up_to);
            }
            let mut mapped = remap(location, diagnostics);
            if mapped.verse < 1 {
                mapped.verse = 1;
            }
            parallels.push(mapped);
        }
        verses.push(ParallelVerse { verse, parallels });
    }
    verses.sort_by_key(|pv| pv.verse);
    Ok(verses)
}

/// Compile parallel verses into an append-mode footnote outline, one
/// footnote per verse group:
///
///   ^[**1:1** Jhn 1,1-3; Heb 11,3]
pub fn to_outline(verses: &[ParallelVerse], registry: &WorkRegistry) -> OutlineSet {
    let mut set = OutlineSet::new();
    set.append = true;

    let mut last_work = None;
    let mut last_chapter = None;
    for group in verses {
        let Some(work) = registry.by_ordinal(None, group.verse.work) else {
            continue;
        };
        if last_work != Some(group.verse.work) {
            set.ensure_work(work, &work.file_name(), false);
            last_work = Some(group.verse.work);
            last_chapter = None;
        }
        if last_chapter != Some(group.verse.chapter) {
            set.ensure_chapter(group.verse.work, group.verse.chapter);
            last_chapter = Some(group.verse.chapter);
        }

        let mut text = format!(
            "**{}:{}**",
            group.verse.chapter,
            group.verse.verse.max(1)
        );
        for (i, parallel) in group.parallels.iter().enumerate() {
            let cited = registry
                .by_ordinal(None, parallel.work)
                .map(|w| {
                    if w.abbreviation.is_empty() {
                        w.name.as_str()
                    } else {
                        w.abbreviation.as_str()
                    }
                })
                .unwrap_or("?");
            text.push_str(if i == 0 { " " } else { "; " });
            text.push_str(&format!("{} {},{}", cited, parallel.chapter, parallel.verse));
            if let Some(up_to) = parallel.up_to_verse {
                if up_to > 0 {
                    text.push_str(&format!("-{}", up_to));
                }
            }
        }

        set.push(OutlineItem::Footnote(Footnote {
            location: group.verse,
            text,
        }));
    }
    set.sort();
    set
}
