//! Versification maps
//!
//! Different editions of the same work can number chapters and verses
//! differently. A versification map translates a location in the source
//! scheme to the equivalent location in the target scheme, one work at a
//! time, as a piecewise constant-offset function over an ordered breakpoint
//! table.
//!
//! Map files are heading-per-work text:
//!
//!   # Números
//!   12:16=>13:1 13:1=>13:2 13:33=>13:33
//!
//! which sends 12:16 to 13:1 and carries every following verse along by the
//! same offset until the next breakpoint takes over.
//!
//! A map is built once per annotation file, held for one pass, and
//! discarded. Lookup is read-only; remaps that actually move a verse can be
//! reported to the diagnostics sink for audit.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::diagnostics::{Diagnostic, Diagnostics, Severity};
use crate::location::Location;
use crate::sections::sections;
use crate::work::WorkRegistry;

/// The caller's hook for turning a declared map name into map file text.
/// File I/O stays outside the engine; parse operations only ever see this
/// trait.
pub trait MapSource {
    fn load(&self, name: &str) -> Option<String>;
}

/// Resolver for callers that have no map files at all.
pub struct NoMaps;

impl MapSource for NoMaps {
    fn load(&self, _name: &str) -> Option<String> {
        None
    }
}

impl<F> MapSource for F
where
    F: Fn(&str) -> Option<String>,
{
    fn load(&self, name: &str) -> Option<String> {
        self(name)
    }
}

type ChapterVerse = (i32, i32);

/// Per-work piecewise remapper between two versification schemes.
#[derive(Debug, Clone, Default)]
pub struct VersificationMap {
    works: BTreeMap<i32, Vec<(ChapterVerse, ChapterVerse)>>,
}

static PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+):([0-9]+)=>([0-9]+):([0-9]+)").unwrap());

impl VersificationMap {
    /// Parse a map file. Sections naming works absent from the registry are
    /// skipped with a diagnostic; sections without a single well-formed pair
    /// are dropped.
    pub fn parse(source: &str, registry: &WorkRegistry, diagnostics: &mut Diagnostics) -> Self {
        let mut works = BTreeMap::new();
        for section in sections(source, 1) {
            let name = section.heading;
            let Some(work) = registry.by_name(None, name) else {
                diagnostics.report(
                    Severity::Warning,
                    "unknown-work",
                    format!("versification map names unknown work '{}'", name),
                );
                continue;
            };

            let mut table: Vec<(ChapterVerse, ChapterVerse)> = Vec::new();
            for caps in PAIR.captures_iter(section.body) {
                let numbers: Option<Vec<i32>> =
                    (1..=4).map(|i| caps[i].parse().ok()).collect();
                match numbers.as_deref() {
                    Some([c1, v1, c2, v2]) => table.push(((*c1, *v1), (*c2, *v2))),
                    _ => diagnostics.report(
                        Severity::Warning,
                        "malformed-source",
                        format!("unreadable breakpoint '{}' for {}", &caps[0], name),
                    ),
                }
            }
            if table.is_empty() {
                continue;
            }
            table.sort_by_key(|(from, _)| *from);
            table.dedup_by_key(|(from, _)| *from);
            works.insert(work.ordinal, table);
        }
        Self { works }
    }

    pub fn is_empty(&self) -> bool {
        self.works.is_empty()
    }

    /// Map one location. Verses below zero count as verse 1; locations in
    /// unmapped works or before a work's first breakpoint pass through
    /// unchanged. A range end is mapped recursively and dropped when it no
    /// longer forms a forward range in the mapped chapter.
    pub fn map(&self, location: &Location) -> Location {
        let mut source = *location;
        if source.verse < 0 {
            source.verse = 1;
        }
        let Some(table) = self.works.get(&source.work) else {
            return source;
        };
        let idx = table.partition_point(|(from, _)| *from <= source.position());
        if idx == 0 {
            return source;
        }
        let (from, to) = table[idx - 1];

        let mut mapped = Location::new(
            source.work,
            source.chapter - from.0 + to.0,
            source.verse - from.1 + to.1,
        );
        if let Some(up_to) = source.up_to_verse {
            let end = self.map(&Location::new(source.work, source.chapter, up_to));
            if end.chapter == mapped.chapter && end.verse >= mapped.verse {
                mapped.up_to_verse = Some(end.verse);
            }
        }
        mapped
    }

    /// [`map`](Self::map), reporting any location that actually moved.
    pub fn map_audited(
        &self,
        location: &Location,
        registry: &WorkRegistry,
        diagnostics: &mut Diagnostics,
    ) -> Location {
        let mapped = self.map(location);
        let mut source = *location;
        if source.verse < 0 {
            source.verse = 1;
        }
        if mapped.position() != source.position() {
            let name = registry
                .by_ordinal(None, location.work)
                .map(|w| w.name.as_str())
                .unwrap_or("?");
            diagnostics.push(
                Diagnostic::new(
                    Severity::Info,
                    format!(
                        "verse mapped from {} {}:{} to {}:{}",
                        name, source.chapter, source.verse, mapped.chapter, mapped.verse
                    ),
                )
                .with_code("verse-remapped")
                .at(*location),
            );
        }
        mapped
    }

    /// Remap scripture references embedded in running text, e.g. footnote
    /// bodies citing `Gen 1:3` or `Gen 1,3-5`. Abbreviations come from the
    /// registry; anything it cannot attribute is left alone.
    pub fn map_references(
        &self,
        text: &str,
        registry: &WorkRegistry,
        language: Option<&str>,
    ) -> String {
        let abbreviations = registry.abbreviations(language);
        if abbreviations.is_empty() {
            return text.to_string();
        }
        let alternation = abbreviations
            .iter()
            .map(|a| regex::escape(a))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(
            r"\b(?P<abbr>{})\s+(?P<chapter>[0-9]+)(?P<sep>[:,])(?P<verse>[0-9]+)(?:-(?P<upto>[0-9]+))?",
            alternation
        );
        let re = match Regex::new(&pattern) {
            Ok(re) => re,
            Err(_) => return text.to_string(),
        };

        re.replace_all(text, |caps: &regex::Captures| {
            let abbr = &caps["abbr"];
            let work = registry.works(language).find(|w| w.abbreviation == abbr);
            let (Some(work), Ok(chapter), Ok(verse)) = (
                work,
                caps["chapter"].parse::<i32>(),
                caps["verse"].parse::<i32>(),
            ) else {
                return caps[0].to_string();
            };

            let mut location = Location::new(work.ordinal, chapter, verse);
            if let Some(up_to) = caps.name("upto").and_then(|m| m.as_str().parse().ok()) {
                location = location.up_to(up_to);
            }
            let mapped = self.map(&location);
            let up_to = mapped
                .up_to_verse
                .map(|u| format!("-{}", u))
                .unwrap_or_default();
            format!(
                "{} {}{}{}{}",
                abbr, mapped.chapter, &caps["sep"], mapped.verse, up_to
            )
        })
        .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> WorkRegistry {
        let mut registry = WorkRegistry::new();
        registry.insert(crate::work::Work::new(1, "Genesis").abbreviated("Gen"));
        registry.insert(crate::work::Work::new(4, "Numbers").abbreviated("Num"));
        registry
    }

    fn numbers_map() -> VersificationMap {
        let mut diagnostics = Diagnostics::new();
        let map = VersificationMap::parse(
            "# Numbers\n12:16=>13:1 13:33=>13:33\n",
            &registry(),
            &mut diagnostics,
        );
        assert!(diagnostics.is_empty());
        map
    }

    #[test]
    fn test_offset_carries_between_breakpoints() {
        let map = numbers_map();
        // 12:16=>13:1 shifts by one chapter and back 15 verses
        let mapped = map.map(&Location::new(4, 12, 20));
        assert_eq!(mapped.position(), (13, 5));
    }

    #[test]
    fn test_identity_before_first_breakpoint() {
        let map = numbers_map();
        let loc = Location::new(4, 12, 15);
        assert_eq!(map.map(&loc), loc);
        assert_eq!(map.map(&loc).position(), (12, 15));
    }

    #[test]
    fn test_unmapped_work_passes_through() {
        let map = numbers_map();
        let loc = Location::new(1, 12, 20);
        assert_eq!(map.map(&loc).position(), (12, 20));
    }

    #[test]
    fn test_identity_breakpoint_is_a_fixed_point() {
        let map = numbers_map();
        let loc = Location::new(4, 13, 33);
        let once = map.map(&loc);
        assert_eq!(once.position(), (13, 33));
        assert_eq!(map.map(&once), once);
    }

    #[test]
    fn test_negative_verse_normalizes_to_one() {
        let map = numbers_map();
        let mapped = map.map(&Location::new(4, 12, -1));
        // treated as 12:1, which precedes the first breakpoint
        assert_eq!(mapped.position(), (12, 1));
    }

    #[test]
    fn test_range_end_maps_with_the_start() {
        let map = numbers_map();
        let mapped = map.map(&Location::new(4, 12, 16).up_to(18));
        assert_eq!(mapped.position(), (13, 1));
        assert_eq!(mapped.up_to_verse, Some(3));
    }

    #[test]
    fn test_range_end_collapses_across_chapters() {
        let mut diagnostics = Diagnostics::new();
        let map = VersificationMap::parse(
            "# Numbers\n12:16=>12:16 12:18=>13:1\n",
            &registry(),
            &mut diagnostics,
        );
        // 12:16 stays put, 12:18 moves to chapter 13: the range cannot survive
        let mapped = map.map(&Location::new(4, 12, 16).up_to(18));
        assert_eq!(mapped.position(), (12, 16));
        assert_eq!(mapped.up_to_verse, None);
    }

    #[test]
    fn test_range_surviving_before_any_breakpoint_passes_through() {
        let map = numbers_map();
        let mapped = map.map(&Location::new(4, 12, 10).up_to(12));
        assert_eq!(mapped.position(), (12, 10));
        assert_eq!(mapped.up_to_verse, Some(12));
    }

    #[test]
    fn test_unknown_work_section_is_skipped() {
        let mut diagnostics = Diagnostics::new();
        let map = VersificationMap::parse(
            "# Atlantis\n1:1=>1:2\n",
            &registry(),
            &mut diagnostics,
        );
        assert!(map.is_empty());
        assert!(diagnostics.has_code("unknown-work"));
    }

    #[test]
    fn test_audited_map_reports_moves_only() {
        let map = numbers_map();
        let registry = registry();
        let mut diagnostics = Diagnostics::new();

        map.map_audited(&Location::new(4, 12, 15), &registry, &mut diagnostics);
        assert!(diagnostics.is_empty());

        map.map_audited(&Location::new(4, 12, 20), &registry, &mut diagnostics);
        assert!(diagnostics.has_code("verse-remapped"));
    }

    #[test]
    fn test_reference_remapping_in_text() {
        let map = numbers_map();
        let text = "compare Num 12:20 and Gen 1,1";
        let mapped = map.map_references(text, &registry(), None);
        assert_eq!(mapped, "compare Num 13:5 and Gen 1,1");
    }
}
