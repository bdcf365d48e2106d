//! Cross-surface outline tests
//!
//! The markup and XML surfaces must describe the same in-memory set, convert
//! into each other, and survive their own round trips.

use canto_outline::{
    Diagnostics, Location, MarkupStyle, NoMaps, OutlineItem, OutlineSet, VerseMarkerStyle,
    WorkRegistry,
};
use rstest::rstest;

fn registry() -> WorkRegistry {
    WorkRegistry::from_names([(1, "Genesis"), (19, "Psalms")])
}

const MARKUP: &str = "//!append\n\
# Genesis\n\
## 1\n@1\n\n### Creation\n@2 ^[over the face of the deep] @5 \\\n\
## 2\n@3 \\ ^[the seventh day]\n\
# Psalms\n//!verse-paragraphs\n\
## 3\n### A psalm of David\n@1 ^[when he fled]\n";

fn parse_markup(text: &str) -> OutlineSet {
    let mut diagnostics = Diagnostics::new();
    let mut set = OutlineSet::from_markup(text, &registry(), &NoMaps, &mut diagnostics);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    set.sort();
    set
}

#[rstest]
#[case::at_markers(VerseMarkerStyle::At)]
#[case::superscript_markers(VerseMarkerStyle::Superscript)]
fn markup_round_trip(#[case] verse_markers: VerseMarkerStyle) {
    let set = parse_markup(MARKUP);
    let style = MarkupStyle { verse_markers };

    let serialized = set.to_markup(&style);
    let reparsed = parse_markup(&serialized);

    assert_eq!(reparsed, set);
}

#[test]
fn structured_round_trip() {
    let set = parse_markup(MARKUP);
    let xml = set.to_structured().expect("serializable");

    let mut diagnostics = Diagnostics::new();
    let mut reparsed =
        OutlineSet::from_structured(&xml, &registry(), &NoMaps, &mut diagnostics)
            .expect("well-formed xml");
    reparsed.sort();

    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    assert_eq!(reparsed, set);
}

#[test]
fn surfaces_converge_through_merge() {
    let set = parse_markup(MARKUP);
    let xml = set.to_structured().expect("serializable");

    // fold the same data in from both surfaces
    let mut diagnostics = Diagnostics::new();
    let mut both = OutlineSet::from_markup(MARKUP, &registry(), &NoMaps, &mut diagnostics);
    both.add_structured(&xml, &registry(), &NoMaps, &mut diagnostics)
        .expect("well-formed xml");
    both.sort();

    assert_eq!(both, set);
}

#[test]
fn declared_map_relocates_a_paragraph_break() {
    let maps = |name: &str| (name == "vulgate").then(|| "# Genesis\n1:1=>1:2\n".to_string());
    let mut diagnostics = Diagnostics::new();
    let mut set = OutlineSet::from_markup(
        "//!map vulgate\n# Genesis\n## 1\n@1 \\\n",
        &registry(),
        &maps,
        &mut diagnostics,
    );
    set.sort();

    let relocated = set
        .iter()
        .find_map(|item| match item {
            OutlineItem::Paragraph(p) => Some(p.location),
            _ => None,
        })
        .expect("paragraph break");
    assert_eq!(relocated, Location::new(1, 1, 2));
}

#[test]
fn merging_a_set_with_itself_changes_nothing() {
    let mut set = parse_markup(MARKUP);
    set.sort();
    let mut doubled = set.clone();
    doubled.merge(set.clone());
    doubled.sort();
    assert_eq!(doubled, set);
}
