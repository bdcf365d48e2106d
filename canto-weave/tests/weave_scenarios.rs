//! End-to-end weave scenarios
//!
//! Documents and outlines going through the full pipeline: parse an outline
//! from either surface, weave it into a document, and scan documents back
//! into outlines.

use canto_outline::{Diagnostics, NoMaps, OutlineSet, Work, WorkRegistry};
use canto_weave::{apply, derive};
use rstest::rstest;

fn registry() -> WorkRegistry {
    WorkRegistry::from_names([(1, "Genesis")])
}

fn outline_from_markup(markup: &str) -> OutlineSet {
    let mut diagnostics = Diagnostics::new();
    let mut set = OutlineSet::from_markup(markup, &registry(), &NoMaps, &mut diagnostics);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    set.sort();
    set
}

#[test]
fn title_weaves_in_under_the_chapter_heading() {
    let set = outline_from_markup("# Genesis\n## 1\n@1\n\n### Creation\n");
    let mut diagnostics = Diagnostics::new();

    let woven = apply(
        "# 1\n^1^ In the beginning ^2^ the earth was void.",
        &set,
        "01-Genesis.md",
        &mut diagnostics,
    );

    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    assert!(
        woven.starts_with("# 1\n## Creation\n^1^ In the beginning"),
        "title must follow the chapter heading: {woven:?}"
    );
    assert_eq!(woven.matches("# 1").count(), 1);
    assert!(woven.contains("^2^ the earth was void."));
}

#[test]
fn outline_from_xml_weaves_the_same_way() {
    let xml = r#"<Outline><Work Name="Genesis" File="01-Genesis.md"><Chapter Number="1"><Title Verse="1">Creation</Title></Chapter></Work></Outline>"#;
    let mut diagnostics = Diagnostics::new();
    let mut set = OutlineSet::from_structured(xml, &registry(), &NoMaps, &mut diagnostics)
        .expect("well-formed xml");
    set.sort();

    let woven = apply(
        "# 1\n^1^ In the beginning ^2^ the earth was void.",
        &set,
        "01-Genesis.md",
        &mut diagnostics,
    );
    assert!(woven.starts_with("# 1\n## Creation\n^1^ In the beginning"));
}

#[test]
fn derive_then_apply_reproduces_the_annotations() {
    let annotated = "# 1\n## Opening\n@1 one ^[note on one]\n@2 two\n\n@3 three\n";
    let bare = "# 1\n@1 one\n@2 two\n@3 three\n";
    let work = Work::new(1, "Genesis");

    let mut diagnostics = Diagnostics::new();
    let derived = derive(annotated, &work, "01-Genesis.md", &mut diagnostics);
    let woven = apply(bare, &derived, "01-Genesis.md", &mut diagnostics);
    let rederived = derive(&woven, &work, "01-Genesis.md", &mut diagnostics);

    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    assert_eq!(rederived, derived);
}

#[test]
fn replace_and_append_modes_differ() {
    let source = "# 1\n## Stale Title\n@1 one\n";

    let replace = outline_from_markup("# Genesis\n## 1\n@1\n\n### Fresh Title\n");
    let mut diagnostics = Diagnostics::new();
    let replaced = apply(source, &replace, "01-Genesis.md", &mut diagnostics);
    assert!(!replaced.contains("Stale Title"));
    assert!(replaced.contains("## Fresh Title"));

    let append = outline_from_markup("//!append\n# Genesis\n## 1\n@1\n\n### Fresh Title\n");
    let appended = apply(source, &append, "01-Genesis.md", &mut diagnostics);
    assert!(appended.contains("## Stale Title"));
    assert!(appended.contains("## Fresh Title"));
}

#[rstest]
#[case::superscript("# 1\n^1^ one ^2^ two\n")]
#[case::at("# 1\n@1 one @2 two\n")]
fn both_verse_spellings_weave(#[case] source: &str) {
    let set = outline_from_markup("# Genesis\n## 1\n@1\n\n### Creation\n");
    let mut diagnostics = Diagnostics::new();
    let woven = apply(source, &set, "01-Genesis.md", &mut diagnostics);
    assert!(woven.starts_with("# 1\n## Creation\n"));
}

#[test]
fn woven_document_shape() {
    let set = outline_from_markup("# Genesis\n## 1\n@1\n\n### Creation\n@2 \\\n");
    let mut diagnostics = Diagnostics::new();
    let woven = apply(
        "# 1\n@1 In the beginning\n@2 and the earth\n@3 was void\n",
        &set,
        "01-Genesis.md",
        &mut diagnostics,
    );
    insta::assert_snapshot!(woven.trim_end(), @r###"
    # 1
    ## Creation
    @1 In the beginning
    @2 and the earth

    @3 was void
    "###);
}

#[test]
fn document_without_a_work_is_untouched() {
    let set = outline_from_markup("# Genesis\n## 1\n@1 \\\n");
    let mut diagnostics = Diagnostics::new();
    let source = "# 1\n@1 untracked\n";

    assert_eq!(apply(source, &set, "40-Matthew.md", &mut diagnostics), source);
    assert!(diagnostics.has_code("unknown-work"));
}
