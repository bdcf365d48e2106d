//! Structured outline surface
//!
//! The XML encoding of the same annotation stream, for tools that would
//! rather edit an element tree than markup:
//!
//!   <Outline Append="true">
//!     <Work Name="Genesis" File="01-Genesis.md">
//!       <Chapter Number="1">
//!         <Title Verse="1">Creation</Title>
//!         <Footnote Verse="2">over the deep</Footnote>
//!         <Paragraph Verse="5"/>
//!       </Chapter>
//!     </Work>
//!   </Outline>
//!
//! Both surfaces describe the same data and parse to the identical in-memory
//! set, so a markup file and an XML file covering the same works can be
//! folded into one set and deduplicated.

use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostics, Severity};
use crate::error::{OutlineError, OutlineResult};
use crate::location::Location;
use crate::outline::item::{Footnote, OutlineItem, ParagraphBreak, Title};
use crate::outline::set::OutlineSet;
use crate::versification::{MapSource, VersificationMap};
use crate::work::WorkRegistry;

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// Root of the XML surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "Outline")]
pub struct OutlineDoc {
    #[serde(rename = "@Append", default, skip_serializing_if = "Option::is_none")]
    pub append: Option<bool>,
    #[serde(rename = "@Map", default, skip_serializing_if = "Option::is_none")]
    pub map: Option<String>,
    #[serde(rename = "Work", default)]
    pub works: Vec<WorkElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkElement {
    #[serde(rename = "@Name")]
    pub name: String,
    #[serde(rename = "@File", default)]
    pub file: String,
    #[serde(rename = "@VerseParagraphs", default, skip_serializing_if = "is_false")]
    pub verse_paragraphs: bool,
    #[serde(rename = "Chapter", default)]
    pub chapters: Vec<ChapterElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterElement {
    #[serde(rename = "@Number")]
    pub number: i32,
    #[serde(rename = "$value", default)]
    pub entries: Vec<ChapterEntry>,
}

/// Chapter children, in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChapterEntry {
    Title(NoteElement),
    Footnote(NoteElement),
    Paragraph(BreakElement),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteElement {
    #[serde(rename = "@Verse")]
    pub verse: i32,
    #[serde(rename = "$text", default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakElement {
    #[serde(rename = "@Verse")]
    pub verse: i32,
}

impl OutlineSet {
    /// Parse one XML outline into a fresh set.
    pub fn from_structured(
        xml: &str,
        registry: &WorkRegistry,
        maps: &dyn MapSource,
        diagnostics: &mut Diagnostics,
    ) -> OutlineResult<OutlineSet> {
        let mut set = OutlineSet::new();
        set.add_structured(xml, registry, maps, diagnostics)?;
        Ok(set)
    }

    /// Parse one XML outline into this set. An unreadable document is a
    /// per-file error; inside a readable one, unknown works are skipped with
    /// a diagnostic like on the markup surface.
    pub fn add_structured(
        &mut self,
        xml: &str,
        registry: &WorkRegistry,
        maps: &dyn MapSource,
        diagnostics: &mut Diagnostics,
    ) -> OutlineResult<()> {
        let doc: OutlineDoc =
            quick_xml::de::from_str(xml).map_err(|e| OutlineError::Xml(e.to_string()))?;
        self.add_structured_doc(doc, registry, maps, diagnostics);
        Ok(())
    }

    /// Fold an already-deserialized tree into this set.
    pub fn add_structured_doc(
        &mut self,
        doc: OutlineDoc,
        registry: &WorkRegistry,
        maps: &dyn MapSource,
        diagnostics: &mut Diagnostics,
    ) {
        if doc.append == Some(true) {
            self.append = true;
        }
        let map = doc.map.as_deref().and_then(|name| {
            let name = name.trim();
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
        });

        for work_element in doc.works {
            let Some(work) = registry.by_name(None, &work_element.name) else {
                diagnostics.report(
                    Severity::Warning,
                    "unknown-work",
                    format!("outline names unknown work '{}'", work_element.name),
                );
                continue;
            };
            let work = work.clone();
            let file = if work_element.file.is_empty() {
                work.file_name()
            } else {
                work_element.file.clone()
            };
            self.ensure_work(&work, &file, work_element.verse_paragraphs);

            for chapter in work_element.chapters {
                self.ensure_chapter(work.ordinal, chapter.number);
                for entry in chapter.entries {
                    let mapped = |verse: i32, diagnostics: &mut Diagnostics| {
                        let location = Location::new(work.ordinal, chapter.number, verse);
                        match map.as_ref() {
                            Some(map) => map.map_audited(&location, registry, diagnostics),
                            None => location,
                        }
                    };
                    match entry {
                        ChapterEntry::Title(note) => {
                            let location = mapped(note.verse, diagnostics);
                            self.push_unique(OutlineItem::Title(Title {
                                location,
                                text: note.text.trim().to_string(),
                            }));
                        }
                        ChapterEntry::Footnote(note) => {
                            let location = mapped(note.verse, diagnostics);
                            self.push_unique(OutlineItem::Footnote(Footnote {
                                location,
                                text: note.text.trim().to_string(),
                            }));
                        }
                        ChapterEntry::Paragraph(break_element) => {
                            let location = mapped(break_element.verse, diagnostics);
                            self.push_unique(OutlineItem::Paragraph(ParagraphBreak { location }));
                        }
                    }
                }
            }
        }
    }

    /// Build the element tree for the set's current item order (sort first
    /// for the canonical form). Content items preceding any work or chapter
    /// marker have nowhere to hang and are dropped.
    pub fn to_structured_doc(&self) -> OutlineDoc {
        let mut doc = OutlineDoc {
            append: self.append.then_some(true),
            map: None,
            works: Vec::new(),
        };
        for item in self.iter() {
            match item {
                OutlineItem::Work(w) => doc.works.push(WorkElement {
                    name: w.name.clone(),
                    file: w.file.clone(),
                    verse_paragraphs: w.verse_paragraphs,
                    chapters: Vec::new(),
                }),
                OutlineItem::Chapter(c) => {
                    if let Some(work) = doc.works.last_mut() {
                        work.chapters.push(ChapterElement {
                            number: c.location.chapter,
                            entries: Vec::new(),
                        });
                    }
                }
                OutlineItem::Title(t) => {
                    if let Some(chapter) = doc.works.last_mut().and_then(|w| w.chapters.last_mut())
                    {
                        chapter.entries.push(ChapterEntry::Title(NoteElement {
                            verse: t.location.verse,
                            text: t.text.trim().to_string(),
                        }));
                    }
                }
                OutlineItem::Footnote(f) => {
                    if let Some(chapter) = doc.works.last_mut().and_then(|w| w.chapters.last_mut())
                    {
                        chapter.entries.push(ChapterEntry::Footnote(NoteElement {
                            verse: f.location.verse,
                            text: f.text.clone(),
                        }));
                    }
                }
                OutlineItem::Paragraph(p) => {
                    if let Some(chapter) = doc.works.last_mut().and_then(|w| w.chapters.last_mut())
                    {
                        chapter.entries.push(ChapterEntry::Paragraph(BreakElement {
                            verse: p.location.verse,
                        }));
                    }
                }
            }
        }
        doc
    }

    /// Serialize to the XML surface.
    pub fn to_structured(&self) -> OutlineResult<String> {
        quick_xml::se::to_string(&self.to_structured_doc())
            .map_err(|e| OutlineError::Xml(e.to_string()))
    }
}
