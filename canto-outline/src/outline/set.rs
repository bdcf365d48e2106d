//! The outline set
//!
//! The canonical store for a parsed annotation stream: one flat ordered list
//! of [`OutlineItem`]s plus the latched append flag. The per-work child
//! lists the weave consumes are a derived index over the flat list (ordinal
//! to item positions), rebuilt on every sort so re-sorting can never leave a
//! dangling back-reference.
//!
//! Construction is single-threaded: parse, merge and sort mutate the set and
//! callers serialize those. A sorted set is read-only afterwards and can be
//! shared freely across concurrent weave passes.

use std::collections::BTreeMap;

use crate::outline::item::{ChapterMarker, OutlineItem, WorkMarker};
use crate::work::Work;

#[derive(Debug, Clone, Default)]
pub struct OutlineSet {
    items: Vec<OutlineItem>,
    /// Merge-in-addition instead of full replacement when weaving.
    pub append: bool,
    by_work: BTreeMap<i32, Vec<usize>>,
}

impl OutlineSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[OutlineItem] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &OutlineItem> {
        self.items.iter()
    }

    /// Append one item to the flat list. The child index is only guaranteed
    /// to match after the next [`sort`](Self::sort).
    pub fn push(&mut self, item: OutlineItem) {
        self.items.push(item);
    }

    /// All work markers, in flat-list order.
    pub fn work_markers(&self) -> impl Iterator<Item = &WorkMarker> {
        self.items.iter().filter_map(|item| match item {
            OutlineItem::Work(w) => Some(w),
            _ => None,
        })
    }

    /// The work marker whose backing file name matches.
    pub fn work_by_file(&self, file: &str) -> Option<&WorkMarker> {
        self.work_markers().find(|w| w.file == file)
    }

    /// The child items of one work, the work marker itself excluded, in
    /// sorted order. Valid after [`sort`](Self::sort).
    pub fn children_of(&self, work: i32) -> impl Iterator<Item = &OutlineItem> {
        self.by_work
            .get(&work)
            .into_iter()
            .flatten()
            .map(|&i| &self.items[i])
    }

    /// Append a content item unless an identical one is already present.
    /// The parse surfaces use this so re-parsing a file is a no-op.
    pub(crate) fn push_unique(&mut self, item: OutlineItem) {
        if !self.items.contains(&item) {
            self.items.push(item);
        }
    }

    /// Get-or-create the work marker, OR-ing the layout flag and taking the
    /// freshest non-empty file name.
    pub(crate) fn ensure_work(&mut self, work: &Work, file: &str, verse_paragraphs: bool) {
        for item in &mut self.items {
            if let OutlineItem::Work(marker) = item {
                if marker.location.work == work.ordinal {
                    marker.verse_paragraphs |= verse_paragraphs;
                    if !file.is_empty() {
                        marker.file = file.to_string();
                    }
                    return;
                }
            }
        }
        let mut marker = WorkMarker::new(work, file);
        marker.verse_paragraphs = verse_paragraphs;
        self.items.push(OutlineItem::Work(marker));
    }

    /// Get-or-create the chapter marker for (work, chapter).
    pub(crate) fn ensure_chapter(&mut self, work: i32, chapter: i32) {
        let exists = self.items.iter().any(|item| {
            matches!(item, OutlineItem::Chapter(c)
                if c.location.work == work && c.location.chapter == chapter)
        });
        if !exists {
            self.items
                .push(OutlineItem::Chapter(ChapterMarker::new(work, chapter)));
        }
    }

    /// Stable sort by location with the tie-break, dedup same-location runs,
    /// then rebuild the per-work child index. Idempotent.
    ///
    /// Within one location: a title implies the paragraph break it sits on,
    /// so paragraph breaks are dropped when a title is present; at most one
    /// work marker and one chapter marker survive (first wins), which guards
    /// against both parse surfaces emitting a marker for the same key.
    pub fn sort(&mut self) {
        self.items
            .sort_by(|a, b| a.location().cmp(b.location()).then(a.tie_rank().cmp(&b.tie_rank())));

        let mut kept: Vec<OutlineItem> = Vec::with_capacity(self.items.len());
        let mut i = 0;
        while i < self.items.len() {
            let mut j = i + 1;
            while j < self.items.len() && self.items[j].location() == self.items[i].location() {
                j += 1;
            }
            let run = &self.items[i..j];
            let has_title = run.iter().any(|item| matches!(item, OutlineItem::Title(_)));
            let mut work_seen = false;
            let mut chapter_seen = false;
            for item in run {
                match item {
                    OutlineItem::Paragraph(_) if has_title => {}
                    OutlineItem::Work(_) => {
                        if !work_seen {
                            work_seen = true;
                            kept.push(item.clone());
                        }
                    }
                    OutlineItem::Chapter(_) => {
                        if !chapter_seen {
                            chapter_seen = true;
                            kept.push(item.clone());
                        }
                    }
                    _ => kept.push(item.clone()),
                }
            }
            i = j;
        }
        self.items = kept;
        self.rebuild_index();
    }

    /// Fold another set into this one: matching works are unified (flag
    /// OR-ed, children appended unless already present), everything else is
    /// appended whole. The result is left in flat order; call
    /// [`sort`](Self::sort) to canonicalize.
    pub fn merge(&mut self, other: OutlineSet) {
        self.append |= other.append;
        for item in other.items {
            match item {
                OutlineItem::Work(incoming) => {
                    let existing = self.items.iter_mut().find_map(|it| match it {
                        OutlineItem::Work(w) if w.location.work == incoming.location.work => {
                            Some(w)
                        }
                        _ => None,
                    });
                    match existing {
                        Some(marker) => {
                            marker.verse_paragraphs |= incoming.verse_paragraphs;
                            if marker.file.is_empty() {
                                marker.file = incoming.file;
                            }
                        }
                        None => self.items.push(OutlineItem::Work(incoming)),
                    }
                }
                item => {
                    if !self.items.contains(&item) {
                        self.items.push(item);
                    }
                }
            }
        }
        self.rebuild_index();
    }

    /// Rebuild the work-ordinal index: every non-work item belongs to the
    /// most recently seen work marker with its ordinal.
    fn rebuild_index(&mut self) {
        self.by_work.clear();
        let mut current: Option<i32> = None;
        for (i, item) in self.items.iter().enumerate() {
            match item {
                OutlineItem::Work(w) => {
                    current = Some(w.location.work);
                    self.by_work.entry(w.location.work).or_default();
                }
                other => {
                    if let Some(work) = current {
                        if other.location().work == work {
                            if let Some(children) = self.by_work.get_mut(&work) {
                                children.push(i);
                            }
                        }
                    }
                }
            }
        }
    }
}

impl PartialEq for OutlineSet {
    fn eq(&self, other: &Self) -> bool {
        self.append == other.append && self.items == other.items
    }
}
