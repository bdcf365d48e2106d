//! Verse statistics
//!
//! Counts how many verses each chapter of a document carries. Two editions
//! of the same work can be diffed on this output to find where their
//! versifications drift apart, which is how the breakpoint pairs for a
//! versification map file get authored.

use crate::tokenizer::{CHAPTER_LINE, VERSE_MARK};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterStats {
    pub chapter: i32,
    pub verses: i32,
}

/// Highest verse number seen per chapter, in document order.
pub fn verse_stats(text: &str) -> Vec<ChapterStats> {
    let mut stats: Vec<ChapterStats> = Vec::new();
    for line in text.lines() {
        if let Some(caps) = CHAPTER_LINE.captures(line) {
            let chapter = caps[1].parse().unwrap_or(0);
            stats.push(ChapterStats { chapter, verses: 0 });
            continue;
        }
        let Some(current) = stats.last_mut() else {
            continue;
        };
        for caps in VERSE_MARK.captures_iter(line) {
            let verse: i32 = caps
                .get(1)
                .or_else(|| caps.get(2))
                .and_then(|v| v.as_str().parse().ok())
                .unwrap_or(0);
            current.verses = current.verses.max(verse);
        }
    }
    stats
}

/// Render the per-work chapter counts as markdown, one section per work,
/// with per-work and grand totals.
pub fn render_stats(works: &[(String, Vec<ChapterStats>)]) -> String {
    let mut out = String::new();
    let mut grand_total: i64 = 0;
    for (i, (name, stats)) in works.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!("# {}\n", name));
        let mut total: i64 = 0;
        for (j, stat) in stats.iter().enumerate() {
            if j > 0 {
                out.push(' ');
            }
            out.push_str(&format!("{}:{}", stat.chapter, stat.verses));
            total += stat.verses as i64;
        }
        out.push_str(&format!("; Total verses:{}\n", total));
        grand_total += total;
    }
    out.push_str(&format!("\n{}\n", grand_total));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_highest_verse_per_chapter() {
        let text = "# 1\n@1 one @2 two ^3^ three\n# 2\n@1 only\n";
        assert_eq!(
            verse_stats(text),
            [
                ChapterStats { chapter: 1, verses: 3 },
                ChapterStats { chapter: 2, verses: 1 },
            ]
        );
    }

    #[test]
    fn test_text_before_first_chapter_is_ignored() {
        let text = "@9 stray marker\n# 1\n@1 one\n";
        assert_eq!(verse_stats(text), [ChapterStats { chapter: 1, verses: 1 }]);
    }

    #[test]
    fn test_render() {
        let works = vec![
            ("01-Genesis.md".to_string(), vec![
                ChapterStats { chapter: 1, verses: 31 },
                ChapterStats { chapter: 2, verses: 25 },
            ]),
            ("02-Exodus.md".to_string(), vec![ChapterStats { chapter: 1, verses: 22 }]),
        ];
        let rendered = render_stats(&works);
        assert_eq!(
            rendered,
            "# 01-Genesis.md\n1:31 2:25; Total verses:56\n\n# 02-Exodus.md\n1:22; Total verses:22\n\n78\n"
        );
    }
}
