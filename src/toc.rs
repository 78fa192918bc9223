//! Table of contents extraction and heading anchors.
//!
//! Headings of level 2 to 4 (`##`, `###`, `####` followed by whitespace) are
//! collected into the TOC and rewritten into anchored HTML headings in one
//! pass, so the n-th TOC entry always points at the n-th rewritten heading.
//! Level-1 headings are left alone. Fenced code blocks are not special-cased.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::events::{Listeners, Subscription};

/// Default distance from the viewport top, in pixels, used both for the
/// heading scroll margin and for picking the active heading.
pub const DEFAULT_SCROLL_OFFSET: u32 = 100;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{2,4})[ \t]+(.+)$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub id: String,
    pub text: String,
    pub level: u8,
}

/// Result of a TOC pass: the entries plus the rewritten body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocDocument {
    pub entries: Vec<TocEntry>,
    pub body: String,
}

/// Anchor id for the heading at position `index`.
pub fn heading_id(index: usize) -> String {
    format!("heading-{}", index)
}

/// Extract the TOC and rewrite headings, giving each a `scroll-margin-top`
/// of `offset` pixels.
pub fn extract_with_offset(body: &str, offset: u32) -> TocDocument {
    let mut entries = Vec::new();
    let mut out = String::with_capacity(body.len());

    for line in body.split_inclusive('\n') {
        let (content, ending) = split_line_ending(line);

        let Some(caps) = HEADING_RE.captures(content) else {
            out.push_str(line);
            continue;
        };

        let text = caps[2].trim();
        if text.is_empty() {
            out.push_str(line);
            continue;
        }

        let level = caps[1].len() as u8;
        let id = heading_id(entries.len());
        out.push_str(&format!(
            r#"<h{level} id="{id}" style="scroll-margin-top: {offset}px">{text}</h{level}>"#
        ));
        out.push_str(ending);

        entries.push(TocEntry {
            id,
            text: text.to_string(),
            level,
        });
    }

    TocDocument { entries, body: out }
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(content) = line.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = line.strip_suffix('\n') {
        (content, "\n")
    } else {
        (line, "")
    }
}

// ============================================================================
// Scroll spy
// ============================================================================

/// Vertical position of a rendered heading relative to the viewport top.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingPosition {
    pub id: String,
    pub top: f64,
}

/// Pick the active heading: the last one at or above `offset`.
pub fn active_heading(positions: &[HeadingPosition], offset: f64) -> Option<&str> {
    positions
        .iter()
        .filter(|p| p.top <= offset)
        .last()
        .map(|p| p.id.as_str())
}

/// Scroll events carry the current heading positions.
pub type ScrollEvent = Vec<HeadingPosition>;

/// Tracks the highlighted TOC entry for an article view.
///
/// Attaches to a scroll event source on mount and detaches when dropped.
/// `select` (a click on a TOC entry) overrides the active entry until the
/// next scroll event.
pub struct ScrollSpy {
    active: Rc<RefCell<Option<String>>>,
    offset: f64,
    _scroll: Subscription,
}

impl ScrollSpy {
    /// Mount on `scroll`, computing the active heading once from `initial`.
    pub fn mount(scroll: &Listeners<ScrollEvent>, initial: &[HeadingPosition], offset: f64) -> Self {
        let active = Rc::new(RefCell::new(
            active_heading(initial, offset).map(str::to_string),
        ));
        let subscription = {
            let active = Rc::clone(&active);
            scroll.subscribe(move |positions: &ScrollEvent| {
                *active.borrow_mut() = active_heading(positions, offset).map(str::to_string);
            })
        };
        Self {
            active,
            offset,
            _scroll: subscription,
        }
    }

    pub fn active(&self) -> Option<String> {
        self.active.borrow().clone()
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Mark `id` active immediately, as when its TOC entry is clicked.
    pub fn select(&self, id: &str) {
        *self.active.borrow_mut() = Some(id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(body: &str) -> TocDocument {
        extract_with_offset(body, DEFAULT_SCROLL_OFFSET)
    }

    fn pos(id: &str, top: f64) -> HeadingPosition {
        HeadingPosition {
            id: id.to_string(),
            top,
        }
    }

    #[test]
    fn test_no_headings_leaves_body_unchanged() {
        let body = "Just text.\n\nMore text\n";
        let doc = extract(body);
        assert!(doc.entries.is_empty());
        assert_eq!(doc.body, body);
    }

    #[test]
    fn test_levels_and_ids_follow_source_order() {
        let body = "# Title\n## Intro\ntext\n### Detail\n#### Deep\n## Outro";
        let doc = extract(body);
        let ids: Vec<_> = doc.entries.iter().map(|e| e.id.as_str()).collect();
        let levels: Vec<_> = doc.entries.iter().map(|e| e.level).collect();
        let texts: Vec<_> = doc.entries.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(ids, ["heading-0", "heading-1", "heading-2", "heading-3"]);
        assert_eq!(levels, [2, 3, 4, 2]);
        assert_eq!(texts, ["Intro", "Detail", "Deep", "Outro"]);
    }

    #[test]
    fn test_rewritten_headings_match_toc_ids() {
        let doc = extract("## One\n\n### Two\n");
        assert_eq!(
            doc.body,
            "<h2 id=\"heading-0\" style=\"scroll-margin-top: 100px\">One</h2>\n\n\
             <h3 id=\"heading-1\" style=\"scroll-margin-top: 100px\">Two</h3>\n"
        );
        for (n, entry) in doc.entries.iter().enumerate() {
            assert!(doc.body.contains(&format!("id=\"heading-{}\"", n)));
            assert_eq!(entry.id, heading_id(n));
        }
    }

    #[test]
    fn test_level_one_and_five_are_excluded() {
        let body = "# Top\n##### Too deep\n#NoSpace\n##NoSpace";
        let doc = extract(body);
        assert!(doc.entries.is_empty());
        assert_eq!(doc.body, body);
    }

    #[test]
    fn test_heading_text_is_trimmed() {
        let doc = extract("##   Spaced out   \r\nnext");
        assert_eq!(doc.entries[0].text, "Spaced out");
        assert!(doc.body.ends_with("</h2>\r\nnext"));
    }

    #[test]
    fn test_headings_inside_code_fences_still_match() {
        let doc = extract("```\n## not really\n```\n");
        assert_eq!(doc.entries.len(), 1);
    }

    #[test]
    fn test_custom_offset() {
        let doc = extract_with_offset("## A", 64);
        assert!(doc.body.contains("scroll-margin-top: 64px"));
    }

    #[test]
    fn test_active_heading_picks_last_above_offset() {
        let positions = vec![pos("heading-0", -300.0), pos("heading-1", 80.0), pos("heading-2", 400.0)];
        assert_eq!(active_heading(&positions, 100.0), Some("heading-1"));
        assert_eq!(active_heading(&positions, 0.0), Some("heading-0"));
        assert_eq!(active_heading(&positions[2..], 100.0), None);
    }

    #[test]
    fn test_active_heading_includes_exact_offset() {
        let positions = vec![pos("heading-0", 100.0)];
        assert_eq!(active_heading(&positions, 100.0), Some("heading-0"));
    }

    #[test]
    fn test_scroll_spy_lifecycle() {
        let scroll: Listeners<ScrollEvent> = Listeners::new();
        let spy = ScrollSpy::mount(&scroll, &[pos("heading-0", 50.0)], 100.0);
        assert_eq!(spy.active().as_deref(), Some("heading-0"));

        scroll.emit(&vec![pos("heading-0", -200.0), pos("heading-1", 90.0)]);
        assert_eq!(spy.active().as_deref(), Some("heading-1"));

        // A click wins until the next scroll event
        spy.select("heading-0");
        assert_eq!(spy.active().as_deref(), Some("heading-0"));
        scroll.emit(&vec![pos("heading-0", -200.0), pos("heading-1", 90.0)]);
        assert_eq!(spy.active().as_deref(), Some("heading-1"));

        assert_eq!(scroll.len(), 1);
        drop(spy);
        assert!(scroll.is_empty());
    }
}
