//! Text helpers shared by the renderer and the editor.
//!
//! Contains the list-item sanitizers, the paragraph splitting rule, and the
//! plain-text form of the overview that the editor round-trips through. The
//! text form is heuristic: a paragraph that legitimately starts with "NOTE:"
//! comes back as a note.

use std::sync::OnceLock;

use regex::Regex;

use crate::ContentItem;

fn re(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static regex"))
}

fn tag_re() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    re(&CELL, r"<[^>]*>")
}

fn list_wrapper_re() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    re(&CELL, r"(?i)</?(?:ul|ol|li)\b[^>]*>")
}

fn list_item_end_re() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    re(&CELL, r"(?i)</li\s*>")
}

fn leading_marker_re() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    re(&CELL, r"^\s*(?:•\s*|[-*](?:\s+|$)|\d+[.)](?:\s+|$))")
}

fn bullet_line_re() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    re(&CELL, r"^(?:•\s*|[-*]\s+)")
}

fn blank_line_re() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    re(&CELL, r"\r?\n(?:[ \t]*\r?\n)+")
}

fn heading_re() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    re(
        &CELL,
        r"(?is)^(?:<strong>(.*)</strong>|<b>(.*)</b>|<h[1-6][^>]*>(.*)</h[1-6]>)$",
    )
}

fn image_re() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    re(&CELL, r"(?i)^\[image:\s*([^|\]]+?)\s*(?:\|\s*([^\]]*?)\s*)?\]$")
}

/// Remove every tag, keeping text content.
pub fn strip_tags(html: &str) -> String {
    tag_re().replace_all(html, "").into_owned()
}

/// Remove `<ul>`, `<ol>` and `<li>` open/close tags, keeping inner markup.
pub fn strip_list_wrappers(text: &str) -> String {
    list_wrapper_re().replace_all(text, "").into_owned()
}

/// Remove one leading bullet marker (`-`, `*`, `•`, `1.`, `1)`).
pub fn strip_leading_marker(text: &str) -> &str {
    match leading_marker_re().find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    }
}

/// Future-development items: marker strip and trim.
pub fn sanitize_list_item(text: &str) -> String {
    strip_leading_marker(text.trim()).trim().to_string()
}

/// Key-contribution items: list tags stripped, then marker strip and trim.
pub fn sanitize_contribution(text: &str) -> String {
    let unwrapped = strip_list_wrappers(text);
    sanitize_list_item(&unwrapped)
}

/// Split on one or more blank lines; pieces are trimmed and empties dropped.
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    blank_line_re()
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

// --- Overview text form ---

pub fn overview_to_text(items: &[ContentItem]) -> String {
    items
        .iter()
        .map(|item| match item {
            ContentItem::Paragraph { content } => content.trim().to_string(),
            ContentItem::Heading { content } => format!("<strong>{}</strong>", content.trim()),
            ContentItem::Bullet { content } => format!("• {}", content.trim()),
            ContentItem::Note { content } => format!("NOTE: {}", content.trim()),
            ContentItem::Image { src, caption } => match caption.as_deref().map(str::trim) {
                Some(c) if !c.is_empty() => format!("[image: {} | {}]", src.trim(), c),
                _ => format!("[image: {}]", src.trim()),
            },
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn overview_from_text(text: &str) -> Vec<ContentItem> {
    let mut items = Vec::new();
    for chunk in split_paragraphs(text) {
        if let Some(caps) = image_re().captures(chunk) {
            items.push(ContentItem::Image {
                src: caps[1].to_string(),
                caption: caps
                    .get(2)
                    .map(|m| m.as_str().to_string())
                    .filter(|c| !c.is_empty()),
            });
        } else if bullet_line_re().is_match(chunk) {
            push_bullets(chunk, &mut items);
        } else if let Some(rest) = strip_note_prefix(chunk) {
            items.push(ContentItem::Note {
                content: rest.to_string(),
            });
        } else if let Some(inner) = heading_inner(chunk) {
            items.push(ContentItem::Heading {
                content: inner.trim().to_string(),
            });
        } else {
            items.push(ContentItem::Paragraph {
                content: chunk.to_string(),
            });
        }
    }
    items
}

/// Every marker-led line starts a new bullet; other lines continue the current one.
fn push_bullets(chunk: &str, items: &mut Vec<ContentItem>) {
    let mut current: Option<String> = None;
    for line in chunk.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(m) = bullet_line_re().find(line) {
            if let Some(done) = current.take() {
                items.push(ContentItem::Bullet { content: done });
            }
            current = Some(line[m.end()..].trim().to_string());
        } else if let Some(cur) = current.as_mut() {
            cur.push(' ');
            cur.push_str(line);
        }
    }
    if let Some(done) = current {
        if !done.is_empty() {
            items.push(ContentItem::Bullet { content: done });
        }
    }
}

fn strip_note_prefix(chunk: &str) -> Option<&str> {
    let head = chunk.get(..5)?;
    if head.eq_ignore_ascii_case("NOTE:") {
        Some(chunk[5..].trim())
    } else {
        None
    }
}

fn heading_inner(chunk: &str) -> Option<&str> {
    let caps = heading_re().captures(chunk)?;
    let inner = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3))?.as_str();
    // "<strong>a</strong> and <strong>b</strong>" is a paragraph, not a heading
    let lower = inner.to_ascii_lowercase();
    if lower.contains("</strong>") || lower.contains("</b>") || lower.contains("</h") {
        return None;
    }
    Some(inner)
}

// --- List text forms ---

pub fn contributions_from_text(text: &str) -> Vec<String> {
    let separated = list_item_end_re().replace_all(text, "\n");
    separated
        .lines()
        .map(sanitize_contribution)
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn future_from_text(text: &str) -> Vec<String> {
    text.lines()
        .map(sanitize_list_item)
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn skills_from_text(text: &str) -> Vec<String> {
    text.split(['\n', ','])
        .map(sanitize_list_item)
        .filter(|s| !s.is_empty())
        .collect()
}
