//! Listing section patcher.
//!
//! The listing lives inside a hand-authored document. It is located with two
//! markers: the opening tag of the listing section and the opening tag of the
//! section that follows it. The region ends at the last closing section tag
//! before the second marker. Only `[start, end)` is replaced; every other byte
//! of the document is preserved.

use std::sync::OnceLock;

use regex::Regex;

use crate::materialize::SiteRoot;
use crate::render::escape_attr;
use crate::{Error, ProjectSummary, Result};

pub const DESC_CLASS: &str = "projects__row-content-desc";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingMarkers {
    /// Opening of the listing section itself.
    pub start: String,
    /// Opening of the unrelated section that follows the listing.
    pub next: String,
    pub close: String,
}

impl Default for ListingMarkers {
    fn default() -> Self {
        Self {
            start: "<section class=\"projects\" id=\"projects\"".to_string(),
            next: "<section class=\"contact\" id=\"contact\"".to_string(),
            close: "</section>".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListingError {
    #[error("listing start marker `{0}` not found")]
    MissingStart(String),
    #[error("next-section marker `{0}` not found after the listing")]
    MissingNext(String),
    #[error("no closing `{0}` between the listing and the next section")]
    MissingClose(String),
}

/// Byte range `[start, end)` of the listing section.
pub fn locate(doc: &str, markers: &ListingMarkers) -> std::result::Result<(usize, usize), ListingError> {
    let start = doc
        .find(&markers.start)
        .ok_or_else(|| ListingError::MissingStart(markers.start.clone()))?;
    let after_start = start + markers.start.len();
    let next = doc[after_start..]
        .find(&markers.next)
        .map(|i| after_start + i)
        .ok_or_else(|| ListingError::MissingNext(markers.next.clone()))?;
    let close = doc[after_start..next]
        .rfind(&markers.close)
        .map(|i| after_start + i)
        .ok_or_else(|| ListingError::MissingClose(markers.close.clone()))?;
    Ok((start, close + markers.close.len()))
}

/// Replace the listing section of `doc` with one rendered from `projects`.
pub fn patch_listing(
    doc: &str,
    projects: &[ProjectSummary],
    markers: &ListingMarkers,
) -> std::result::Result<String, ListingError> {
    let (start, end) = locate(doc, markers)?;
    let section = render_section(projects, markers);
    let mut out = String::with_capacity(doc.len() - (end - start) + section.len());
    out.push_str(&doc[..start]);
    out.push_str(&section);
    out.push_str(&doc[end..]);
    Ok(out)
}

/// Read, patch and write back the listing document. Returns whether the file changed.
pub fn apply_listing(
    site: &SiteRoot,
    relative: &str,
    projects: &[ProjectSummary],
    markers: &ListingMarkers,
) -> Result<bool> {
    let path = site.resolve(relative)?;
    let doc = site.read(relative)?;
    let patched = patch_listing(&doc, projects, markers).map_err(|source| Error::Listing {
        path: path.clone(),
        source,
    })?;
    if patched == doc {
        tracing::debug!(path = %path.display(), "listing already up to date");
        return Ok(false);
    }
    site.write(relative, patched.as_bytes())?;
    tracing::info!(path = %path.display(), projects = projects.len(), "regenerated listing");
    Ok(true)
}

fn render_section(projects: &[ProjectSummary], markers: &ListingMarkers) -> String {
    let mut out = String::with_capacity(1024 + projects.len() * 512);
    out.push_str(&markers.start);
    out.push_str(">\n");
    out.push_str("      <div class=\"projects__content\">\n");
    out.push_str("        <h2 class=\"heading-sec\">Projects</h2>\n");
    out.push_str("        <div class=\"projects__rows\">\n");
    for project in projects {
        out.push_str(&render_row(project));
    }
    out.push_str("        </div>\n");
    out.push_str("      </div>\n");
    out.push_str("    ");
    out.push_str(&markers.close);
    out
}

pub fn render_row(project: &ProjectSummary) -> String {
    let href = escape_attr(&project.detail_page);
    let title_attr = escape_attr(&project.title);
    let style = project
        .image_style
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!(" style=\"{}\"", escape_attr(s)))
        .unwrap_or_default();
    let center = if project.center_image {
        " projects__row-img-cont--center"
    } else {
        ""
    };

    let mut out = String::new();
    out.push_str("          <div class=\"projects__row\">\n");
    out.push_str(&format!("            <div class=\"projects__row-img-cont{center}\">\n"));
    out.push_str(&format!(
        "              <img src=\"{}\" alt=\"{title_attr}\" class=\"projects__row-img\"{style} loading=\"lazy\">\n",
        escape_attr(&project.image)
    ));
    out.push_str("            </div>\n");
    out.push_str("            <div class=\"projects__row-content\">\n");
    out.push_str(&format!(
        "              <h3 class=\"projects__row-content-title\">{}</h3>\n",
        project.title
    ));
    out.push_str("              ");
    out.push_str(&wrap_description(&project.description));
    out.push('\n');
    out.push_str(&format!(
        "              <a href=\"{href}\" class=\"btn btn--med btn--theme dynamicBgClr\">Case Study</a>\n"
    ));
    out.push_str("            </div>\n");
    out.push_str("          </div>\n");
    out
}

fn paragraph_tag_re() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    CELL.get_or_init(|| Regex::new(r"(?i)<p[\s>]").expect("static regex"))
}

/// Wrap a raw description so it always renders with the description styling.
pub fn wrap_description(raw: &str) -> String {
    let raw = raw.trim();
    if paragraph_tag_re().is_match(raw) {
        if raw.contains(DESC_CLASS) {
            raw.to_string()
        } else {
            format!("<div class=\"{DESC_CLASS}\">{raw}</div>")
        }
    } else {
        format!("<p class=\"{DESC_CLASS}\">{raw}</p>")
    }
}
