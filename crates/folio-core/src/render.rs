//! Detail page renderer.
//!
//! Builds a complete HTML document from a [`ProjectDetail`]. Every section is
//! optional and omitted when its source data is empty, so rendering never
//! fails. Text content is trusted HTML and emitted as-is; attribute values are
//! escaped so they cannot break out of their quotes.

use crate::content::{sanitize_contribution, sanitize_list_item, split_paragraphs};
use crate::materialize::normalize_relative;
use crate::{Block, ContentItem, DetailMeta, GalleryImage, Link, MainContent, ProjectDetail};

/// Hero image used when neither the detail record nor the caller supplies one.
pub const PLACEHOLDER_HERO: &str = "images/placeholder.jpg";

pub struct PageContext<'a> {
    pub title: &'a str,
    pub hero_fallback: &'a str,
    /// Prefix that leads from the page back to the site root ("" or "../", ...).
    pub root_prefix: String,
}

impl<'a> PageContext<'a> {
    pub fn new(title: &'a str, hero_fallback: &'a str) -> Self {
        Self {
            title,
            hero_fallback,
            root_prefix: String::new(),
        }
    }

    /// Context for a page written at `target` (site-relative).
    pub fn for_target(title: &'a str, hero_fallback: &'a str, target: &str) -> Self {
        let depth = normalize_relative(target)
            .map(|parts| parts.len().saturating_sub(1))
            .unwrap_or(0);
        Self {
            title,
            hero_fallback,
            root_prefix: "../".repeat(depth),
        }
    }

    fn url(&self, src: &str) -> String {
        let src = src.trim();
        let is_rooted = src.starts_with('/')
            || src.starts_with('#')
            || src.starts_with("data:")
            || src.starts_with("mailto:")
            || src.contains("://");
        if self.root_prefix.is_empty() || is_rooted {
            return src.to_string();
        }
        format!("{}{}", self.root_prefix, src.trim_start_matches("./"))
    }
}

/// Escape a value for use inside a double-quoted attribute.
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub fn render_detail_page(detail: &ProjectDetail, ctx: &PageContext<'_>) -> String {
    let hero = if detail.hero_image.trim().is_empty() {
        ctx.hero_fallback
    } else {
        detail.hero_image.as_str()
    };
    let root = &ctx.root_prefix;

    let mut out = String::with_capacity(8 * 1024);
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("  <meta charset=\"UTF-8\">\n");
    out.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    out.push_str(&format!("  <title>{} | Portfolio</title>\n", escape_attr(ctx.title)));
    out.push_str(&format!("  <link rel=\"stylesheet\" href=\"{root}css/style.css\">\n"));
    out.push_str(&format!("  <link rel=\"stylesheet\" href=\"{root}css/project-detail.css\">\n"));
    out.push_str("</head>\n<body>\n");
    out.push_str("  <header class=\"project-header\">\n");
    out.push_str(&format!(
        "    <a href=\"{root}index.html#projects\" class=\"project-header__back\">&larr; Back to projects</a>\n"
    ));
    out.push_str("  </header>\n");
    out.push_str("  <main class=\"project-detail\">\n");

    if !hero.trim().is_empty() {
        out.push_str("    <section class=\"project-hero\">\n");
        out.push_str(&format!(
            "      <img src=\"{}\" alt=\"{}\" class=\"project-hero__img\">\n",
            escape_attr(&ctx.url(hero)),
            escape_attr(ctx.title)
        ));
        out.push_str("    </section>\n");
    }

    out.push_str("    <section class=\"project-info\">\n");
    out.push_str(&format!("      <h1 class=\"project-info__title\">{}</h1>\n", ctx.title));
    render_meta(&mut out, &detail.meta);
    out.push_str("    </section>\n");

    render_overview(&mut out, &detail.overview, ctx);

    let main_rendered = match &detail.main_content {
        Some(main) if !main.title.trim().is_empty() => {
            render_main_content(&mut out, main, ctx);
            true
        }
        _ => false,
    };
    if !main_rendered {
        render_gallery(&mut out, &detail.additional_images, ctx);
    }

    let contributions: Vec<String> = detail
        .key_contributions
        .iter()
        .map(|c| sanitize_contribution(c))
        .filter(|c| !c.is_empty())
        .collect();
    render_list_section(&mut out, "project-contributions", "Key Contributions", &contributions);

    let future: Vec<String> = detail
        .future_development
        .iter()
        .map(|f| sanitize_list_item(f))
        .filter(|f| !f.is_empty())
        .collect();
    render_list_section(&mut out, "project-future", "Future Development", &future);

    render_skills(&mut out, &detail.skills);
    render_links(&mut out, &detail.links);

    out.push_str("  </main>\n");
    out.push_str("  <footer class=\"project-footer\">\n");
    out.push_str(&format!(
        "    <a href=\"{root}index.html#projects\" class=\"btn btn--med btn--theme\">All projects</a>\n"
    ));
    out.push_str("  </footer>\n");
    out.push_str("</body>\n</html>\n");
    out
}

/// Role (or project type), company and date, one line each.
fn render_meta(out: &mut String, meta: &DetailMeta) {
    let role = non_empty(&meta.role).or_else(|| non_empty(&meta.project_type));
    let company = non_empty(&meta.company);
    let date = non_empty(&meta.project_date);
    if role.is_none() && company.is_none() && date.is_none() {
        return;
    }
    out.push_str("      <div class=\"project-info__meta\">\n");
    if let Some(role) = role {
        out.push_str(&format!("        <p class=\"project-info__role\">{role}</p>\n"));
    }
    if let Some(company) = company {
        out.push_str(&format!("        <p class=\"project-info__company\">{company}</p>\n"));
    }
    if let Some(date) = date {
        out.push_str(&format!("        <p class=\"project-info__date\">{date}</p>\n"));
    }
    out.push_str("      </div>\n");
}

fn render_overview(out: &mut String, items: &[ContentItem], ctx: &PageContext<'_>) {
    let mut body = String::new();
    for item in items {
        match item {
            ContentItem::Paragraph { content } if !content.trim().is_empty() => {
                body.push_str(&format!("      <p class=\"project-text\">{}</p>\n", content.trim()));
            }
            ContentItem::Heading { content } if !content.trim().is_empty() => {
                body.push_str(&format!(
                    "      <p class=\"project-text project-text--heading\"><strong>{}</strong></p>\n",
                    content.trim()
                ));
            }
            // One list per bullet; consecutive bullets are not merged.
            ContentItem::Bullet { content } if !content.trim().is_empty() => {
                body.push_str(&format!(
                    "      <ul class=\"project-list\"><li>{}</li></ul>\n",
                    content.trim()
                ));
            }
            ContentItem::Note { content } if !content.trim().is_empty() => {
                body.push_str(&format!(
                    "      <p class=\"project-text project-text--note\"><strong>NOTE:</strong> {}</p>\n",
                    content.trim()
                ));
            }
            ContentItem::Image { src, caption } if !src.trim().is_empty() => {
                render_figure(&mut body, "      ", src, caption.as_deref(), None, ctx);
            }
            ContentItem::Paragraph { .. }
            | ContentItem::Heading { .. }
            | ContentItem::Bullet { .. }
            | ContentItem::Note { .. }
            | ContentItem::Image { .. } => {}
        }
    }
    if body.is_empty() {
        return;
    }
    out.push_str("    <section class=\"project-section project-overview\">\n");
    out.push_str("      <h2 class=\"project-section__title\">Overview</h2>\n");
    out.push_str(&body);
    out.push_str("    </section>\n");
}

fn render_figure(
    out: &mut String,
    indent: &str,
    src: &str,
    caption: Option<&str>,
    alt: Option<&str>,
    ctx: &PageContext<'_>,
) {
    let caption = caption.map(str::trim).filter(|c| !c.is_empty());
    let alt = alt.or(caption).unwrap_or(ctx.title);
    out.push_str(indent);
    out.push_str("<figure class=\"project-figure\">\n");
    out.push_str(&format!(
        "{indent}  <img src=\"{}\" alt=\"{}\" class=\"project-figure__img\">\n",
        escape_attr(&ctx.url(src)),
        escape_attr(alt)
    ));
    if let Some(caption) = caption {
        out.push_str(&format!(
            "{indent}  <figcaption class=\"project-figure__caption\">{caption}</figcaption>\n"
        ));
    }
    out.push_str(indent);
    out.push_str("</figure>\n");
}

fn push_paragraphs(out: &mut String, indent: &str, text: &str) {
    for para in split_paragraphs(text) {
        out.push_str(&format!("{indent}<p class=\"project-text\">{para}</p>\n"));
    }
}

fn render_main_content(out: &mut String, main: &MainContent, ctx: &PageContext<'_>) {
    out.push_str("    <section class=\"project-section project-main\">\n");
    out.push_str(&format!(
        "      <h2 class=\"project-section__title\">{}</h2>\n",
        main.title.trim()
    ));
    if let Some(description) = non_empty(&main.description) {
        push_paragraphs(out, "      ", description);
    }
    for block in main.blocks.iter().filter(|b| !b.is_empty()) {
        render_block(out, block, ctx);
    }
    if let Some(conclusion) = non_empty(&main.conclusion) {
        out.push_str("      <div class=\"project-main__conclusion\">\n");
        push_paragraphs(out, "        ", conclusion);
        out.push_str("      </div>\n");
    }
    out.push_str("    </section>\n");
}

fn render_block(out: &mut String, block: &Block, ctx: &PageContext<'_>) {
    out.push_str("      <div class=\"project-block\">\n");
    if let Some(subtitle) = non_empty(&block.subtitle) {
        out.push_str(&format!("        <h3 class=\"project-block__subtitle\">{subtitle}</h3>\n"));
    }
    if let Some(image) = block.image.as_ref().filter(|i| !i.src.trim().is_empty()) {
        render_figure(out, "        ", &image.src, None, non_empty(&block.subtitle), ctx);
    }
    if let Some(description) = non_empty(&block.description) {
        push_paragraphs(out, "        ", description);
    }
    out.push_str("      </div>\n");
}

fn render_gallery(out: &mut String, images: &[GalleryImage], ctx: &PageContext<'_>) {
    let images: Vec<&GalleryImage> = images.iter().filter(|i| !i.src.trim().is_empty()).collect();
    if images.is_empty() {
        return;
    }
    out.push_str("    <section class=\"project-section project-gallery\">\n");
    out.push_str("      <h2 class=\"project-section__title\">Gallery</h2>\n");
    for image in images {
        render_figure(out, "      ", &image.src, image.caption.as_deref(), None, ctx);
    }
    out.push_str("    </section>\n");
}

fn render_list_section(out: &mut String, class: &str, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("    <section class=\"project-section {class}\">\n"));
    out.push_str(&format!("      <h2 class=\"project-section__title\">{heading}</h2>\n"));
    out.push_str("      <ul class=\"project-list\">\n");
    for item in items {
        out.push_str(&format!("        <li>{item}</li>\n"));
    }
    out.push_str("      </ul>\n");
    out.push_str("    </section>\n");
}

fn render_skills(out: &mut String, skills: &[String]) {
    let skills: Vec<&str> = skills.iter().map(|s| s.trim()).filter(|s| !s.is_empty()).collect();
    if skills.is_empty() {
        return;
    }
    out.push_str("    <section class=\"project-section project-skills\">\n");
    out.push_str("      <h2 class=\"project-section__title\">Skills</h2>\n");
    out.push_str("      <div class=\"skills\">\n");
    for skill in skills {
        out.push_str(&format!("        <span class=\"skills__skill\">{skill}</span>\n"));
    }
    out.push_str("      </div>\n");
    out.push_str("    </section>\n");
}

fn render_links(out: &mut String, links: &[Link]) {
    if links.is_empty() {
        return;
    }
    out.push_str("    <section class=\"project-section project-links\">\n");
    for link in links {
        out.push_str(&format!(
            "      <a href=\"{}\" class=\"btn btn--med btn--theme\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>\n",
            escape_attr(&link.url),
            link.label
        ));
    }
    out.push_str("    </section>\n");
}
