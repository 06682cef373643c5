use folio_core::content::{contributions_from_text, future_from_text, skills_from_text};

use crate::{SectionKind, SuggestionMode};

/// Clean raw model output into text the editor can drop into a form field.
/// Returns `None` when nothing usable is left.
pub fn clean_output(raw: &str, mode: SuggestionMode, section: Option<SectionKind>) -> Option<String> {
    let text = strip_quotes(strip_fences(raw.trim()));

    let cleaned = match section {
        Some(SectionKind::Contributions) => contributions_from_text(text).join("\n"),
        Some(SectionKind::Future) => future_from_text(text).join("\n"),
        Some(SectionKind::Skills) => skills_from_text(text).join(", "),
        Some(SectionKind::Overview) if mode == SuggestionMode::ListGenerate => future_from_text(text).join("\n"),
        _ => text.trim().to_string(),
    };

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Drop a surrounding Markdown code fence (with or without a language tag).
fn strip_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let body = match rest.find('\n') {
        Some(i) => &rest[i + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn strip_quotes(text: &str) -> &str {
    for (open, close) in [('"', '"'), ('“', '”'), ('\'', '\'')] {
        if let Some(inner) = text.strip_prefix(open).and_then(|t| t.strip_suffix(close)) {
            if !inner.contains(close) {
                return inner.trim();
            }
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fences_and_quotes_are_removed() {
        assert_eq!(strip_fences("```html\n<p>Hi</p>\n```"), "<p>Hi</p>");
        assert_eq!(strip_fences("```\nplain\n```"), "plain");
        assert_eq!(strip_fences("no fence"), "no fence");
        assert_eq!(strip_quotes("\"A tidy sentence.\""), "A tidy sentence.");
        assert_eq!(strip_quotes("“Curly.”"), "Curly.");
        // quotes inside are left alone
        assert_eq!(strip_quotes("\"a\" and \"b\""), "\"a\" and \"b\"");
    }

    #[test]
    fn prose_is_trimmed_only() {
        let out = clean_output("  \"First para.\n\nSecond para.\"  ", SuggestionMode::Polish, Some(SectionKind::Overview));
        assert_eq!(out.as_deref(), Some("First para.\n\nSecond para."));
    }

    #[test]
    fn list_sections_get_one_clean_item_per_line() {
        let raw = "```\n<ul><li>- Built the ingest pipeline</li><li>2. Cut latency</li></ul>\n```";
        let out = clean_output(raw, SuggestionMode::ListGenerate, Some(SectionKind::Contributions));
        assert_eq!(out.as_deref(), Some("Built the ingest pipeline\nCut latency"));

        let out = clean_output("* Add alerts\n\n1) Mobile app\n", SuggestionMode::ListGenerate, Some(SectionKind::Future));
        assert_eq!(out.as_deref(), Some("Add alerts\nMobile app"));
    }

    #[test]
    fn skills_are_comma_joined() {
        let out = clean_output("- Rust\n- Tokio, Axum\n", SuggestionMode::ListGenerate, Some(SectionKind::Skills));
        assert_eq!(out.as_deref(), Some("Rust, Tokio, Axum"));
    }

    #[test]
    fn empty_after_cleaning_is_none() {
        assert_eq!(clean_output("```\n```", SuggestionMode::Draft, None), None);
        assert_eq!(clean_output("- \n* ", SuggestionMode::ListGenerate, Some(SectionKind::Future)), None);
    }
}
