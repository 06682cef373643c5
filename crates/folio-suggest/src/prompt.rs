use crate::{SectionKind, SuggestionMode, SuggestionRequest};

const HTML_RULES: &str = "Write plain prose. You may use <strong> and <em> for emphasis, \
nothing else. Do not use Markdown, headings, code fences or surrounding quotes.";

pub fn system_prompt(request: &SuggestionRequest) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str(
        "You help a developer write the project section of their personal portfolio website. \
The audience is recruiters and other engineers. Be concrete: name technologies, scale and \
outcomes when the input mentions them. Never invent facts that are not in the input.\n\n",
    );

    match request.mode {
        SuggestionMode::Draft => {
            out.push_str("Task: draft new text for the section described below.\n");
        }
        SuggestionMode::Polish => {
            out.push_str(
                "Task: rewrite the existing text so it reads clearly and confidently. Keep its \
meaning and roughly its length. Fix grammar and remove filler.\n",
            );
        }
        SuggestionMode::ListGenerate => {
            out.push_str("Task: produce a list for the section described below.\n");
        }
    }

    out.push_str(section_rules(request.section_kind, request.mode));
    out.push('\n');
    out.push_str("Output ONLY the resulting text, nothing else.");
    out
}

fn section_rules(section: Option<SectionKind>, mode: SuggestionMode) -> &'static str {
    match section {
        Some(SectionKind::Contributions) => {
            "Section: key contributions. Output 3 to 6 items, one per line, no bullet markers \
or numbering. Each item starts with a verb in past tense and fits on one line."
        }
        Some(SectionKind::Future) => {
            "Section: future development. Output 2 to 5 planned improvements, one per line, \
no bullet markers or numbering."
        }
        Some(SectionKind::Skills) => {
            "Section: skills. Output 4 to 10 short technology or skill names separated by \
commas on a single line."
        }
        Some(SectionKind::Overview) if mode == SuggestionMode::ListGenerate => {
            "Section: overview. Output 3 to 5 short highlight sentences, one per line, no \
bullet markers."
        }
        Some(SectionKind::Overview) => {
            "Section: overview. Output one to three short paragraphs separated by a blank line."
        }
        None => "Section: the card description shown in the project listing. Output one or two sentences.",
    }
}

pub fn user_message(request: &SuggestionRequest) -> String {
    let mut out = String::new();
    out.push_str("PROJECT: ");
    out.push_str(request.subject.trim());
    out.push('\n');
    if let Some(current) = request
        .current_content
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
    {
        out.push_str("CURRENT TEXT:\n");
        out.push_str(current);
        out.push('\n');
    }
    out.push('\n');
    out.push_str(HTML_RULES);
    out
}
