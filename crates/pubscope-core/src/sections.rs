//! Article section normalization and the summarization prompt.
//!
//! Sections are ordered `(name, text)` pairs; input order matters for the
//! sections that have no canonical position.

/// Canonical section order used when building prompts.
pub const CANONICAL_ORDER: [&str; 9] = [
    "abstract",
    "introduction",
    "background",
    "methods",
    "materials",
    "results",
    "discussion",
    "conclusion",
    "references",
];

fn canonical_name(key: &str) -> String {
    let key = key.trim().to_lowercase();
    let alias = match key.as_str() {
        "results and discussion" | "results & discussion" | "results/discussion" => "results",
        "discussion and results" => "discussion",
        "conclusions" => "conclusion",
        "intro" => "introduction",
        "abstracts" => "abstract",
        _ => return key,
    };
    alias.to_string()
}

/// Lowercase and trim section names, map common aliases to canonical names,
/// and merge sections that end up with the same name (separated by a blank
/// line). A blank earlier section is replaced rather than merged.
pub fn normalize_sections<K, V, I>(sections: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut out: Vec<(String, String)> = Vec::new();
    for (name, text) in sections {
        let name = canonical_name(name.as_ref());
        let text = text.as_ref();
        match out.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, existing)) if !existing.trim().is_empty() => {
                let merged = format!("{}\n\n{}", existing.trim_end(), text);
                *existing = merged;
            }
            Some((_, existing)) => *existing = text.to_string(),
            None => out.push((name, text.to_string())),
        }
    }
    out
}

const JSON_SCHEMA: &str = r#"Return ONLY strict JSON (no prose, no markdown) with this schema:
{
  "summary": "string (2-3 sentences, factual and concise)",
  "key_findings": ["string", "..."],
  "limitations": ["string", "..."],
  "future_directions": ["string", "..."]
}
If something is unknown, use an empty string "" or an empty array [].
Do NOT include citations/IDs; keep each bullet under ~25 words.
"#;

const INSTRUCTIONS: &str = "You are an expert scientific assistant helping researchers identify key \
findings and new, testable hypotheses from academic articles. Focus on factual accuracy. Assume the \
researchers have medium to little understanding of the topic and use language accordingly.

Task:
- Provide a concise 2-3 sentence summary.
- Extract key findings (2-4 bullet list).
- Note limitations/gaps (2-4 bullet list).
- Suggest future research directions (2-4 bullet list).

";

/// Later entries win when a name repeats.
fn section_text<'a, K: AsRef<str>, V: AsRef<str>>(sections: &'a [(K, V)], name: &str) -> Option<&'a str> {
    sections
        .iter()
        .rev()
        .find(|(k, _)| k.as_ref() == name)
        .map(|(_, v)| v.as_ref())
}

/// Build the summarization prompt for an article's sections.
///
/// Canonical sections come first in [`CANONICAL_ORDER`], then any others in
/// input order. Blank sections are left out.
pub fn build_prompt<K: AsRef<str>, V: AsRef<str>>(sections: &[(K, V)]) -> String {
    let mut order: Vec<&str> = CANONICAL_ORDER
        .iter()
        .copied()
        .filter(|name| section_text(sections, name).is_some())
        .collect();
    for (name, _) in sections {
        let name = name.as_ref();
        if !order.contains(&name) {
            order.push(name);
        }
    }

    let block = order
        .into_iter()
        .filter_map(|name| {
            let text = section_text(sections, name)?.trim();
            (!text.is_empty()).then(|| format!("{}:\n{}", name.to_uppercase(), text))
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("{}{}\n\nTEXT:\n---\n{}\n---", INSTRUCTIONS, JSON_SCHEMA, block)
}
