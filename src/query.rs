/// Build a GitHub code search query from a pattern and optional qualifiers.
///
/// Clauses are joined with single spaces in a fixed order: pattern,
/// `language:`, `extension:`, then the additional qualifiers verbatim.
/// Blank qualifiers are left out entirely. Nothing is escaped; GitHub's query
/// grammar decides what the pattern means.
pub fn build_query(pattern: &str, language: &str, extension: &str, additional: &str) -> String {
    let mut parts = vec![pattern.to_string()];

    if !language.trim().is_empty() {
        parts.push(format!("language:{}", language));
    }
    if !extension.trim().is_empty() {
        parts.push(format!("extension:{}", extension));
    }
    if !additional.trim().is_empty() {
        parts.push(additional.to_string());
    }

    parts.join(" ")
}
