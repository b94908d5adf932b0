use super::schema::SearchResult;

/// Hard cap on results injected into a prompt.
pub const MAX_RENDERED_RESULTS: usize = 10;

/// Numbered plain-text block, provider order preserved.
pub fn render_results(results: &[SearchResult]) -> String {
    let mut out = String::from("Web search results:");
    for (rank, result) in results.iter().take(MAX_RENDERED_RESULTS).enumerate() {
        out.push_str(&format!("\n{}. {}", rank + 1, result.title.trim()));
        let snippet = result.snippet.trim();
        if !snippet.is_empty() {
            out.push_str(&format!("\n   {snippet}"));
        }
        out.push_str(&format!("\n   URL: {}", result.url.trim()));
    }
    out
}
