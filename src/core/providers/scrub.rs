use std::borrow::Cow;

const MAX_API_ERROR_CHARS: usize = 200;
const REDACTED: &str = "[REDACTED]";

/// Key prefixes issued by the providers this relay talks to.
const PREFIX_PATTERNS: [&str; 3] = ["sk-", "ak-", "Bearer "];

/// Places where a credential follows a fixed marker.
const MARKER_PATTERNS: [&str; 6] = [
    "Authorization: ",
    "authorization: ",
    "api_key=",
    "access_token=",
    "\"api_key\":\"",
    "\"token\":\"",
];

fn is_secret_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '+' | '/' | '=')
}

fn redact_after(text: &mut String, marker: &str) {
    let mut from = 0;
    while let Some(rel) = text[from..].find(marker) {
        let start = from + rel;
        let value_start = start + marker.len();
        let value_len: usize = text[value_start..]
            .chars()
            .take_while(|c| is_secret_char(*c))
            .map(char::len_utf8)
            .sum();

        if value_len == 0 {
            from = value_start;
            continue;
        }

        text.replace_range(start..value_start + value_len, REDACTED);
        from = start + REDACTED.len();
    }
}

/// Redact credential-looking tokens from provider error text before it is
/// logged or shown to a user.
pub fn scrub_secret_patterns(input: &str) -> Cow<'_, str> {
    let hit = PREFIX_PATTERNS
        .iter()
        .chain(MARKER_PATTERNS.iter())
        .any(|p| input.contains(p));
    if !hit {
        return Cow::Borrowed(input);
    }

    let mut scrubbed = input.to_string();
    for marker in PREFIX_PATTERNS.iter().chain(MARKER_PATTERNS.iter()) {
        redact_after(&mut scrubbed, marker);
    }
    Cow::Owned(scrubbed)
}

/// Scrub and truncate an upstream error body.
pub fn sanitize_api_error(input: &str) -> String {
    let scrubbed = scrub_secret_patterns(input);
    if scrubbed.chars().count() <= MAX_API_ERROR_CHARS {
        return scrubbed.into_owned();
    }

    let truncated: String = scrubbed.chars().take(MAX_API_ERROR_CHARS).collect();
    format!("{truncated}...")
}

/// Status code plus sanitized body of a failed HTTP response.
pub async fn read_error_body(response: reqwest::Response) -> (u16, String) {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());
    (status, sanitize_api_error(&body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_borrowed() {
        let out = scrub_secret_patterns("model overloaded");
        assert!(matches!(out, Cow::Borrowed(_)));
    }

    #[test]
    fn redacts_api_keys() {
        let out = scrub_secret_patterns("invalid key sk-abc123XYZ provided");
        assert_eq!(out, "invalid key [REDACTED] provided");
    }

    #[test]
    fn redacts_bearer_header() {
        let out = scrub_secret_patterns("sent Authorization: Bearer tok.en-1 upstream");
        assert!(!out.contains("tok.en-1"));
        assert!(out.contains(REDACTED));
    }

    #[test]
    fn bare_marker_is_left_alone() {
        let out = scrub_secret_patterns("api_key= missing");
        assert_eq!(out, "api_key= missing");
    }

    #[test]
    fn sanitize_truncates_long_bodies() {
        let long = "é".repeat(500);
        let out = sanitize_api_error(&long);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), MAX_API_ERROR_CHARS + 3);
    }
}
