//! Normalization of client-supplied fields
//!
//! Missing or malformed titles, model tags, and image references are
//! substituted rather than rejected. The substitutions live here as
//! named functions so the contract stays auditable.

/// Maximum stored title length, in characters
pub const TITLE_MAX_CHARS: usize = 50;

/// Placeholder title for empty input
pub const DEFAULT_SESSION_TITLE: &str = "New chat";

/// Model tag used when the client sends none
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Trim and truncate a session title to [`TITLE_MAX_CHARS`] characters.
///
/// Truncation counts `char`s, never splitting a code point. An empty
/// result becomes [`DEFAULT_SESSION_TITLE`].
pub fn normalize_title(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_SESSION_TITLE.to_string();
    }
    trimmed.chars().take(TITLE_MAX_CHARS).collect()
}

/// Substitute [`DEFAULT_MODEL`] for a missing or empty model tag.
pub fn normalize_model(raw: Option<&str>) -> String {
    match raw {
        Some(m) if !m.trim().is_empty() => m.trim().to_string(),
        _ => DEFAULT_MODEL.to_string(),
    }
}

/// A parsed `data:<mime>;base64,<payload>` image reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime_type: String,
    pub data: String,
}

/// Parse a `data:<mime>;base64,<payload>` string.
///
/// Returns `None` for anything that does not match the pattern, or
/// where the mime type or payload is empty. Callers drop the image and
/// keep the text.
pub fn parse_data_url(s: &str) -> Option<DataUrl> {
    let rest = s.strip_prefix("data:")?;
    let (mime_type, data) = rest.split_once(";base64,")?;
    if mime_type.is_empty() || data.is_empty() {
        return None;
    }
    Some(DataUrl {
        mime_type: mime_type.to_string(),
        data: data.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_truncated_to_fifty_chars() {
        let long = "Hello world, this is a very long opening message that exceeds fifty characters easily";
        let title = normalize_title(long);
        assert_eq!(title.chars().count(), 50);
        assert_eq!(title, &long[..50]);
    }

    #[test]
    fn test_title_truncation_is_char_safe() {
        let raw = "日".repeat(60);
        let title = normalize_title(&raw);
        assert_eq!(title.chars().count(), 50);
        assert_eq!(title, "日".repeat(50));
    }

    #[test]
    fn test_empty_title_gets_placeholder() {
        assert_eq!(normalize_title(""), DEFAULT_SESSION_TITLE);
        assert_eq!(normalize_title("   "), DEFAULT_SESSION_TITLE);
    }

    #[test]
    fn test_short_title_kept_as_is() {
        assert_eq!(normalize_title("  Weather   "), "Weather");
    }

    #[test]
    fn test_model_defaulting() {
        assert_eq!(normalize_model(None), DEFAULT_MODEL);
        assert_eq!(normalize_model(Some("")), DEFAULT_MODEL);
        assert_eq!(normalize_model(Some("gpt-4o")), "gpt-4o");
    }

    #[test]
    fn test_parse_valid_data_url() {
        let parsed = parse_data_url("data:image/png;base64,iVBORw0KGgo=").unwrap();
        assert_eq!(parsed.mime_type, "image/png");
        assert_eq!(parsed.data, "iVBORw0KGgo=");
    }

    #[test]
    fn test_parse_rejects_malformed_references() {
        assert!(parse_data_url("http://example.com/cat.png").is_none());
        assert!(parse_data_url("data:image/png,no-base64-marker").is_none());
        assert!(parse_data_url("data:;base64,abcd").is_none());
        assert!(parse_data_url("data:image/png;base64,").is_none());
        assert!(parse_data_url("").is_none());
    }
}
