/// Rendered in place of an empty payload so the row keeps a visible height.
pub const PLACEHOLDER: &str = "\u{a0}";

/// A payload prepared for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    /// Text to render. Never empty.
    pub text: String,
    /// Whether the payload was empty before the placeholder was substituted.
    pub was_empty: bool,
}

/// Drops a single trailing newline and substitutes [`PLACEHOLDER`] for empty
/// content.
#[must_use]
pub fn normalize(raw: Option<&str>) -> Normalized {
    let text = raw.map(|raw| raw.strip_suffix('\n').unwrap_or(raw)).unwrap_or_default();

    if text.is_empty() {
        Normalized {
            text: PLACEHOLDER.to_owned(),
            was_empty: true,
        }
    } else {
        Normalized {
            text: text.to_owned(),
            was_empty: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strips_exactly_one_trailing_newline() {
        assert_eq!(normalize(Some("hello\n")).text, "hello");
        assert_eq!(normalize(Some("hello\n\n")).text, "hello\n");
    }

    #[test]
    fn keeps_other_trailing_whitespace() {
        assert_eq!(normalize(Some("hello \t")).text, "hello \t");
        assert_eq!(normalize(Some("hello\r\n")).text, "hello\r");
    }

    #[test]
    fn empty_and_missing_payloads_get_placeholder() {
        for raw in [None, Some(""), Some("\n")] {
            let normalized = normalize(raw);
            assert_eq!(normalized.text, PLACEHOLDER, "{raw:?}");
            assert!(normalized.was_empty, "{raw:?}");
        }
    }

    #[test]
    fn non_empty_payload_is_not_flagged() {
        let normalized = normalize(Some("\n\n"));
        assert_eq!(normalized.text, "\n");
        assert!(!normalized.was_empty);
    }
}
