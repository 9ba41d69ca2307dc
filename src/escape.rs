//! HTML entity escaping.

/// Escape text for use in HTML content and attribute values.
///
/// Replaces `& < > " '`. A single pass over the input means an entity
/// produced here is never escaped a second time.
pub fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape verbatim code content. Quotes stay literal.
pub fn escape_verbatim(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text_script_tag() {
        assert_eq!(escape_text("<script>"), "&lt;script&gt;");
    }

    #[test]
    fn test_escape_text_quotes() {
        assert_eq!(escape_text(r#"say "hi" & 'bye'"#), "say &quot;hi&quot; &amp; &#39;bye&#39;");
    }

    #[test]
    fn test_escape_text_plain_is_identity() {
        assert_eq!(escape_text("plain words, 100%"), "plain words, 100%");
    }

    #[test]
    fn test_escape_text_does_not_double_escape() {
        assert_eq!(escape_text("&lt;"), "&amp;lt;");
    }

    #[test]
    fn test_escape_verbatim_keeps_quotes() {
        assert_eq!(escape_verbatim(r#"a < "b" & 'c'"#), r#"a &lt; "b" &amp; 'c'"#);
    }
}
