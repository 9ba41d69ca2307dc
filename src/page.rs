//! Host-level page output: front matter handling and the standalone
//! document wrapper. Nothing here is consulted by [`crate::render`].

use crate::block::Block;
use crate::config::Config;
use crate::escape::escape_text;
use crate::html::blocks_to_html;
use crate::inline::render_inline;
use crate::parser;

/// Drop a leading `---` delimited metadata block.
fn strip_frontmatter(markdown: &str) -> &str {
    let Some(rest) = markdown.strip_prefix("---") else {
        return markdown;
    };
    match rest.find("\n---") {
        Some(end) => rest[end + "\n---".len()..].trim_start_matches('\n'),
        None => markdown,
    }
}

/// Remove every `<...>` tag from rendered HTML, keeping entities as they are.
fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text
}

/// Escaped plain text of the first heading, with inline markup removed.
fn first_heading_text(blocks: &[Block]) -> Option<String> {
    blocks.iter().find_map(|block| match block {
        Block::Heading { content, .. } => Some(strip_tags(&render_inline(content))),
        _ => None,
    })
}

/// Render markdown for output, applying the host configuration.
pub fn render_page(markdown: &str, config: &Config) -> String {
    let markdown = if config.input.strip_frontmatter {
        strip_frontmatter(markdown)
    } else {
        markdown
    };
    let blocks = parser::parse(markdown);
    let body = blocks_to_html(&blocks);

    let output = &config.output;
    if !output.standalone {
        return body;
    }

    let title = if output.title.is_empty() {
        first_heading_text(&blocks).unwrap_or_else(|| "Document".to_string())
    } else {
        escape_text(&output.title)
    };

    let mut page = String::new();
    page.push_str("<!DOCTYPE html>\n");
    page.push_str(&format!("<html lang=\"{}\">\n", escape_text(&output.lang)));
    page.push_str("<head>\n<meta charset=\"utf-8\">\n");
    page.push_str(&format!("<title>{title}</title>\n"));
    if !output.stylesheet.is_empty() {
        page.push_str(&format!(
            "<link rel=\"stylesheet\" href=\"{}\">\n",
            escape_text(&output.stylesheet)
        ));
    }
    page.push_str("</head>\n<body>\n");
    page.push_str(&body);
    page.push_str("</body>\n</html>\n");
    page
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standalone() -> Config {
        let mut config = Config::default();
        config.output.standalone = true;
        config
    }

    #[test]
    fn test_strip_frontmatter() {
        assert_eq!(strip_frontmatter("---\ntitle: x\n---\n\n# Hi"), "# Hi");
        assert_eq!(strip_frontmatter("# Hi"), "# Hi");
        assert_eq!(strip_frontmatter("---\nunclosed"), "---\nunclosed");
        assert_eq!(strip_frontmatter("---\na: 1\n---"), "");
    }

    #[test]
    fn test_fragment_by_default() {
        let html = render_page("---\nk: v\n---\ntext", &Config::default());
        assert_eq!(html, "<p>text</p>\n");
    }

    #[test]
    fn test_frontmatter_kept_when_disabled() {
        let mut config = Config::default();
        config.input.strip_frontmatter = false;
        let html = render_page("---\nk: v\n---\ntext", &config);
        assert_eq!(html, "<hr />\n<h2>k: v</h2>\n<p>text</p>\n");
    }

    #[test]
    fn test_standalone_uses_first_heading_as_title() {
        let html = render_page("intro\n\n## Tom & Jerry", &standalone());
        assert!(html.starts_with("<!DOCTYPE html>\n<html lang=\"en\">\n"));
        assert!(html.contains("<title>Tom &amp; Jerry</title>"));
        assert!(html.contains("<body>\n<p>intro</p>\n<h2>Tom &amp; Jerry</h2>\n</body>"));
        assert!(!html.contains("stylesheet"));
    }

    #[test]
    fn test_title_is_plain_text_of_heading() {
        let html = render_page("## **Bold** `x` [y](u) title", &standalone());
        assert!(html.contains("<title>Bold x y title</title>"));
    }

    #[test]
    fn test_title_keeps_escaped_angle_brackets() {
        let html = render_page("# a <b> `<c>`", &standalone());
        assert!(html.contains("<title>a &lt;b&gt; &lt;c&gt;</title>"));
    }

    #[test]
    fn test_explicit_title_is_escaped() {
        let mut config = standalone();
        config.output.title = "<x>".to_string();
        assert!(render_page("", &config).contains("<title>&lt;x&gt;</title>"));
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<em>a</em> &amp; <code>b</code>"), "a &amp; b");
    }

    #[test]
    fn test_standalone_explicit_title_and_stylesheet() {
        let mut config = standalone();
        config.output.title = "Notes".to_string();
        config.output.stylesheet = "style.css".to_string();
        let html = render_page("# Heading", &config);
        assert!(html.contains("<title>Notes</title>"));
        assert!(html.contains("<link rel=\"stylesheet\" href=\"style.css\">"));
    }

    #[test]
    fn test_standalone_without_heading() {
        let html = render_page("", &standalone());
        assert!(html.contains("<title>Document</title>"));
    }
}
