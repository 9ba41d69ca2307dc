use crate::block::{Alignment, Block, List, Table};
use crate::escape::{escape_text, escape_verbatim};
use crate::inline::render_inline;

/// Convert blocks to HTML
pub fn blocks_to_html(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        emit_block(block, &mut out);
    }
    out
}

fn emit_block(block: &Block, out: &mut String) {
    match block {
        Block::Heading { level, content } => {
            out.push_str(&format!("<h{level}>{}</h{level}>\n", render_inline(content)));
        }
        Block::Paragraph { content } => {
            out.push_str("<p>");
            out.push_str(&render_inline(content));
            out.push_str("</p>\n");
        }
        Block::CodeBlock { language, body } => {
            out.push_str("<pre><code");
            if let Some(lang) = language {
                out.push_str(&format!(r#" class="language-{}""#, escape_text(lang)));
            }
            out.push('>');
            out.push_str(&escape_verbatim(body));
            out.push_str("</code></pre>\n");
        }
        Block::Blockquote(blocks) => {
            out.push_str("<blockquote>\n");
            for block in blocks {
                emit_block(block, out);
            }
            out.push_str("</blockquote>\n");
        }
        Block::List(list) => {
            list_to_html(list, out);
            out.push('\n');
        }
        Block::Table(table) => {
            table_to_html(table, out);
        }
        Block::Rule => {
            out.push_str("<hr />\n");
        }
    }
}

fn list_to_html(list: &List, out: &mut String) {
    let tag = if list.ordered { "ol" } else { "ul" };
    out.push_str(&format!("<{tag}>\n"));
    for item in &list.items {
        out.push_str("<li>");
        out.push_str(&render_inline(&item.text));
        if let Some(nested) = &item.nested {
            list_to_html(nested, out);
        }
        out.push_str("</li>\n");
    }
    out.push_str(&format!("</{tag}>"));
}

fn align_attr(table: &Table, column: usize) -> &'static str {
    match table.columns.get(column).map(|c| c.align) {
        Some(Alignment::Center) => r#" style="text-align:center""#,
        Some(Alignment::Right) => r#" style="text-align:right""#,
        Some(Alignment::None) | None => "",
    }
}

fn table_to_html(table: &Table, out: &mut String) {
    out.push_str("<table>\n<thead>\n<tr>");
    for (i, cell) in table.header().iter().enumerate() {
        out.push_str(&format!("<th{}>{}</th>", align_attr(table, i), render_inline(cell)));
    }
    out.push_str("</tr>\n</thead>\n<tbody>\n");

    for row in table.body() {
        out.push_str("<tr>");
        for (i, cell) in row.iter().enumerate() {
            out.push_str(&format!("<td{}>{}</td>", align_attr(table, i), render_inline(cell)));
        }
        out.push_str("</tr>\n");
    }

    out.push_str("</tbody>\n</table>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Column, ListItem};

    fn item(text: &str, nested: Option<List>) -> ListItem {
        ListItem {
            text: text.to_string(),
            nested: nested.map(Box::new),
        }
    }

    #[test]
    fn test_heading_and_paragraph() {
        let blocks = vec![
            Block::Heading {
                level: 3,
                content: "A & B".to_string(),
            },
            Block::Paragraph {
                content: "*hi*".to_string(),
            },
        ];
        assert_eq!(blocks_to_html(&blocks), "<h3>A &amp; B</h3>\n<p><em>hi</em></p>\n");
    }

    #[test]
    fn test_code_block_language_class() {
        let blocks = vec![Block::CodeBlock {
            language: Some("rust".to_string()),
            body: "if a < b { \"*\" }".to_string(),
        }];
        assert_eq!(
            blocks_to_html(&blocks),
            "<pre><code class=\"language-rust\">if a &lt; b { \"*\" }</code></pre>\n"
        );
    }

    #[test]
    fn test_nested_list_sits_inside_item() {
        let list = List {
            ordered: false,
            items: vec![
                item("a", None),
                item(
                    "b",
                    Some(List {
                        ordered: true,
                        items: vec![item("c", None)],
                    }),
                ),
            ],
        };
        assert_eq!(
            blocks_to_html(&[Block::List(list)]),
            "<ul>\n<li>a</li>\n<li>b<ol>\n<li>c</li>\n</ol></li>\n</ul>\n"
        );
    }

    #[test]
    fn test_table_alignment_attrs() {
        let table = Table {
            columns: vec![
                Column {
                    align: Alignment::None,
                },
                Column {
                    align: Alignment::Right,
                },
            ],
            rows: vec![
                vec!["h1".to_string(), "h2".to_string()],
                vec!["a".to_string(), "b".to_string(), "c".to_string()],
            ],
        };
        assert_eq!(
            blocks_to_html(&[Block::Table(table)]),
            "<table>\n<thead>\n<tr><th>h1</th><th style=\"text-align:right\">h2</th></tr>\n\
             </thead>\n<tbody>\n\
             <tr><td>a</td><td style=\"text-align:right\">b</td><td>c</td></tr>\n\
             </tbody>\n</table>\n"
        );
    }

    #[test]
    fn test_blockquote_wraps_children() {
        let blocks = vec![Block::Blockquote(vec![Block::Rule])];
        assert_eq!(blocks_to_html(&blocks), "<blockquote>\n<hr />\n</blockquote>\n");
    }
}
