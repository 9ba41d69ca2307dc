//! Convert lightweight Markdown into sanitized HTML.
//!
//! [`render`] is total: any input, however malformed, produces HTML and
//! never an error. Text content is always escaped, so the output is safe to
//! embed in an HTML document.
//!
//! ```
//! assert_eq!(mdhtml::render("# Hi *there*"), "<h1>Hi <em>there</em></h1>\n");
//! ```

mod block;
mod config;
mod error;
mod escape;
mod html;
mod inline;
mod list;
mod page;
mod parser;
mod table;

pub use block::{Alignment, Block, Column, List, ListItem, Table};
pub use config::{Config, InputConfig, OutputConfig};
pub use error::{Error, Result};
pub use escape::{escape_text, escape_verbatim};
pub use html::blocks_to_html;
pub use inline::render_inline;
pub use page::render_page;

use tracing::debug;

/// Parse markdown text into a vector of blocks.
pub fn parse(markdown: &str) -> Vec<Block> {
    parser::parse(markdown)
}

/// Convert markdown to HTML.
pub fn render(markdown: &str) -> String {
    let blocks = parse(markdown);
    debug!(input_len = markdown.len(), blocks = blocks.len(), "rendering markdown");
    blocks_to_html(&blocks)
}
