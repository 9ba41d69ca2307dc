use std::borrow::Cow;

use tracing::{debug, trace};

use crate::block::Block;
use crate::list::{build_list, parse_list_token};
use crate::table::{is_separator_row, parse_table};

/// Blockquotes nested deeper than this are kept as paragraph text.
pub(crate) const MAX_QUOTE_DEPTH: usize = 256;

/// Block rules, in the order they are tried for each line.
#[derive(Debug, Clone, Copy)]
enum Rule {
    Blank,
    Fence,
    AtxHeading,
    SetextHeading,
    HorizontalRule,
    Blockquote,
    List,
    Table,
}

const RULES: [Rule; 8] = [
    Rule::Blank,
    Rule::Fence,
    Rule::AtxHeading,
    Rule::SetextHeading,
    Rule::HorizontalRule,
    Rule::Blockquote,
    Rule::List,
    Rule::Table,
];

/// Parse markdown text into a list of blocks
pub fn parse(markdown: &str) -> Vec<Block> {
    let text = if markdown.contains('\r') {
        Cow::Owned(markdown.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(markdown)
    };
    let lines: Vec<&str> = text.split('\n').collect();
    parse_lines(&lines, 0)
}

fn parse_lines(lines: &[&str], depth: usize) -> Vec<Block> {
    let mut state = ParseState {
        lines,
        pos: 0,
        depth,
        paragraph: Vec::new(),
        blocks: Vec::new(),
    };

    while state.pos < lines.len() {
        let matched = RULES.iter().any(|&rule| state.try_rule(rule));
        if !matched {
            state.paragraph.push(lines[state.pos]);
            state.pos += 1;
        }
    }

    state.flush_paragraph();
    state.blocks
}

struct ParseState<'a> {
    lines: &'a [&'a str],
    pos: usize,
    // Number of enclosing blockquotes
    depth: usize,
    // Lines of the paragraph being accumulated
    paragraph: Vec<&'a str>,
    blocks: Vec<Block>,
}

impl<'a> ParseState<'a> {
    fn line(&self) -> &'a str {
        self.lines[self.pos]
    }

    fn flush_paragraph(&mut self) {
        if self.paragraph.is_empty() {
            return;
        }
        let content = self.paragraph.join("\n");
        self.paragraph.clear();
        self.blocks.push(Block::Paragraph { content });
    }

    /// Flush the pending paragraph and append a block.
    fn emit(&mut self, block: Block) {
        self.flush_paragraph();
        self.blocks.push(block);
    }

    fn try_rule(&mut self, rule: Rule) -> bool {
        match rule {
            Rule::Blank => self.blank(),
            Rule::Fence => self.fenced_code(),
            Rule::AtxHeading => self.atx_heading(),
            Rule::SetextHeading => self.setext_heading(),
            Rule::HorizontalRule => self.horizontal_rule(),
            Rule::Blockquote => self.blockquote(),
            Rule::List => self.list(),
            Rule::Table => self.table(),
        }
    }

    fn blank(&mut self) -> bool {
        if !is_blank(self.line()) {
            return false;
        }
        self.flush_paragraph();
        self.pos += 1;
        true
    }

    fn fenced_code(&mut self) -> bool {
        let Some((fence, language)) = parse_fence(self.line()) else {
            return false;
        };
        self.pos += 1;

        let mut body = Vec::new();
        while self.pos < self.lines.len() && !self.line().starts_with(fence) {
            body.push(self.line());
            self.pos += 1;
        }
        if self.pos >= self.lines.len() {
            debug!(fence, "unterminated code fence, consuming to end of input");
        }
        // Closing fence
        self.pos += 1;

        self.emit(Block::CodeBlock {
            language: (!language.is_empty()).then(|| language.to_string()),
            body: body.join("\n"),
        });
        true
    }

    fn atx_heading(&mut self) -> bool {
        let Some((level, content)) = parse_atx(self.line()) else {
            return false;
        };
        self.emit(Block::Heading {
            level,
            content: content.to_string(),
        });
        self.pos += 1;
        true
    }

    fn setext_heading(&mut self) -> bool {
        let Some(next) = self.lines.get(self.pos + 1) else {
            return false;
        };
        let level = if is_underline(next, '=') {
            1
        } else if is_underline(next, '-') && self.paragraph.is_empty() {
            2
        } else {
            return false;
        };
        let content = self.line().trim().to_string();
        self.emit(Block::Heading { level, content });
        self.pos += 2;
        true
    }

    fn horizontal_rule(&mut self) -> bool {
        if !is_horizontal_rule(self.line()) {
            return false;
        }
        self.emit(Block::Rule);
        self.pos += 1;
        true
    }

    fn blockquote(&mut self) -> bool {
        if !self.line().starts_with('>') {
            return false;
        }
        if self.depth >= MAX_QUOTE_DEPTH {
            trace!(depth = self.depth, "blockquote nesting limit reached");
            return false;
        }

        let mut quoted = Vec::new();
        while self.pos < self.lines.len() {
            let line = self.line();
            if let Some(rest) = line.strip_prefix('>') {
                quoted.push(strip_one_whitespace(rest));
            } else if !is_blank(line) {
                // Lazy continuation
                quoted.push(line);
            } else {
                break;
            }
            self.pos += 1;
        }

        self.emit(Block::Blockquote(parse_lines(&quoted, self.depth + 1)));
        true
    }

    fn list(&mut self) -> bool {
        if parse_list_token(self.line()).is_none() {
            return false;
        }

        let mut tokens = Vec::new();
        while self.pos < self.lines.len() {
            let line = self.line();
            if let Some(token) = parse_list_token(line) {
                tokens.push(token);
            } else if is_continuation(line) {
                let Some(last) = tokens.last_mut() else {
                    break;
                };
                last.text.push(' ');
                last.text.push_str(line.trim());
            } else {
                break;
            }
            self.pos += 1;
        }

        self.emit(Block::List(build_list(&tokens)));
        true
    }

    fn table(&mut self) -> bool {
        if !self.line().contains('|') {
            return false;
        }
        if !self.lines.get(self.pos + 1).is_some_and(|next| is_separator_row(next)) {
            trace!(line = self.line(), "no separator row, not a table");
            return false;
        }
        // This line plus every following line that carries a pipe
        let candidate: Vec<&str> = self.lines[self.pos..]
            .iter()
            .take_while(|line| line.contains('|'))
            .copied()
            .collect();

        let Some(table) = parse_table(&candidate) else {
            return false;
        };

        self.emit(Block::Table(table));
        self.pos += candidate.len();
        true
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// An indented, unmarked line that extends the previous list item.
fn is_continuation(line: &str) -> bool {
    !is_blank(line) && line.chars().take(2).filter(|c| c.is_whitespace()).count() == 2
}

fn strip_one_whitespace(s: &str) -> &str {
    match s.chars().next() {
        Some(c) if c.is_whitespace() => &s[c.len_utf8()..],
        _ => s,
    }
}

/// Returns the opening fence and the language tag that directly follows it.
fn parse_fence(line: &str) -> Option<(&str, &str)> {
    let marker = line.chars().next().filter(|&c| c == '`' || c == '~')?;
    let run = line.len() - line.trim_start_matches(marker).len();
    if run < 3 {
        return None;
    }
    let after = &line[run..];
    let tag_len = after.len()
        - after
            .trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            .len();
    Some((&line[..run], &after[..tag_len]))
}

/// Returns the heading level and trimmed content of an ATX heading.
fn parse_atx(line: &str) -> Option<(u8, &str)> {
    let hashes = line.len() - line.trim_start_matches('#').len();
    let level = u8::try_from(hashes).ok().filter(|l| (1..=6).contains(l))?;

    let rest = &line[hashes..];
    let space = rest.chars().next().filter(|c| c.is_whitespace())?;
    let body = rest[space.len_utf8()..].trim_end();

    // A closing run of `#` only counts when whitespace separates it
    let unclosed = body.trim_end_matches('#');
    let content = if unclosed.len() < body.len() && unclosed.ends_with(char::is_whitespace) {
        unclosed
    } else {
        body
    };
    Some((level, content.trim()))
}

fn is_underline(line: &str, marker: char) -> bool {
    let line = line.trim_end();
    !line.is_empty() && line.chars().all(|c| c == marker)
}

fn is_horizontal_rule(line: &str) -> bool {
    let line = line.trim_end();
    let Some(first) = line.chars().next() else {
        return false;
    };
    matches!(first, '*' | '-' | '_') && line.len() >= 3 && line.chars().all(|c| c == first)
}
