//! List tokens and nesting.
//!
//! The scanner produces a flat run of [`ListToken`]s; [`build_list`] turns
//! the indentation of that run into a tree of owned [`List`]s.

use crate::block::{List, ListItem};

/// Lists nested deeper than this keep their remaining tokens as siblings.
pub(crate) const MAX_LIST_DEPTH: usize = 256;

/// One list-marker line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListToken {
    pub indent: usize,
    pub ordered: bool,
    pub text: String,
}

/// Match `<indent><marker><space><text>` where marker is `-`, `*`, `+` or `N.`.
pub fn parse_list_token(line: &str) -> Option<ListToken> {
    let rest = line.trim_start();
    let indent = line[..line.len() - rest.len()].chars().count();

    let (ordered, after_marker) = match rest.chars().next()? {
        '-' | '*' | '+' => (false, &rest[1..]),
        c if c.is_ascii_digit() => {
            let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
            (true, rest[digits..].strip_prefix('.')?)
        }
        _ => return None,
    };

    let mut chars = after_marker.chars();
    if !chars.next()?.is_whitespace() {
        return None;
    }
    let text = chars.as_str();
    if text.is_empty() {
        return None;
    }

    Some(ListToken {
        indent,
        ordered,
        text: text.to_string(),
    })
}

/// Build the list tree for a run of tokens.
///
/// The smallest indent in the run is the current level. A token at that
/// level starts a sibling item and the deeper tokens that follow it become
/// that item's nested list. The first token always starts an item, so a run
/// that opens deeper than it continues loses nothing. Below
/// [`MAX_LIST_DEPTH`] levels the remaining tokens become flat siblings.
pub fn build_list(tokens: &[ListToken]) -> List {
    build_level(tokens, 1)
}

fn build_level(tokens: &[ListToken], depth: usize) -> List {
    let ordered = tokens.first().is_some_and(|t| t.ordered);
    if depth >= MAX_LIST_DEPTH {
        let items = tokens
            .iter()
            .map(|token| ListItem {
                text: token.text.clone(),
                nested: None,
            })
            .collect();
        return List { ordered, items };
    }

    let level = tokens.iter().map(|t| t.indent).min().unwrap_or(0);

    let mut items = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        let end = tokens[i + 1..]
            .iter()
            .position(|t| t.indent <= level)
            .map_or(tokens.len(), |offset| i + 1 + offset);

        let children = &tokens[i + 1..end];
        items.push(ListItem {
            text: token.text.clone(),
            nested: (!children.is_empty()).then(|| Box::new(build_level(children, depth + 1))),
        });
        i = end;
    }

    List { ordered, items }
}
