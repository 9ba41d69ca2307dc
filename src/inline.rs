//! Inline rendering: code spans, images, links, emphasis and hard breaks.
//!
//! Text is turned into a stream of [`Atom`]s. A rule that produces HTML
//! stores it in a [`MarkupTable`] and leaves an opaque `Atom::Markup` in the
//! stream, so later rules can never match inside it and user text can never
//! forge one. Remaining characters are escaped when the stream is restored.

use std::collections::HashMap;

use tracing::trace;

use crate::escape::{escape_text, escape_verbatim};

/// Index into a [`MarkupTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MarkupId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Atom {
    Char(char),
    Markup(MarkupId),
}

impl Atom {
    fn as_char(self) -> Option<char> {
        match self {
            Atom::Char(c) => Some(c),
            Atom::Markup(_) => None,
        }
    }

    fn is_word(self) -> bool {
        self.as_char()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}

/// Rendered HTML fragments, in the order they were produced.
#[derive(Debug, Default)]
struct MarkupTable {
    fragments: Vec<String>,
}

impl MarkupTable {
    fn stash(&mut self, html: impl Into<String>) -> Atom {
        self.fragments.push(html.into());
        Atom::Markup(MarkupId(self.fragments.len() - 1))
    }

    fn get(&self, id: MarkupId) -> &str {
        &self.fragments[id.0]
    }
}

/// Render a run of inline Markdown to HTML.
pub fn render_inline(text: &str) -> String {
    let mut table = MarkupTable::default();
    let atoms = extract_code_spans(text, &mut table);
    let atoms = render_atoms(&atoms, &mut table);
    restore(&atoms, &table)
}

/// Every rule after code-span extraction, in precedence order.
fn render_atoms(atoms: &[Atom], table: &mut MarkupTable) -> Vec<Atom> {
    let atoms = replace_images(atoms, table);
    let atoms = replace_links(&atoms, table);
    // Longest delimiter first so `***x***` is not read as bold around `*x*`
    let atoms = replace_delimited(&atoms, &["***", "___"], "<strong><em>", "</em></strong>", table);
    let atoms = replace_delimited(&atoms, &["**", "__"], "<strong>", "</strong>", table);
    let atoms = replace_delimited(&atoms, &["*"], "<em>", "</em>", table);
    let atoms = replace_underscore_italic(&atoms, table);
    replace_hard_breaks(&atoms, table)
}

fn restore(atoms: &[Atom], table: &MarkupTable) -> String {
    let mut out = String::new();
    let mut pending = String::new();
    for atom in atoms {
        match *atom {
            Atom::Char(c) => pending.push(c),
            Atom::Markup(id) => {
                out.push_str(&escape_text(&pending));
                pending.clear();
                out.push_str(table.get(id));
            }
        }
    }
    out.push_str(&escape_text(&pending));
    out
}

fn extract_code_spans(text: &str, table: &mut MarkupTable) -> Vec<Atom> {
    let chars: Vec<char> = text.chars().collect();
    let runs = backtick_runs(&chars);
    let closers = next_same_length(&runs);
    let mut atoms = Vec::with_capacity(chars.len());
    let mut pos = 0;
    let mut r = 0;

    while r < runs.len() {
        let (start, len) = runs[r];
        atoms.extend(chars[pos..start].iter().copied().map(Atom::Char));

        match closers[r] {
            Some(c) => {
                let inner: String = chars[start + len..runs[c].0].iter().collect();
                let html = format!("<code>{}</code>", escape_verbatim(trim_one_space(&inner)));
                atoms.push(table.stash(html));
                pos = runs[c].0 + len;
                r = c + 1;
            }
            None => {
                atoms.extend(chars[start..start + len].iter().copied().map(Atom::Char));
                pos = start + len;
                r += 1;
            }
        }
    }
    atoms.extend(chars[pos..].iter().copied().map(Atom::Char));
    atoms
}

/// For each run, the index of the next run with exactly the same length.
fn next_same_length(runs: &[(usize, usize)]) -> Vec<Option<usize>> {
    let mut next = vec![None; runs.len()];
    let mut seen: HashMap<usize, usize> = HashMap::new();
    for (r, &(_, len)) in runs.iter().enumerate().rev() {
        next[r] = seen.insert(len, r);
    }
    next
}

/// Maximal runs of backticks as `(start, len)`.
fn backtick_runs(chars: &[char]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '`' {
            let start = i;
            while i < chars.len() && chars[i] == '`' {
                i += 1;
            }
            runs.push((start, i - start));
        } else {
            i += 1;
        }
    }
    runs
}

/// Strip at most one whitespace character from each end.
fn trim_one_space(s: &str) -> &str {
    let mut s = s;
    if let Some(c) = s.chars().next().filter(|c| c.is_whitespace()) {
        s = &s[c.len_utf8()..];
    }
    if let Some(c) = s.chars().next_back().filter(|c| c.is_whitespace()) {
        s = &s[..s.len() - c.len_utf8()];
    }
    s
}

/// A parsed `url "title"` link or image target.
#[derive(Debug, PartialEq, Eq)]
struct Target<'a> {
    url: &'a str,
    title: Option<&'a str>,
}

fn parse_target(rest: &str) -> Option<Target<'_>> {
    let trimmed = rest.trim_end();
    if trimmed.is_empty() || trimmed.starts_with(char::is_whitespace) {
        return None;
    }
    let Some(split) = trimmed.find(char::is_whitespace) else {
        return Some(Target {
            url: trimmed,
            title: None,
        });
    };
    let (url, tail) = trimmed.split_at(split);
    let title = tail.trim_start().strip_prefix('"')?.strip_suffix('"')?;
    if title.contains('"') {
        return None;
    }
    Some(Target {
        url,
        title: (!title.is_empty()).then_some(title),
    })
}

fn title_attr(title: Option<&str>) -> String {
    match title {
        Some(title) => format!(r#" title="{}""#, escape_text(title)),
        None => String::new(),
    }
}

/// Index of the first `Char(target)` at or after `from`, if every atom
/// before it is a plain character. On failure, the position where the
/// search stopped.
fn find_plain(atoms: &[Atom], from: usize, target: char) -> Result<usize, usize> {
    for (j, atom) in atoms.iter().enumerate().skip(from) {
        match atom.as_char() {
            Some(c) if c == target => return Ok(j),
            Some(_) => {}
            None => return Err(j),
        }
    }
    Err(atoms.len())
}

/// Index of the first `Char(target)` at or after `from`, skipping markup.
fn find_char(atoms: &[Atom], from: usize, target: char) -> Result<usize, usize> {
    atoms
        .iter()
        .skip(from)
        .position(|&a| a == Atom::Char(target))
        .map(|offset| from + offset)
        .ok_or(atoms.len())
}

fn collect_chars(atoms: &[Atom]) -> String {
    atoms.iter().filter_map(|a| a.as_char()).collect()
}

/// Match `[label](rest)` starting at `open`, returning the close-bracket
/// and close-paren positions.
///
/// The label ends at the first `]`, so every opener before the returned
/// error position fails the same way and can be skipped.
fn match_bracketed(
    atoms: &[Atom],
    open: usize,
    plain_label: bool,
) -> Result<(usize, usize), usize> {
    let close = if plain_label {
        find_plain(atoms, open + 1, ']')?
    } else {
        find_char(atoms, open + 1, ']')?
    };
    if atoms.get(close + 1) != Some(&Atom::Char('(')) {
        return Err(close);
    }
    let paren = find_plain(atoms, close + 2, ')').map_err(|_| close)?;
    Ok((close, paren))
}

fn replace_images(atoms: &[Atom], table: &mut MarkupTable) -> Vec<Atom> {
    let mut out = Vec::with_capacity(atoms.len());
    let mut fail_until = 0;
    let mut i = 0;
    while i < atoms.len() {
        let opens = atoms[i] == Atom::Char('!') && atoms.get(i + 1) == Some(&Atom::Char('['));
        if opens && i + 1 >= fail_until {
            match match_bracketed(atoms, i + 1, true) {
                Ok((close, paren)) => {
                    let alt = collect_chars(&atoms[i + 2..close]);
                    let rest = collect_chars(&atoms[close + 2..paren]);
                    let html = match parse_target(&rest) {
                        Some(target) => format!(
                            r#"<img src="{}" alt="{}"{} />"#,
                            escape_text(target.url),
                            escape_text(&alt),
                            title_attr(target.title)
                        ),
                        None => {
                            trace!(destination = %rest, "malformed image target, keeping alt text");
                            escape_text(&alt)
                        }
                    };
                    out.push(table.stash(html));
                    i = paren + 1;
                    continue;
                }
                Err(stop) => fail_until = stop,
            }
        }
        out.push(atoms[i]);
        i += 1;
    }
    out
}

fn replace_links(atoms: &[Atom], table: &mut MarkupTable) -> Vec<Atom> {
    let mut out = Vec::with_capacity(atoms.len());
    let mut fail_until = 0;
    let mut i = 0;
    while i < atoms.len() {
        if atoms[i] == Atom::Char('[') && i >= fail_until {
            match match_bracketed(atoms, i, false) {
                // An empty label is not a link
                Ok((close, _)) if close == i + 1 => {}
                Ok((close, paren)) => {
                    let rest = collect_chars(&atoms[close + 2..paren]);
                    let (href, title) = match parse_target(&rest) {
                        Some(target) => (target.url, target.title),
                        None => (rest.as_str(), None),
                    };
                    let label = render_atoms(&atoms[i + 1..close], table);
                    let html = format!(
                        r#"<a href="{}"{}>{}</a>"#,
                        escape_text(href),
                        title_attr(title),
                        restore(&label, table)
                    );
                    out.push(table.stash(html));
                    i = paren + 1;
                    continue;
                }
                Err(stop) => fail_until = stop,
            }
        }
        out.push(atoms[i]);
        i += 1;
    }
    out
}

fn starts_with(atoms: &[Atom], at: usize, delim: &str) -> bool {
    let mut idx = at;
    for c in delim.chars() {
        if atoms.get(idx) != Some(&Atom::Char(c)) {
            return false;
        }
        idx += 1;
    }
    true
}

/// First position after at least one inner atom where `delim` starts again.
/// Emphasis never crosses a newline. On failure, the position of the newline
/// or the end of input, which no later opener before it can get past either.
fn find_closing(atoms: &[Atom], from: usize, delim: &str) -> Result<usize, usize> {
    for j in from..atoms.len() {
        if atoms[j] == Atom::Char('\n') {
            return Err(j);
        }
        if j > from && starts_with(atoms, j, delim) {
            return Ok(j);
        }
    }
    Err(atoms.len())
}

fn replace_delimited(
    atoms: &[Atom],
    delims: &[&str],
    open: &str,
    close: &str,
    table: &mut MarkupTable,
) -> Vec<Atom> {
    let mut out = Vec::with_capacity(atoms.len());
    // Per delimiter, openers before this position are known to be unclosed
    let mut fail_until = vec![0; delims.len()];
    let mut i = 0;
    while i < atoms.len() {
        let mut matched = None;
        for (d, delim) in delims.iter().enumerate() {
            if i < fail_until[d] || !starts_with(atoms, i, delim) {
                continue;
            }
            let len = delim.chars().count();
            match find_closing(atoms, i + len, delim) {
                Ok(end) => {
                    matched = Some((len, end));
                    break;
                }
                Err(stop) => fail_until[d] = stop,
            }
        }
        if let Some((len, end)) = matched {
            out.push(table.stash(open));
            out.extend_from_slice(&atoms[i + len..end]);
            out.push(table.stash(close));
            i = end + len;
        } else {
            out.push(atoms[i]);
            i += 1;
        }
    }
    out
}

/// `_text_` only when the underscores sit at word boundaries, so
/// `snake_case_name` is left alone.
fn replace_underscore_italic(atoms: &[Atom], table: &mut MarkupTable) -> Vec<Atom> {
    let mut out = Vec::with_capacity(atoms.len());
    let mut fail_until = 0;
    let mut i = 0;
    while i < atoms.len() {
        let opens = atoms[i] == Atom::Char('_') && (i == 0 || !atoms[i - 1].is_word());
        if opens && i >= fail_until {
            match find_underscore_closing(atoms, i + 2) {
                Ok(end) => {
                    out.push(table.stash("<em>"));
                    out.extend_from_slice(&atoms[i + 1..end]);
                    out.push(table.stash("</em>"));
                    i = end + 1;
                    continue;
                }
                Err(stop) => fail_until = stop,
            }
        }
        out.push(atoms[i]);
        i += 1;
    }
    out
}

/// A closing `_` not followed by a word character, on the same line.
fn find_underscore_closing(atoms: &[Atom], from: usize) -> Result<usize, usize> {
    for j in from..atoms.len() {
        if atoms[j - 1] == Atom::Char('\n') {
            return Err(j);
        }
        if atoms[j] == Atom::Char('_') && !atoms.get(j + 1).is_some_and(|a| a.is_word()) {
            return Ok(j);
        }
    }
    Err(atoms.len())
}

fn replace_hard_breaks(atoms: &[Atom], table: &mut MarkupTable) -> Vec<Atom> {
    let mut out = Vec::with_capacity(atoms.len());
    let mut i = 0;
    while i < atoms.len() {
        if starts_with(atoms, i, "  \n") {
            out.push(table.stash("<br />"));
            out.push(Atom::Char('\n'));
            i += 3;
        } else {
            out.push(atoms[i]);
            i += 1;
        }
    }
    out
}
