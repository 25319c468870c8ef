//! Markdown construct transformers.
//!
//! Each transformer rewrites one construct and hands its output to the next
//! one. Later transformers see the HTML produced by earlier ones, so the
//! helpers here let them step around markup they must not touch.

pub mod code;
pub mod image;
pub mod inline;
pub mod link;
pub mod list;
pub mod quote;
pub mod rule;
pub mod table;

use regex::Regex;
use std::sync::LazyLock;

static RE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9]*)\b[^<>]*>").unwrap());

static RE_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x{E000}(\d+)\n?\x{E001}").unwrap());

const PLACEHOLDER_OPEN: char = '\u{E000}';
const PLACEHOLDER_CLOSE: char = '\u{E001}';

/// Element names that make up a block emitted by the list and table stages.
const BLOCK_ELEMENTS: &[&str] = &["ul", "ol", "table"];

/// Applies `f` to every stretch of `text` that sits between HTML tags.
///
/// Tags are copied through untouched. Text inside any element named in `skip`
/// (matched case-insensitively) is also copied through untouched.
pub(crate) fn map_text<F>(text: &str, skip: &[&str], mut f: F) -> String
where
    F: FnMut(&str) -> String,
{
    let mut output = String::with_capacity(text.len());
    let mut skip_depth = 0usize;
    let mut last = 0;

    for caps in RE_TAG.captures_iter(text) {
        let (Some(tag), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };

        push_chunk(&mut output, &text[last..tag.start()], skip_depth == 0, &mut f);
        output.push_str(tag.as_str());
        last = tag.end();

        if skip.iter().any(|s| s.eq_ignore_ascii_case(name.as_str())) {
            let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
            if closing {
                skip_depth = skip_depth.saturating_sub(1);
            } else {
                skip_depth += 1;
            }
        }
    }

    push_chunk(&mut output, &text[last..], skip_depth == 0, &mut f);
    output
}

/// Applies `f` to everything outside `<pre>` elements.
///
/// Unlike [`map_text`], inline tags do not split the text, so patterns may
/// span markup such as `[<code>x</code>](url)`.
pub(crate) fn map_outside_pre<F>(text: &str, mut f: F) -> String
where
    F: FnMut(&str) -> String,
{
    let mut output = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = find_pre_open(rest) {
        push_chunk(&mut output, &rest[..start], true, &mut f);
        let end = rest[start..]
            .find("</pre>")
            .map_or(rest.len(), |i| start + i + "</pre>".len());
        output.push_str(&rest[start..end]);
        rest = &rest[end..];
    }

    push_chunk(&mut output, rest, true, &mut f);
    output
}

fn find_pre_open(text: &str) -> Option<usize> {
    match (text.find("<pre>"), text.find("<pre ")) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn push_chunk<F>(output: &mut String, chunk: &str, apply: bool, f: &mut F)
where
    F: FnMut(&str) -> String,
{
    if chunk.is_empty() {
        return;
    }
    if apply {
        output.push_str(&f(chunk));
    } else {
        output.push_str(chunk);
    }
}

/// Applies `f` to `text` with markup replaced by opaque placeholders.
///
/// Every tag becomes a placeholder, so patterns may span inline markup while
/// attributes stay out of reach. An element for which `opaque(name, rest)`
/// returns true is replaced whole, body included; `rest` is the text after its
/// opening tag. A placeholder standing for markup that contains a newline
/// carries one too, so single-line patterns still stop there.
///
/// Returns `None` if `text` already contains placeholder characters.
pub(crate) fn map_across_markup<O, F>(text: &str, opaque: O, f: F) -> Option<String>
where
    O: Fn(&str, &str) -> bool,
    F: FnOnce(&str) -> String,
{
    if text.contains([PLACEHOLDER_OPEN, PLACEHOLDER_CLOSE]) {
        return None;
    }

    let mut masked = String::with_capacity(text.len());
    let mut atoms: Vec<&str> = Vec::new();
    let mut last = 0;
    // Name and nesting depth of the opaque element being skipped.
    let mut skipping: Option<(&str, usize)> = None;
    let mut atom_start = 0;

    for caps in RE_TAG.captures_iter(text) {
        let (Some(tag), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());

        if let Some((open_name, depth)) = skipping {
            if !open_name.eq_ignore_ascii_case(name.as_str()) {
                continue;
            }
            let depth = if closing { depth - 1 } else { depth + 1 };
            if depth == 0 {
                push_placeholder(&mut masked, &mut atoms, &text[atom_start..tag.end()]);
                last = tag.end();
                skipping = None;
            } else {
                skipping = Some((open_name, depth));
            }
            continue;
        }

        masked.push_str(&text[last..tag.start()]);
        if !closing && opaque(name.as_str(), &text[tag.end()..]) {
            skipping = Some((name.as_str(), 1));
            atom_start = tag.start();
        } else {
            push_placeholder(&mut masked, &mut atoms, tag.as_str());
            last = tag.end();
        }
    }

    if skipping.is_some() {
        push_placeholder(&mut masked, &mut atoms, &text[atom_start..]);
    } else {
        masked.push_str(&text[last..]);
    }

    let output = f(&masked);
    Some(
        RE_PLACEHOLDER
            .replace_all(&output, |caps: &regex::Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| atoms.get(i))
                    .map_or_else(|| caps[0].to_string(), |atom| atom.to_string())
            })
            .into_owned(),
    )
}

fn push_placeholder<'a>(masked: &mut String, atoms: &mut Vec<&'a str>, atom: &'a str) {
    masked.push(PLACEHOLDER_OPEN);
    masked.push_str(&atoms.len().to_string());
    if atom.contains('\n') {
        masked.push('\n');
    }
    masked.push(PLACEHOLDER_CLOSE);
    atoms.push(atom);
}

/// Splits text into lines for the line-oriented transformers.
///
/// A trailing newline does not produce an extra empty line, so emitting every
/// line followed by `\n` reproduces the input's line structure.
pub(crate) fn split_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    text.strip_suffix('\n').unwrap_or(text).split('\n').collect()
}

/// Splits off list or table markup glued to the front of a line.
///
/// The list and table stages consume their own line breaks, so the source
/// line that followed a block starts right after the block's closing tag.
/// Returns `(block, rest)`; `block` is empty when there is none.
pub(crate) fn split_block_prefix(line: &str) -> (&str, &str) {
    match leading_block_end(line) {
        Some(end) => line.split_at(end),
        None => ("", line),
    }
}

/// Byte offset where a `<ul>`, `<ol>` or `<table>` block at the very start of
/// `line` ends, found by balancing its opening and closing tags.
fn leading_block_end(line: &str) -> Option<usize> {
    let mut depth = 0usize;

    for caps in RE_TAG.captures_iter(line) {
        let (Some(tag), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        if depth == 0 && tag.start() != 0 {
            return None;
        }
        if !BLOCK_ELEMENTS.iter().any(|b| b.eq_ignore_ascii_case(name.as_str())) {
            continue;
        }

        if caps.get(1).is_some_and(|m| !m.as_str().is_empty()) {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(tag.end());
            }
        } else {
            depth += 1;
        }
    }

    None
}

/// Drops the newline the line loop added after the last line when the input
/// itself did not end with one.
pub(crate) fn match_final_newline(output: &mut String, input: &str) {
    if !input.ends_with('\n') && output.ends_with('\n') {
        output.pop();
    }
}

/// Tracks whether line-oriented transformers are inside a `<pre>` block
/// emitted by the code-block stage.
#[derive(Debug, Default)]
pub(crate) struct PreformattedGuard {
    open: usize,
}

impl PreformattedGuard {
    /// Observes one line and returns true if any part of it belongs to a
    /// preformatted block.
    pub(crate) fn observe(&mut self, line: &str) -> bool {
        let opens = line.matches("<pre>").count() + line.matches("<pre ").count();
        let closes = line.matches("</pre>").count();
        let touched = self.open > 0 || opens > 0;
        self.open = (self.open + opens).saturating_sub(closes);
        touched
    }
}
