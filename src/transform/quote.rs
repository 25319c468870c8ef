//! Nested blockquotes.
//!
//! A line's depth is the number of leading `>` markers (whitespace between
//! markers is allowed). The transformer opens or closes as many
//! `<blockquote>` tags as the depth changed by since the previous line, and
//! closes everything still open at the end of input. Line breaks are kept as
//! they were.

use super::{match_final_newline, split_block_prefix, split_lines, PreformattedGuard};

const OPEN: &str = "<blockquote>";
const CLOSE: &str = "</blockquote>";

/// Converts `>`-prefixed lines to nested `<blockquote>` elements.
pub fn convert(input: &str) -> String {
    let mut output = String::with_capacity(input.len() + 32);
    let mut depth = 0usize;
    let mut guard = PreformattedGuard::default();

    for line in split_lines(input) {
        if guard.observe(line) {
            output.push_str(line);
            output.push('\n');
            continue;
        }

        // A list or table ends any quote that was open before it.
        let (block_html, rest) = split_block_prefix(line);
        if !block_html.is_empty() {
            output.push_str(&CLOSE.repeat(depth));
            depth = 0;
            output.push_str(block_html);
        }

        let (level, content) = quote_level(rest);

        if level > depth {
            output.push_str(&OPEN.repeat(level - depth));
        } else if level < depth {
            output.push_str(&CLOSE.repeat(depth - level));
        }
        depth = level;

        output.push_str(content);
        output.push('\n');
    }

    match_final_newline(&mut output, input);
    output.push_str(&CLOSE.repeat(depth));
    output
}

/// Returns the marker count and the trimmed content after the markers.
/// Lines without markers are returned unchanged.
pub fn quote_level(line: &str) -> (usize, &str) {
    let mut level = 0;
    let mut rest = line.trim_start();

    while let Some(after) = rest.strip_prefix('>') {
        level += 1;
        rest = after.trim_start();
    }

    if level == 0 {
        (0, line)
    } else {
        (level, rest.trim_end())
    }
}
