//! Property-based tests for the rendering pipeline.
//!
//! These check structural guarantees over generated documents: rendering is
//! total and deterministic, nested constructs produce balanced markup, and
//! list indentation never nests more than one level per line.

use mdhtml::transform::{list, quote};
use mdhtml::{render, try_render, RenderOptions};
use proptest::prelude::*;

/// Markdown-flavored noise: mostly the characters the transformers react to.
fn markdown_noise_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("**"),
            Just("_"),
            Just("`"),
            Just("```"),
            Just("|"),
            Just(">"),
            Just("# "),
            Just("- "),
            Just("1. "),
            Just("    "),
            Just("["),
            Just("]"),
            Just("("),
            Just(")"),
            Just("!"),
            Just("---"),
            Just("http://x.io"),
            Just("<pre>"),
            Just("</pre>"),
            Just("\n"),
            Just("word"),
            Just(" "),
        ],
        0..60,
    )
    .prop_map(|parts| parts.concat())
}

/// Depth sequences where each item is at most one level deeper than the last.
fn list_depths_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0usize..4, 1..20).prop_map(|moves| {
        let mut depths = Vec::with_capacity(moves.len());
        let mut current = 0usize;
        for (i, step) in moves.into_iter().enumerate() {
            if i > 0 {
                current = if step == 0 {
                    current + 1
                } else {
                    current.saturating_sub(step - 1)
                };
            }
            depths.push(current);
        }
        depths
    })
}

/// Returns (maximum nesting, final nesting, went negative) for a tag pair.
fn nesting(html: &str, open: &str, close: &str) -> (usize, i64, bool) {
    let mut depth = 0i64;
    let mut max = 0i64;
    let mut negative = false;
    let mut rest = html;

    while let Some(pos) = rest.find('<') {
        rest = &rest[pos..];
        if rest.starts_with(open) {
            depth += 1;
            max = max.max(depth);
            rest = &rest[open.len()..];
        } else if rest.starts_with(close) {
            depth -= 1;
            negative |= depth < 0;
            rest = &rest[close.len()..];
        } else {
            rest = &rest[1..];
        }
    }

    (max as usize, depth, negative)
}

proptest! {
    #[test]
    fn test_render_is_deterministic(input in markdown_noise_strategy()) {
        prop_assert_eq!(render(&input), render(&input));
    }

    #[test]
    fn test_render_total_on_arbitrary_text(input in "\\PC{0,200}") {
        let _html = render(&input);
        prop_assert!(try_render(&input, &RenderOptions::strict()).is_ok());
    }

    #[test]
    fn test_strict_render_never_faults(input in markdown_noise_strategy()) {
        let strict = try_render(&input, &RenderOptions::strict());
        prop_assert!(strict.is_ok());
        prop_assert_eq!(strict.unwrap(), render(&input));
    }

    #[test]
    fn test_heading_levels(level in 1usize..=3, text in "[a-z]{1,12}") {
        let input = format!("{} {}", "#".repeat(level), text);
        let html = render(&input);
        let open = format!("<h{}>", level);
        let expected = format!("<h{}>{}</h{}>", level, text, level);
        prop_assert_eq!(html.matches(&open).count(), 1);
        prop_assert!(html.contains(&expected));
    }

    #[test]
    fn test_nested_list_depth(depths in list_depths_strategy()) {
        let input: String = depths
            .iter()
            .map(|d| format!("{}- item\n", "    ".repeat(*d)))
            .collect();
        let html = list::convert(&input).unwrap();

        let (max, end, negative) = nesting(&html, "<ul>", "</ul>");
        prop_assert_eq!(max, depths.iter().max().copied().unwrap_or(0) + 1);
        prop_assert_eq!(end, 0);
        prop_assert!(!negative);

        let (_, li_end, li_negative) = nesting(&html, "<li>", "</li>");
        prop_assert_eq!(li_end, 0);
        prop_assert!(!li_negative);
    }

    #[test]
    fn test_list_indent_clamped(indents in prop::collection::vec(0usize..40, 1..20)) {
        let lines: Vec<String> = indents.iter().map(|n| format!("{}- x", " ".repeat(*n))).collect();

        let mut previous = None;
        for line in &lines {
            let item = list::parse_item(line, previous).unwrap();
            if let Some(prev) = previous {
                prop_assert!(item.depth <= prev + 1);
            } else {
                prop_assert_eq!(item.depth, 0);
            }
            previous = Some(item.depth);
        }

        let html = list::convert(&lines.join("\n")).unwrap();
        let (max, end, negative) = nesting(&html, "<ul>", "</ul>");
        prop_assert!(max <= lines.len());
        prop_assert_eq!(end, 0);
        prop_assert!(!negative);
    }

    #[test]
    fn test_blockquotes_balanced(levels in prop::collection::vec(0usize..5, 0..20)) {
        let input: String = levels
            .iter()
            .map(|n| format!("{} text\n", ">".repeat(*n)))
            .collect();
        let html = quote::convert(&input);

        let (max, end, negative) = nesting(&html, "<blockquote>", "</blockquote>");
        prop_assert_eq!(max, levels.iter().max().copied().unwrap_or(0));
        prop_assert_eq!(end, 0);
        prop_assert!(!negative);
    }

    #[test]
    fn test_quote_level_counts_markers(n in 0usize..8, text in "[a-z]{1,8}") {
        let line = format!("{} {}", ">".repeat(n), text);
        let (level, content) = quote::quote_level(&line);
        prop_assert_eq!(level, n);
        if n > 0 {
            prop_assert_eq!(content, text.as_str());
        }
    }
}
