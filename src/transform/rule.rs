//! Horizontal rules.

use regex::Regex;
use std::sync::LazyLock;

use super::{map_outside_pre, split_block_prefix};

static RE_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}(?:-{3,}|\*{3,}|_{3,})[ \t]*$").unwrap());

/// Converts `---`, `***` and `___` lines to `<hr>`.
pub fn convert(input: &str) -> String {
    map_outside_pre(input, |text| {
        text.split('\n').map(convert_line).collect::<Vec<_>>().join("\n")
    })
}

fn convert_line(line: &str) -> String {
    // A list or table emitted by an earlier stage may sit in front of the rule.
    let (block, rest) = split_block_prefix(line);
    if RE_RULE.is_match(rest) {
        format!("{}<hr>", block)
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_variants() {
        assert_eq!(convert("---"), "<hr>");
        assert_eq!(convert("***\n"), "<hr>\n");
        assert_eq!(convert("_____  "), "<hr>");
        assert_eq!(convert("   ---"), "<hr>");
    }

    #[test]
    fn test_rule_between_lines() {
        assert_eq!(convert("above\n---\nbelow"), "above\n<hr>\nbelow");
    }

    #[test]
    fn test_not_a_rule() {
        assert_eq!(convert("--"), "--");
        assert_eq!(convert("-*-"), "-*-");
        assert_eq!(convert("text ---"), "text ---");
        assert_eq!(convert("    ---"), "    ---");
    }

    #[test]
    fn test_rule_after_list() {
        assert_eq!(
            convert("<ul><li>a</li></ul>---\nb"),
            "<ul><li>a</li></ul><hr>\nb"
        );
    }

    #[test]
    fn test_rule_after_list_with_literal_closer() {
        assert_eq!(
            convert("<ul><li>a</li></ul>--- </ul>"),
            "<ul><li>a</li></ul>--- </ul>"
        );
        assert_eq!(
            convert("<table><tbody></tbody></table>***"),
            "<table><tbody></tbody></table><hr>"
        );
    }

    #[test]
    fn test_rule_inside_code_block() {
        let input = "<pre><code class=\"text\">a\n---\nb</code></pre>\n---";
        assert_eq!(
            convert(input),
            "<pre><code class=\"text\">a\n---\nb</code></pre>\n<hr>"
        );
    }
}
