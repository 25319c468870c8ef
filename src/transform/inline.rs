//! Headings, emphasis, leftover simple links and line breaks.
//!
//! Runs last: it turns every remaining newline into `<br>`, so nothing
//! line-oriented can follow it.

use regex::Regex;
use std::sync::LazyLock;

use super::{map_across_markup, map_outside_pre, map_text};

// The list, table and quote stages leave their closing tag directly in front
// of the next line, so a heading may follow one of those instead of `^`.
static RE_H1: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(^|</ul>|</ol>|</table>|</blockquote>)#[ \t]+(.*?)[ \t]*$").unwrap()
});

static RE_H2: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(^|</ul>|</ol>|</table>|</blockquote>)##[ \t]+(.*?)[ \t]*$").unwrap()
});

static RE_H3: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(^|</ul>|</ol>|</table>|</blockquote>)###[ \t]+(.*?)[ \t]*$").unwrap()
});

static RE_BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());

static RE_ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_(.*?)_").unwrap());

static RE_SIMPLE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(.*?)\]\((.*?)\)").unwrap());

/// Applies headings, emphasis and simple links, then converts line breaks.
pub fn convert(input: &str) -> String {
    let html = convert_headings(input);
    let html = map_across_markup(&html, is_verbatim, convert_emphasis)
        .unwrap_or_else(|| map_text(&html, &["pre", "code"], convert_emphasis));
    html.replace('\n', "<br>")
}

/// Elements whose bodies emphasis must not reach: code, and links that show
/// their own URL, whose underscores are part of the address.
fn is_verbatim(name: &str, rest: &str) -> bool {
    match name.to_ascii_lowercase().as_str() {
        "pre" | "code" => true,
        "a" => rest.starts_with("http://") || rest.starts_with("https://"),
        _ => false,
    }
}

/// `# t`, `## t`, `### t` → `<h1>`..`<h3>`. Deeper levels are left alone.
pub fn convert_headings(input: &str) -> String {
    map_outside_pre(input, |text| {
        let text = RE_H1.replace_all(text, "${1}<h1>${2}</h1>");
        let text = RE_H2.replace_all(&text, "${1}<h2>${2}</h2>");
        RE_H3.replace_all(&text, "${1}<h3>${2}</h3>").into_owned()
    })
}

fn convert_emphasis(text: &str) -> String {
    let text = RE_BOLD.replace_all(text, "<b>${1}</b>");
    let text = RE_ITALIC.replace_all(&text, "<i>${1}</i>");
    RE_SIMPLE_LINK
        .replace_all(&text, r#"<a href="${2}" target="_blank">${1}</a>"#)
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_headings() {
        assert_eq!(convert_headings("# Title"), "<h1>Title</h1>");
        assert_eq!(convert_headings("## Part"), "<h2>Part</h2>");
        assert_eq!(convert_headings("### Note"), "<h3>Note</h3>");
        assert_eq!(convert_headings("#\tTabbed"), "<h1>Tabbed</h1>");
    }

    #[test]
    fn test_heading_needs_space() {
        assert_eq!(convert_headings("#hashtag"), "#hashtag");
        assert_eq!(convert_headings("#### Four"), "#### Four");
        assert_eq!(convert_headings("text # not"), "text # not");
    }

    #[test]
    fn test_heading_after_block_closer() {
        assert_eq!(
            convert_headings("<ul><li>a</li></ul># Next"),
            "<ul><li>a</li></ul><h1>Next</h1>"
        );
        assert_eq!(
            convert_headings("<ul><li>a</li></ul>\n</ul>## Next"),
            "<ul><li>a</li></ul>\n</ul><h2>Next</h2>"
        );
        assert_eq!(
            convert_headings("</blockquote># Next"),
            "</blockquote><h1>Next</h1>"
        );
    }

    #[test]
    fn test_heading_inside_code_block() {
        let input = "<pre><code class=\"sh\"># comment</code></pre>";
        assert_eq!(convert_headings(input), input);
    }

    #[test]
    fn test_bold_and_italic() {
        assert_eq!(convert("**a** and _b_"), "<b>a</b> and <i>b</i>");
    }

    #[test]
    fn test_unmatched_delimiters_literal() {
        assert_eq!(convert("**open"), "**open");
        assert_eq!(convert("snake_case"), "snake_case");
    }

    #[test]
    fn test_simple_link() {
        assert_eq!(
            convert("[site](https://a.io)"),
            r#"<a href="https://a.io" target="_blank">site</a>"#
        );
    }

    #[test]
    fn test_line_breaks() {
        assert_eq!(convert("a\nb\n"), "a<br>b<br>");
    }

    #[test]
    fn test_attributes_untouched() {
        let input = r#"<img src="/a_b_c.png" alt="x">"#;
        assert_eq!(convert(input), input);
    }

    #[test]
    fn test_code_untouched() {
        let input = "<code>**x** _y_</code> **z**";
        assert_eq!(convert(input), "<code>**x** _y_</code> <b>z</b>");
    }

    #[test]
    fn test_bold_around_inline_code() {
        assert_eq!(
            convert("**run <code>cargo test</code>**"),
            "<b>run <code>cargo test</code></b>"
        );
    }

    #[test]
    fn test_italic_around_link() {
        assert_eq!(
            convert(r#"_read <a href="https://a.io">https://a.io</a> now_"#),
            r#"<i>read <a href="https://a.io">https://a.io</a> now</i>"#
        );
    }

    #[test]
    fn test_bold_link_in_heading() {
        assert_eq!(
            convert(r#"# Title with **bold <a href="b" title="">a</a>**"#),
            r#"<h1>Title with <b>bold <a href="b" title="">a</a></b></h1>"#
        );
    }

    #[test]
    fn test_url_label_keeps_underscores() {
        let input = r#"<a href="https://a.io/x_y_z">https://a.io/x_y_z</a>"#;
        assert_eq!(convert(input), input);
        assert_eq!(
            convert(r#"<a href="/p" title="">x_y_z</a>"#),
            r#"<a href="/p" title="">x<i>y</i>z</a>"#
        );
    }

    #[test]
    fn test_emphasis_does_not_cross_code_block_lines() {
        let input = "_a <pre><code class=\"text\">x\ny</code></pre> b_";
        assert_eq!(
            convert(input),
            "_a <pre><code class=\"text\">x<br>y</code></pre> b_"
        );
    }

    #[test]
    fn test_heading_and_emphasis_document() {
        let result = convert("# Hi\n**bold** and _em_\n");
        assert_eq!(result, "<h1>Hi</h1><br><b>bold</b> and <i>em</i><br>");
    }
}
