//! Links: inline, reference usage, reference definition and bare URLs.
//!
//! Reference keys are not resolved against definitions. `[label][key]`
//! links straight to `key`, and a definition line renders as a visible anchor
//! instead of disappearing. Existing documents rely on this.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::{map_outside_pre, map_text};

static RE_INLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[([^\]\n]*)\]\(([^)\s]*)(?:\s+"([^"\n]*)")?\s*\)"#).unwrap()
});

static RE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]\n]+)\]\[([^\]\n]*)\]").unwrap());

// The list and table stages leave their closing tag directly in front of the
// next line, so a definition may follow one of those instead of `^`.
static RE_DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)(^|</ul>|</ol>|</table>)\[([^\]\n]+)\]:[ \t]*(\S+)(?:[ \t]+"([^"\n]*)")?[ \t]*$"#,
    )
    .unwrap()
});

static RE_BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"']+"#).unwrap());

/// Punctuation that ends a sentence rather than a URL.
const URL_TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')'];

/// Applies all four link forms in order. `<pre>` bodies are left alone.
pub fn convert(input: &str) -> String {
    let html = map_outside_pre(input, |text| {
        let html = convert_inline(text);
        let html = convert_references(&html);
        convert_definitions(&html)
    });
    convert_bare_urls(&html)
}

/// `[label](target "title")` → `<a href="target" title="title">label</a>`.
pub fn convert_inline(input: &str) -> String {
    RE_INLINE
        .replace_all(input, |caps: &Captures| anchor_with_title(&caps[1], &caps[2], caps.get(3)))
        .into_owned()
}

/// `[label][key]` → `<a href="key">label</a>`. An empty key reuses the label.
pub fn convert_references(input: &str) -> String {
    RE_REFERENCE
        .replace_all(input, |caps: &Captures| {
            let label = &caps[1];
            let key = match caps[2].trim() {
                "" => label,
                key => key,
            };
            format!(r#"<a href="{}">{}</a>"#, key, label)
        })
        .into_owned()
}

/// `[label]: target "title"` lines render directly as anchors.
pub fn convert_definitions(input: &str) -> String {
    RE_DEFINITION
        .replace_all(input, |caps: &Captures| {
            format!("{}{}", &caps[1], anchor_with_title(&caps[2], &caps[3], caps.get(4)))
        })
        .into_owned()
}

/// Wraps `http://` and `https://` tokens that are not already part of a link.
pub fn convert_bare_urls(input: &str) -> String {
    map_text(input, &["a", "pre", "code"], link_urls_in_text)
}

fn link_urls_in_text(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut last = 0;

    for m in RE_BARE_URL.find_iter(text) {
        let quoted = text[..m.start()].ends_with(['"', '\'']);
        let url = m.as_str().trim_end_matches(URL_TRAILING_PUNCTUATION);
        if quoted || url.ends_with("://") {
            continue;
        }

        output.push_str(&text[last..m.start()]);
        output.push_str(&format!(r#"<a href="{}">{}</a>"#, url, url));
        last = m.start() + url.len();
    }

    output.push_str(&text[last..]);
    output
}

fn anchor_with_title(label: &str, target: &str, title: Option<regex::Match<'_>>) -> String {
    format!(
        r#"<a href="{}" title="{}">{}</a>"#,
        target,
        title.map(|t| t.as_str()).unwrap_or(""),
        label
    )
}
