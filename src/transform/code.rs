//! Fenced code blocks and inline code spans.
//!
//! Highlighting is cosmetic: a handful of patterns wrap keywords and call
//! sites in `<span class="code-*">` so the preview stylesheet can color them.
//! It is not a tokenizer, and matches inside string literals are expected.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::map_text;

/// Language label used when a fence has no tag.
pub const DEFAULT_LANGUAGE: &str = "text";

static RE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```([^\s`]*)[ \t]*\n(.*?)```").unwrap());

static RE_INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`\n]+)`").unwrap());

static RE_FUNC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(function)\s+([a-zA-Z_$][\w$]*)\b").unwrap());

static RE_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(class)\s+([a-zA-Z_$][\w$]*)\b").unwrap());

static RE_METHOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-zA-Z_$][\w$]*)\s*\(").unwrap());

static RE_CONSOLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(console)\b").unwrap());

/// Converts fenced code blocks to `<pre><code class="lang">`.
///
/// Unterminated fences are left as literal text.
pub fn convert_blocks(input: &str) -> String {
    RE_FENCE
        .replace_all(input, |caps: &Captures| {
            let lang = match caps[1].trim() {
                "" => DEFAULT_LANGUAGE,
                lang => lang,
            };
            let body = highlight(&html_escape::encode_text(&caps[2]));
            format!(r#"<pre><code class="{}">{}</code></pre>"#, lang, body.trim())
        })
        .into_owned()
}

/// Wraps keywords and call sites in styling spans.
pub fn highlight(code: &str) -> String {
    let code = RE_FUNC.replace_all(
        code,
        r#"<span class="code-func">${1}</span> <span class="code-func">${2}</span>"#,
    );
    let code = RE_CLASS.replace_all(
        &code,
        r#"<span class="code-class">${1}</span> <span class="code-class">${2}</span>"#,
    );
    let code = RE_METHOD.replace_all(&code, r#"<span class="code-method">${1}</span>("#);
    RE_CONSOLE
        .replace_all(&code, r#"<span class="code-console">${1}</span>"#)
        .into_owned()
}

/// Converts `` `code` `` spans to `<code>`. Never touches `<pre>` bodies.
pub fn convert_inline(input: &str) -> String {
    map_text(input, &["pre"], |text| {
        RE_INLINE_CODE
            .replace_all(text, |caps: &Captures| {
                format!("<code>{}</code>", html_escape::encode_text(&caps[1]))
            })
            .into_owned()
    })
}
