//! Images.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::map_outside_pre;

static RE_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"!\[([^\]\n]*)\]\(([^)\s]*)(?:\s+"([^"\n]*)")?\s*\)"#).unwrap()
});

/// Converts `![alt](src "title")` to `<img>` outside code blocks.
pub fn convert(input: &str) -> String {
    map_outside_pre(input, |text| {
        RE_IMAGE
            .replace_all(text, |caps: &Captures| match caps.get(3) {
                Some(title) => format!(
                    r#"<img src="{}" alt="{}" title="{}">"#,
                    &caps[2],
                    &caps[1],
                    title.as_str()
                ),
                None => format!(r#"<img src="{}" alt="{}">"#, &caps[2], &caps[1]),
            })
            .into_owned()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image() {
        assert_eq!(
            convert("![cat](/img/cat.png)"),
            r#"<img src="/img/cat.png" alt="cat">"#
        );
    }

    #[test]
    fn test_image_with_title() {
        assert_eq!(
            convert(r#"see ![cat](cat.png "A cat") here"#),
            r#"see <img src="cat.png" alt="cat" title="A cat"> here"#
        );
    }

    #[test]
    fn test_empty_alt() {
        assert_eq!(convert("![](x.png)"), r#"<img src="x.png" alt="">"#);
    }

    #[test]
    fn test_code_block_untouched() {
        let input = r#"<pre><code class="md">![a](b.png)</code></pre>"#;
        assert_eq!(convert(input), input);
    }

    #[test]
    fn test_plain_link_untouched() {
        assert_eq!(convert("[cat](cat.png)"), "[cat](cat.png)");
    }
}
