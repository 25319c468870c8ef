//! Input normalization applied before the first transformer.
//!
//! Editors hand us whatever the clipboard produced: CRLF line endings, a BOM,
//! decomposed Hangul. Every transformer assumes `\n` line endings.

use unicode_normalization::UnicodeNormalization;

/// Normalizes raw editor text.
///
/// - `\r\n` and lone `\r` become `\n`
/// - Unicode NFC normalization
/// - BOM and NUL removal
pub fn normalize_input(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.nfc().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                result.push('\n');
            }
            '\u{FEFF}' | '\0' => {}
            _ => result.push(c),
        }
    }

    result
}
