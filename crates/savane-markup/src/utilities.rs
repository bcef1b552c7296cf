//! Text and link helpers shared by the converter.

use url::Url;

/// Characters removed when a line is closed. Unlike `str::trim_end` this
/// leaves newlines alone, so forced line breaks survive.
pub const INLINE_WHITESPACE: [char; 3] = [' ', '\t', '\u{a0}'];

/// Whitespace as HTML defines it: space, tab, line feed, form feed and
/// carriage return. Non-breaking spaces are content.
pub fn is_html_whitespace(c: char) -> bool {
    c.is_ascii_whitespace()
}

/// Collapse every HTML whitespace run to a single space
pub fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_was_whitespace = false;

    for c in s.chars() {
        if is_html_whitespace(c) {
            if !prev_was_whitespace {
                result.push(' ');
                prev_was_whitespace = true;
            }
        } else {
            result.push(c);
            prev_was_whitespace = false;
        }
    }

    result
}

/// Remove trailing spaces, tabs and non-breaking spaces in place
pub fn trim_inline_whitespace_end(s: &mut String) {
    let len = s.trim_end_matches(&INLINE_WHITESPACE[..]).len();
    s.truncate(len);
}

/// Make a link or image target absolute.
///
/// Targets with a scheme and fragment-only targets are returned unchanged.
/// Relative targets are resolved against `base_url` when it is a valid URL,
/// otherwise `base_url` is prepended verbatim.
pub fn absolutize(base_url: &str, target: &str) -> String {
    let target = target.trim();
    if target.is_empty() || target.starts_with('#') || Url::parse(target).is_ok() {
        return target.to_string();
    }

    match Url::parse(base_url).and_then(|base| base.join(target)) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{}{}", base_url, target),
    }
}
