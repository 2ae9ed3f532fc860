//! String encoding helpers shared by the canonicalizer and the request builder.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Everything except the RFC 3986 unreserved characters
/// (`A-Z`, `a-z`, `0-9`, `-`, `_`, `.`, `~`).
const STRICT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// [`STRICT_ENCODE_SET`] with `/` left alone, for object keys that keep
/// their path hierarchy.
const PATH_ENCODE_SET: &AsciiSet = &STRICT_ENCODE_SET.remove(b'/');

/// Percent-encode a string using the strict RFC 3986 profile.
///
/// This is `encodeURIComponent` plus `!`, `'`, `(`, `)` and `*`. When
/// `encode_slash` is false, `/` is kept verbatim.
///
/// ```
/// use bce_auth::uri_encode;
///
/// assert_eq!(uri_encode("a b!'()*", true), "a%20b%21%27%28%29%2A");
/// assert_eq!(uri_encode("a/b", false), "a/b");
/// assert_eq!(uri_encode("a/b", true), "a%2Fb");
/// ```
pub fn uri_encode(input: &str, encode_slash: bool) -> String {
    let set = if encode_slash {
        STRICT_ENCODE_SET
    } else {
        PATH_ENCODE_SET
    };
    utf8_percent_encode(input, set).to_string()
}

/// Collapse `.` and `..` segments and empty components of a `/` path.
///
/// Any segment made only of two or more dots pops the previous segment.
/// Popping past the root is clamped, so the result never escapes `/`.
///
/// ```
/// use bce_auth::normalize_path;
///
/// assert_eq!(normalize_path("/a/./b/../c"), "/a/c");
/// assert_eq!(normalize_path("/../a"), "/a");
/// ```
pub fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/').map(str::trim) {
        if segment.len() >= 2 && segment.bytes().all(|b| b == b'.') {
            segments.pop();
        } else if !segment.is_empty() && segment != "." {
            segments.push(segment);
        }
    }

    format!("/{}", segments.join("/"))
}

/// Size of a string in bytes once UTF-8 encoded.
pub fn byte_size(input: &str) -> usize {
    input.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_escapes_reserved_punctuation() {
        assert_eq!(uri_encode("a b!'()*", true), "a%20b%21%27%28%29%2A");
    }

    #[test]
    fn it_keeps_unreserved_characters() {
        assert_eq!(uri_encode("AZaz09-_.~", true), "AZaz09-_.~");
    }

    #[test]
    fn it_controls_slash_encoding() {
        assert_eq!(uri_encode("a/b", false), "a/b");
        assert_eq!(uri_encode("a/b", true), "a%2Fb");
    }

    #[test]
    fn it_encodes_multibyte_characters_as_utf8() {
        assert_eq!(uri_encode("é", true), "%C3%A9");
        assert_eq!(uri_encode("文件/名", false), "%E6%96%87%E4%BB%B6/%E5%90%8D");
    }

    #[test]
    fn it_normalizes_dot_segments() {
        assert_eq!(normalize_path("/a/./b/../c"), "/a/c");
        assert_eq!(normalize_path("/v1/bucket//key"), "/v1/bucket/key");
        assert_eq!(normalize_path("/a/b/.../c"), "/a/c");
    }

    #[test]
    fn it_clamps_leading_parent_segments() {
        assert_eq!(normalize_path("/../a"), "/a");
        assert_eq!(normalize_path("/../../.."), "/");
        assert_eq!(normalize_path(""), "/");
    }

    #[test]
    fn it_trims_segments() {
        assert_eq!(normalize_path("/ a / b /"), "/a/b");
    }

    #[test]
    fn it_measures_utf8_byte_size() {
        assert_eq!(byte_size("abc"), 3);
        assert_eq!(byte_size("文"), 3);
    }
}
