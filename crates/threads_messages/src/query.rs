use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::form_urlencoded;

use crate::error::DecodeError;

/// Everything `encodeURIComponent` escapes.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Splits a `location.search` style string into decoded key/value pairs.
///
/// A leading `?` is ignored, pairs without `=` get an empty value and empty
/// segments are skipped. Malformed escapes are kept verbatim.
pub fn parse_query(search: &str) -> Vec<(String, String)> {
    let search = search.strip_prefix('?').unwrap_or(search);
    form_urlencoded::parse(search.as_bytes())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

/// Strict `%XX` decoding; a dangling `%` or invalid UTF-8 is an error.
pub fn percent_decode(input: &str) -> Result<String, DecodeError> {
    if let Some(offset) = malformed_escape(input) {
        return Err(DecodeError::MalformedEscape { offset });
    }
    percent_decode_str(input)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| DecodeError::InvalidUtf8)
}

/// Encodes everything outside the URI-component unreserved set.
pub fn percent_encode(input: &str) -> String {
    utf8_percent_encode(input, URI_COMPONENT).to_string()
}

fn malformed_escape(input: &str) -> Option<usize> {
    let bytes = input.as_bytes();
    bytes.iter().enumerate().find_map(|(idx, byte)| {
        let escape = bytes.get(idx + 1..idx + 3);
        let valid = escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        (*byte == b'%' && !valid).then_some(idx)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_pairs_are_decoded_in_order() {
        let pairs = parse_query("?utm_source=a%20b&flag&utm_term=x+y&=&");
        assert_eq!(
            pairs,
            vec![
                ("utm_source".to_string(), "a b".to_string()),
                ("flag".to_string(), String::new()),
                ("utm_term".to_string(), "x y".to_string()),
                (String::new(), String::new()),
            ]
        );
    }

    #[test]
    fn undecodable_components_are_kept_raw() {
        let pairs = parse_query("bad=%zz");
        assert_eq!(pairs, vec![("bad".to_string(), "%zz".to_string())]);
    }

    #[test]
    fn dangling_percent_is_rejected() {
        assert!(matches!(
            percent_decode("%"),
            Err(DecodeError::MalformedEscape { offset: 0 })
        ));
        assert!(matches!(percent_decode("%ff"), Err(DecodeError::InvalidUtf8)));
    }

    #[test]
    fn escape_after_valid_one_is_checked_too() {
        assert_eq!(percent_decode("a%20b").unwrap(), "a b");
        assert!(matches!(
            percent_decode("a%20%2"),
            Err(DecodeError::MalformedEscape { offset: 4 })
        ));
    }

    #[test]
    fn encode_keeps_unreserved_and_escapes_json() {
        let raw = r#"{"id":"medium","type":"millennial-media"}"#;
        let encoded = percent_encode(raw);
        assert!(!encoded.contains('"'));
        assert!(encoded.contains("millennial-media"));
        assert_eq!(percent_decode(&encoded).unwrap(), raw);
    }
}
