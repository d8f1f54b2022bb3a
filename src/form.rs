//! `application/x-www-form-urlencoded` decoding, shared by query strings and form bodies.

use alloc::vec::Vec;

use crate::request::Argument;

/// Split `a=1&b=2` pairs, decode them and append to `args` in order of appearance.  `+` is a
/// space, malformed `%` escapes are kept as is and invalid utf8 becomes U+FFFD.  Empty segments
/// are skipped and a segment without `=` becomes a key with an empty value.
pub(crate) fn parse_arguments(encoded: &str, args: &mut Vec<Argument>) {
    args.extend(
        form_urlencoded::parse(encoded.as_bytes()).map(|(k, v)| Argument {
            key: k.into_owned(),
            value: v.into_owned(),
        }),
    );
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::string::{String, ToString};
    use std::vec;

    use super::*;

    // encodeURIComponent: everything except A-Z a-z 0-9 - _ . ! ~ * ' ( ) is escaped
    fn encode_uri_component(value: &str) -> String {
        let mut out = String::new();
        for b in value.bytes() {
            match b {
                b'A'..=b'Z'
                | b'a'..=b'z'
                | b'0'..=b'9'
                | b'-'
                | b'_'
                | b'.'
                | b'!'
                | b'~'
                | b'*'
                | b'\''
                | b'('
                | b')' => out.push(b as char),
                _ => {
                    const HEX: &[u8; 16] = b"0123456789ABCDEF";
                    out.push('%');
                    out.push(HEX[(b >> 4) as usize] as char);
                    out.push(HEX[(b & 0x0f) as usize] as char);
                }
            }
        }
        out
    }

    fn decode(encoded: &str) -> Vec<(String, String)> {
        let mut args = Vec::new();
        parse_arguments(encoded, &mut args);
        args.into_iter().map(|a| (a.key, a.value)).collect()
    }

    fn pair(key: &str, value: &str) -> (String, String) {
        (key.to_string(), value.to_string())
    }

    #[test]
    fn test_decoding() {
        assert_eq!(
            decode("p=a+b%20c&caf%C3%A9=x&path=%2Fpath%2fto"),
            vec![pair("p", "a b c"), pair("café", "x"), pair("path", "/path/to")]
        );
    }

    #[test]
    fn test_malformed_escapes_pass_through() {
        assert_eq!(
            decode("a=100%&b=%zz&c=%4&d=%%41&e=%FF"),
            vec![
                pair("a", "100%"),
                pair("b", "%zz"),
                pair("c", "%4"),
                pair("d", "%A"),
                pair("e", "\u{FFFD}")
            ]
        );
    }

    #[test]
    fn test_percent_encoding_round_trip() {
        for value in [
            "hello world",
            "a&b=c",
            "50% off + tax",
            "snowman ☃ / ünïcödé",
            "line\r\nbreak",
            "",
        ] {
            let query = std::format!("k={}", encode_uri_component(value));
            let mut args = Vec::new();
            parse_arguments(&query, &mut args);
            assert_eq!(args.len(), 1, "{query}");
            assert_eq!(args[0].value, value);
        }
    }

    #[test]
    fn test_parse_arguments_keeps_order_and_duplicates() {
        let mut args = vec![Argument {
            key: "first".to_string(),
            value: "0".to_string(),
        }];
        parse_arguments("k=v1&&k=v2&flag&x=", &mut args);

        let pairs: Vec<(&str, &str)> = args
            .iter()
            .map(|a| (a.key.as_str(), a.value.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("first", "0"),
                ("k", "v1"),
                ("k", "v2"),
                ("flag", ""),
                ("x", "")
            ]
        );
    }
}
