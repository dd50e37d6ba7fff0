//! 4-space re-indent of a JSON reply.
//!
//! Only whitespace between tokens changes. Strings (escapes included),
//! numbers and literals are copied byte for byte, and duplicate keys stay.
//! The whole document is validated by serde_json before any output is
//! returned.

use serde::Deserialize;
use serde::de::IgnoredAny;
use thiserror::Error;

const INDENT: &[u8] = b"    ";

/// Deepest nesting accepted; Go's encoding/json scanner stops at the same depth.
pub const MAX_DEPTH: usize = 10_000;

#[derive(Debug, Error)]
pub enum JsonError {
    #[error("nesting deeper than {} levels", MAX_DEPTH)]
    TooDeep,

    #[error(transparent)]
    Syntax(#[from] serde_json::Error),
}

/// Re-render `body` with 4-space indentation and no trailing newline.
pub fn format_json(body: &[u8]) -> Result<Vec<u8>, JsonError> {
    check_depth(body)?;
    validate(body)?;
    Ok(reindent(body))
}

fn check_depth(body: &[u8]) -> Result<(), JsonError> {
    let mut depth = 0usize;
    let mut i = 0;
    while i < body.len() {
        match body[i] {
            b'"' => {
                i = string_end(body, i);
                continue;
            }
            b'{' | b'[' => {
                depth += 1;
                if depth > MAX_DEPTH {
                    return Err(JsonError::TooDeep);
                }
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
        i += 1;
    }
    Ok(())
}

/// Whitespace rewrite of an already validated document.
fn reindent(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() * 2);
    let mut depth = 0usize;
    // set after `{` or `[`; cleared by the first value or an immediate close
    let mut open = false;
    let mut i = 0;

    while i < body.len() {
        let c = body[i];
        match c {
            b' ' | b'\t' | b'\n' | b'\r' => {}
            b'"' => {
                if open {
                    newline(&mut out, depth);
                    open = false;
                }
                let end = string_end(body, i);
                out.extend_from_slice(&body[i..end]);
                i = end;
                continue;
            }
            b'{' | b'[' => {
                if open {
                    newline(&mut out, depth);
                }
                out.push(c);
                depth += 1;
                open = true;
            }
            b'}' | b']' => {
                depth = depth.saturating_sub(1);
                if open {
                    open = false;
                } else {
                    newline(&mut out, depth);
                }
                out.push(c);
            }
            b',' => {
                out.push(c);
                newline(&mut out, depth);
            }
            b':' => out.extend_from_slice(b": "),
            _ => {
                if open {
                    newline(&mut out, depth);
                    open = false;
                }
                out.push(c);
            }
        }
        i += 1;
    }
    out
}

/// Index just past the closing quote of the string starting at `start`,
/// or the end of input when it is unterminated.
fn string_end(body: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    while i < body.len() {
        match body[i] {
            b'\\' => i += 2,
            b'"' => return i + 1,
            _ => i += 1,
        }
    }
    body.len()
}

fn newline(out: &mut Vec<u8>, depth: usize) {
    out.push(b'\n');
    for _ in 0..depth {
        out.extend_from_slice(INDENT);
    }
}

/// Exactly one JSON value, surrounded by optional whitespace.
fn validate(body: &[u8]) -> Result<(), serde_json::Error> {
    let mut de = serde_json::Deserializer::from_slice(body);
    de.disable_recursion_limit();
    IgnoredAny::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pretty(body: &str) -> String {
        String::from_utf8(format_json(body.as_bytes()).unwrap()).unwrap()
    }

    #[test]
    fn nested_document() {
        let expected = "{\n    \"a\": 1,\n    \"b\": [\n        2,\n        3\n    ]\n}";
        assert_eq!(pretty(r#"{"a":1,"b":[2,3]}"#), expected);
    }

    #[test]
    fn key_order_and_number_text_kept() {
        let out = pretty(r#"{"z":1.50,"a":18446744073709551616,"m":-0,"e":1E+02}"#);
        assert_eq!(
            out,
            "{\n    \"z\": 1.50,\n    \"a\": 18446744073709551616,\n    \"m\": -0,\n    \"e\": 1E+02\n}"
        );
    }

    #[test]
    fn string_escapes_kept() {
        let out = pretty(r#"{"sql":"a \u003c b \u0026\u0026 c","p":"x\/y","q":"say \"hi\"\\"}"#);
        assert_eq!(
            out,
            "{\n    \"sql\": \"a \\u003c b \\u0026\\u0026 c\",\n    \"p\": \"x\\/y\",\n    \"q\": \"say \\\"hi\\\"\\\\\"\n}"
        );
    }

    #[test]
    fn whitespace_inside_strings_kept() {
        assert_eq!(pretty(r#"{ "k" : "a , b : [c]" }"#), "{\n    \"k\": \"a , b : [c]\"\n}");
    }

    #[test]
    fn duplicate_keys_kept() {
        assert_eq!(pretty(r#"{"a":1,"a":2}"#), "{\n    \"a\": 1,\n    \"a\": 2\n}");
    }

    #[test]
    fn scalars_and_empty_containers() {
        assert_eq!(pretty("  true \n"), "true");
        assert_eq!(pretty("{}"), "{}");
        assert_eq!(pretty("[ ]"), "[]");
        assert_eq!(pretty(r#""x""#), "\"x\"");
        assert_eq!(
            pretty(r#"{"a":[],"b":{}}"#),
            "{\n    \"a\": [],\n    \"b\": {}\n}"
        );
    }

    #[test]
    fn already_indented_input_is_stable() {
        let once = pretty(r#"{"regions":[{"id":2,"peers":[1,2,3]}],"count":1}"#);
        assert_eq!(pretty(&once), once);
    }

    #[test]
    fn deep_nesting_accepted() {
        let body = format!("{}{}", "[".repeat(200), "]".repeat(200));
        let out = pretty(&body);
        assert_eq!(out.lines().count(), 399);
        assert!(out.starts_with("[\n    [\n        ["));
        assert!(out.ends_with("\n    ]\n]"));
    }

    #[test]
    fn nesting_beyond_limit_rejected() {
        let depth = MAX_DEPTH + 1;
        let body = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
        assert!(matches!(format_json(body.as_bytes()), Err(JsonError::TooDeep)));
    }

    #[test]
    fn malformed_rejected() {
        for body in [
            &br#"{"a":1"#[..],
            &b"region not found"[..],
            &b""[..],
            &br#"{"a":1} trailing"#[..],
            &b"[1 2]"[..],
            &br#"{"a" 1}"#[..],
            &br#""unterminated"#[..],
            &b"[1,]"[..],
        ] {
            assert!(
                matches!(format_json(body), Err(JsonError::Syntax(_))),
                "{:?}",
                String::from_utf8_lossy(body)
            );
        }
    }
}
