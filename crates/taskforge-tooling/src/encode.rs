//! Quoting for command lines parsed by the C runtime.
//!
//! The signing tool reads its arguments with the standard C runtime parser,
//! so a value has to be escaped such that backslash runs before a quote and
//! whitespace survive the round trip exactly.

use regex::Regex;
use std::iter::repeat_n;
use std::mem;
use std::sync::LazyLock;

/// A run of backslashes followed by a double quote.
static EMBEDDED_QUOTE: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r#"(\\*)""#) {
    Ok(regex) => regex,
    Err(err) => panic!("Embedded quote regex is invalid: {err}"),
});

/// A value containing whitespace, split from its trailing backslashes.
static NEEDS_QUOTING: LazyLock<Regex> =
    LazyLock::new(|| match Regex::new(r"(?s)^(.*\s.*?)(\\*)$") {
        Ok(regex) => regex,
        Err(err) => panic!("Whitespace regex is invalid: {err}"),
    });

/// Encode `raw` so it is received as exactly one argument.
///
/// Every `n` backslashes followed by a quote become `2n + 1` backslashes and
/// the quote. Values containing whitespace are wrapped in quotes, doubling any
/// trailing backslashes so they do not escape the closing quote. Anything else
/// passes through unchanged.
pub fn encode_argument(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let escaped = EMBEDDED_QUOTE.replace_all(raw, r"${1}\${0}");
    NEEDS_QUOTING
        .replace(&escaped, r#""${1}${2}${2}""#)
        .into_owned()
}

/// Split a command line into arguments the way the C runtime does.
///
/// Spaces and tabs separate arguments outside quotes. `2n` backslashes before
/// a quote produce `n` backslashes and toggle quoting, `2n + 1` produce `n`
/// backslashes and a literal quote. Other backslashes are literal.
pub fn split_command_line(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(character) = chars.next() {
        match character {
            '\\' => {
                let mut count = 1;
                while chars.next_if_eq(&'\\').is_some() {
                    count += 1;
                }
                in_arg = true;
                if chars.peek() == Some(&'"') {
                    current.extend(repeat_n('\\', count / 2));
                    if count % 2 == 1 {
                        chars.next();
                        current.push('"');
                    }
                } else {
                    current.extend(repeat_n('\\', count));
                }
            }
            '"' => {
                in_arg = true;
                quoted = !quoted;
            }
            ' ' | '\t' if !quoted => {
                if in_arg {
                    args.push(mem::take(&mut current));
                    in_arg = false;
                }
            }
            other => {
                in_arg = true;
                current.push(other);
            }
        }
    }

    if in_arg {
        args.push(current);
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_values_pass_through() {
        for value in ["sign", "/sha1", "C:\\tools\\app.exe", "http://ts.example.com", "a\\b\\"] {
            assert_eq!(encode_argument(value), value);
        }
    }

    #[test]
    fn test_empty_value_is_unchanged() {
        assert_eq!(encode_argument(""), "");
    }

    #[test]
    fn test_embedded_quote_is_escaped() {
        assert_eq!(encode_argument("a\"b"), "a\\\"b");
        assert_eq!(encode_argument("a\\\"b"), "a\\\\\\\"b");
    }

    #[test]
    fn test_whitespace_is_quoted() {
        assert_eq!(encode_argument("My App"), "\"My App\"");
        assert_eq!(encode_argument("tab\there"), "\"tab\there\"");
    }

    #[test]
    fn test_trailing_backslashes_are_doubled_inside_quotes() {
        assert_eq!(encode_argument("C:\\My Dir\\"), "\"C:\\My Dir\\\\\"");
        assert_eq!(encode_argument("C:\\My Dir\\\\"), "\"C:\\My Dir\\\\\\\\\"");
    }

    #[test]
    fn test_quote_and_whitespace() {
        assert_eq!(encode_argument("say \"hi\""), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn test_encoded_values_split_back_to_original() {
        let values = [
            "plain",
            "with space",
            "C:\\Program Files\\Kit\\",
            "trailing\\\\",
            "quote\"inside",
            "both \"quoted\\\" and spaced\\",
            "  leading and trailing  ",
            "back\\\\\"slash",
        ];
        for value in values {
            let encoded = encode_argument(value);
            assert_eq!(split_command_line(&encoded), vec![value], "{encoded}");
        }
    }

    #[test]
    fn test_split_command_line() {
        assert_eq!(
            split_command_line("sign /f \"C:\\cert dir\\a.pfx\" /p s3cret  x.exe"),
            vec!["sign", "/f", "C:\\cert dir\\a.pfx", "/p", "s3cret", "x.exe"]
        );
        assert_eq!(split_command_line("a \"\" b"), vec!["a", "", "b"]);
        assert!(split_command_line("   ").is_empty());
    }
}
