use std::borrow::Cow;

use crate::encode::encode_argument;

/// Replace every occurrence of `secret` in `text` with `*` of the same length.
///
/// An empty secret leaves the text untouched.
pub fn redact(text: &str, secret: &str) -> String {
    SecretRedactor::new(Some(secret)).redact(text).into_owned()
}

/// Masks one secret in every line handed to it.
///
/// Both the secret and its encoded command-line form are masked, so an
/// argument line built with [`encode_argument`] never shows it either.
#[derive(Debug, Clone, Default)]
pub struct SecretRedactor {
    /// `(text, mask)` pairs, encoded form first
    patterns: Vec<(String, String)>,
}

fn masked(secret: String) -> (String, String) {
    let mask = "*".repeat(secret.chars().count());
    (secret, mask)
}

impl SecretRedactor {
    /// Create a redactor for `secret`. Empty or absent secrets mask nothing.
    pub fn new(secret: Option<&str>) -> Self {
        let Some(value) = secret.filter(|value| !value.is_empty()) else {
            return Self::default();
        };

        let encoded = encode_argument(value);
        let mut patterns = Vec::with_capacity(2);
        if encoded != value {
            patterns.push(masked(encoded));
        }
        patterns.push(masked(value.to_owned()));
        Self { patterns }
    }

    /// Return `text` with the secret masked.
    pub fn redact<'text>(&self, text: &'text str) -> Cow<'text, str> {
        let mut redacted = Cow::Borrowed(text);
        for (secret, mask) in &self.patterns {
            if redacted.contains(secret.as_str()) {
                redacted = Cow::Owned(redacted.replace(secret.as_str(), mask));
            }
        }
        redacted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_masks_with_equal_length() {
        assert_eq!(
            redact("password=secret123", "secret123"),
            "password=*********"
        );
    }

    #[test]
    fn test_redact_every_occurrence() {
        assert_eq!(redact("pw pw pw", "pw"), "** ** **");
    }

    #[test]
    fn test_empty_secret_is_noop() {
        let text = "sign /p  /t http://ts";
        assert_eq!(redact(text, ""), text);
        assert!(matches!(
            SecretRedactor::new(None).redact(text),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn test_mask_counts_characters() {
        let redactor = SecretRedactor::new(Some("pässwörd"));
        assert_eq!(redactor.redact("/p pässwörd"), "/p ********");
    }

    #[test]
    fn test_encoded_secret_is_masked() {
        let redactor = SecretRedactor::new(Some("Se\"cret"));
        assert_eq!(redactor.redact("sign /p Se\\\"cret a.exe"), "sign /p ******** a.exe");
        assert_eq!(redactor.redact("bad password Se\"cret"), "bad password *******");

        let quoted = SecretRedactor::new(Some("two words"));
        assert_eq!(quoted.redact("/p \"two words\" /t"), "/p *********** /t");
        assert_eq!(quoted.redact("got two words"), "got *********");
    }
}
