//! Strip transport framing from a presented credential.
//!
//! The gateway hands us whatever the client put in its authorization field.
//! That may be empty, padded with whitespace, or carry a `Bearer` scheme
//! prefix in any casing. [`normalize`] reduces it to the opaque token used
//! as the store key.

use std::fmt;

const SCHEME: &str = "bearer";

/// A credential with scheme prefix and surrounding whitespace removed.
///
/// The empty value means "no credential supplied". `Debug` never prints the
/// token and there is deliberately no `Display`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct NormalizedToken(String);

impl NormalizedToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for NormalizedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("NormalizedToken(<empty>)")
        } else {
            f.write_str("NormalizedToken(<redacted>)")
        }
    }
}

/// Normalize a raw credential into a store lookup key.
///
/// Trims whitespace, then removes a single leading `bearer` literal
/// (case-insensitive) when it is followed by whitespace or the end of the
/// value, then trims again. The prefix is stripped at most once, so
/// `"Bearer bearer x"` yields `"bearer x"`.
pub fn normalize(raw: &str) -> NormalizedToken {
    let trimmed = raw.trim();

    let stripped = match trimmed.get(..SCHEME.len()) {
        Some(head) if head.eq_ignore_ascii_case(SCHEME) => {
            let rest = &trimmed[SCHEME.len()..];
            match rest.chars().next() {
                None => rest,
                Some(c) if c.is_whitespace() => rest.trim(),
                Some(_) => trimmed,
            }
        }
        _ => trimmed,
    };

    NormalizedToken(stripped.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(normalize("").as_str(), "");
        assert_eq!(normalize("   ").as_str(), "");
        assert!(normalize("\t\n ").is_empty());
    }

    #[test]
    fn test_scheme_prefix_stripped() {
        assert_eq!(normalize("Bearer abc").as_str(), "abc");
        assert_eq!(normalize("bearer   abc").as_str(), "abc");
        assert_eq!(normalize("BEARER abc").as_str(), "abc");
        assert_eq!(normalize("  Bearer abc  ").as_str(), "abc");
        assert_eq!(normalize("Bearer\tabc").as_str(), "abc");
    }

    #[test]
    fn test_no_boundary_not_stripped() {
        assert_eq!(normalize("BEARERabc").as_str(), "BEARERabc");
        assert_eq!(normalize("bearer_token_1").as_str(), "bearer_token_1");
    }

    #[test]
    fn test_bare_scheme_is_empty() {
        assert_eq!(normalize("Bearer").as_str(), "");
        assert_eq!(normalize("  bearer   ").as_str(), "");
    }

    #[test]
    fn test_prefix_stripped_only_once() {
        assert_eq!(normalize("Bearer bearer abc").as_str(), "bearer abc");
        assert_eq!(normalize("bearer Bearer").as_str(), "Bearer");
    }

    #[test]
    fn test_plain_token_preserved() {
        assert_eq!(normalize("abc123").as_str(), "abc123");
        assert_eq!(normalize(" tok en ").as_str(), "tok en");
    }

    #[test]
    fn test_multibyte_input_does_not_panic() {
        assert_eq!(normalize("béarer x").as_str(), "béarer x");
        assert_eq!(normalize("トークン").as_str(), "トークン");
    }

    #[test]
    fn test_debug_is_redacted() {
        let token = normalize("Bearer super-secret");
        let rendered = format!("{:?}", token);
        assert!(!rendered.contains("super-secret"));
        assert_eq!(rendered, "NormalizedToken(<redacted>)");
        assert_eq!(format!("{:?}", normalize("")), "NormalizedToken(<empty>)");
    }
}
