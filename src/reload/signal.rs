//! Reload signals sent by the dev server.
//!
//! The wire format is a bare text frame:
//!
//! - `full`: the page must be reloaded (e.g. the client bundle changed)
//! - `reload`: the page markup changed and can be patched in place

use std::fmt;

pub const FULL_TOKEN: &str = "full";
pub const PATCH_TOKEN: &str = "reload";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Full navigation reload
    Full,
    /// Fetch the page again and patch the live document
    Patch,
}

impl Signal {
    /// Parse a wire token. Tokens are matched exactly.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            FULL_TOKEN => Some(Self::Full),
            PATCH_TOKEN => Some(Self::Patch),
            _ => None,
        }
    }

    pub const fn as_token(self) -> &'static str {
        match self {
            Self::Full => FULL_TOKEN,
            Self::Patch => PATCH_TOKEN,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_tokens() {
        assert_eq!(Signal::parse("full"), Some(Signal::Full));
        assert_eq!(Signal::parse("reload"), Some(Signal::Patch));
    }

    #[test]
    fn test_parse_is_exact() {
        assert_eq!(Signal::parse("Full"), None);
        assert_eq!(Signal::parse(" reload"), None);
        assert_eq!(Signal::parse(""), None);
        assert_eq!(Signal::parse(r#"{"type":"reload"}"#), None);
    }

    #[test]
    fn test_token_roundtrip() {
        for signal in [Signal::Full, Signal::Patch] {
            assert_eq!(Signal::parse(signal.as_token()), Some(signal));
        }
    }
}
