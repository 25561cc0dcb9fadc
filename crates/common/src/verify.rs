use crate::registry::{AccessCode, CodeRegistry, DirectoryName};

/// Message shown for any code that does not unlock a directory.
/// Deliberately says nothing about which codes exist.
pub const INVALID_CODE_MESSAGE: &str = "Invalid code. Please try again.";

/// Path prefix under which unlocked directories are browsed
pub const LETTERS_PREFIX: &str = "/letters";

/// Outcome of checking a submitted code against the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Accepted {
        /// Normalized code, issued back to the client as its token
        token: AccessCode,
        directory: DirectoryName,
    },
    Rejected,
}

impl Verification {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verification::Accepted { .. })
    }

    /// Where the client should go after a successful verification
    pub fn redirect_target(&self) -> Option<String> {
        match self {
            Verification::Accepted { directory, .. } => {
                Some(format!("{}/{}", LETTERS_PREFIX, directory))
            }
            Verification::Rejected => None,
        }
    }
}

/// Check a raw, user-submitted code.
pub fn verify(registry: &CodeRegistry, raw: &str) -> Verification {
    let code = AccessCode::normalize(raw);
    match registry.get(&code) {
        Some(directory) => Verification::Accepted {
            directory: directory.clone(),
            token: code,
        },
        None => Verification::Rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> CodeRegistry {
        CodeRegistry::from_pairs([("ABC123", "family"), ("Q7", "friends")]).unwrap()
    }

    #[test]
    fn test_verify_known_code() {
        let result = verify(&registry(), "ABC123");
        assert!(result.is_valid());
        assert_eq!(result.redirect_target().as_deref(), Some("/letters/family"));
        match result {
            Verification::Accepted { token, directory } => {
                assert_eq!(token.as_str(), "ABC123");
                assert_eq!(directory.as_str(), "family");
            }
            Verification::Rejected => unreachable!(),
        }
    }

    #[test]
    fn test_verify_is_case_and_whitespace_insensitive() {
        let registry = registry();
        for code in ["ABC123", "abc123", "  abc123 ", "\tAbC123\n"] {
            assert_eq!(verify(&registry, code), verify(&registry, "ABC123"));
        }
        assert_eq!(verify(&registry, " q7 "), verify(&registry, "Q7"));
    }

    #[test]
    fn test_verify_unknown_code() {
        let registry = registry();
        for code in ["", "   ", "ABC12", "ABC1234", "family", "A BC123"] {
            let result = verify(&registry, code);
            assert_eq!(result, Verification::Rejected);
            assert!(result.redirect_target().is_none());
        }
    }
}
