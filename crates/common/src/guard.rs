use crate::registry::{CodeRegistry, DirectoryName};

/// A browsing request, split into the directory it targets and the
/// path segments below it. Empty segments are dropped, so
/// `family//040124/` and `family/040124` are the same request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedPath {
    directory: String,
    subpath: Vec<String>,
}

impl RequestedPath {
    pub fn parse(raw: &str) -> Self {
        let mut segments = raw
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string);
        let directory = segments.next().unwrap_or_default();

        Self {
            directory,
            subpath: segments.collect(),
        }
    }

    pub fn directory(&self) -> &str {
        &self.directory
    }

    pub fn subpath(&self) -> &[String] {
        &self.subpath
    }

    /// True when the request names the directory itself
    pub fn is_root(&self) -> bool {
        self.subpath.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    MissingToken,
    UnknownToken,
    DirectoryMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow(DirectoryName),
    Deny(DenyReason),
}

impl Access {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Access::Allow(_))
    }
}

/// Decide whether `token` unlocks the directory named by `path`.
///
/// The registry is the only source of truth: a token is good exactly
/// as long as it maps to the requested directory right now.
pub fn authorize(registry: &CodeRegistry, path: &RequestedPath, token: Option<&str>) -> Access {
    let Some(token) = token else {
        return Access::Deny(DenyReason::MissingToken);
    };

    match registry.resolve_token(token) {
        None => Access::Deny(DenyReason::UnknownToken),
        Some(directory) if *directory == *path.directory() => Access::Allow(directory.clone()),
        Some(_) => Access::Deny(DenyReason::DirectoryMismatch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> CodeRegistry {
        CodeRegistry::from_pairs([("ABC123", "family"), ("XYZ", "friends")]).unwrap()
    }

    #[test]
    fn test_parse_requested_path() {
        let path = RequestedPath::parse("family/040124/scan.pdf");
        assert_eq!(path.directory(), "family");
        assert_eq!(path.subpath(), ["040124", "scan.pdf"]);
        assert!(!path.is_root());

        let root = RequestedPath::parse("family/");
        assert_eq!(root.directory(), "family");
        assert!(root.is_root());

        assert_eq!(
            RequestedPath::parse("//family//040124/"),
            RequestedPath::parse("family/040124")
        );
    }

    #[test]
    fn test_parse_empty() {
        let path = RequestedPath::parse("");
        assert_eq!(path.directory(), "");
        assert!(path.is_root());
    }

    #[test]
    fn test_allows_own_directory_at_any_depth() {
        let registry = registry();
        for raw in ["family", "family/", "family/040124", "family/040124/a.txt"] {
            let access = authorize(&registry, &RequestedPath::parse(raw), Some("ABC123"));
            assert_eq!(
                access,
                Access::Allow(DirectoryName::new("family").unwrap()),
                "{}",
                raw
            );
        }
    }

    #[test]
    fn test_denies_other_directories() {
        let registry = registry();
        for raw in ["friends", "other", "familyx", "Family", "", "040124/family"] {
            let access = authorize(&registry, &RequestedPath::parse(raw), Some("ABC123"));
            assert_eq!(access, Access::Deny(DenyReason::DirectoryMismatch), "{}", raw);
        }
    }

    #[test]
    fn test_denies_missing_token() {
        let access = authorize(&registry(), &RequestedPath::parse("family"), None);
        assert_eq!(access, Access::Deny(DenyReason::MissingToken));
    }

    #[test]
    fn test_denies_unknown_token() {
        let registry = registry();
        for token in ["", "NOPE", "abc123", "family"] {
            let access = authorize(&registry, &RequestedPath::parse("family"), Some(token));
            assert_eq!(access, Access::Deny(DenyReason::UnknownToken), "{}", token);
        }
    }
}
