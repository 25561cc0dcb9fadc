use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// A normalized access code.
///
/// Codes are compared case- and whitespace-insensitively, so the
/// only way to build one is through [`AccessCode::normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccessCode(String);

impl AccessCode {
    /// Trim surrounding whitespace and uppercase the code
    pub fn normalize(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AccessCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The top-level directory a code unlocks.
/// Always a single path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DirectoryName(String);

impl DirectoryName {
    pub fn new(name: impl Into<String>) -> Result<Self, RegistryError> {
        let name = name.into();
        let is_segment = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\', '\0']);

        if is_segment {
            Ok(Self(name))
        } else {
            Err(RegistryError::InvalidDirectory(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DirectoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for DirectoryName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// On-disk shape of the codes file: `{ "codes": { "CODE": "directory" } }`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CodesFile {
    #[serde(default)]
    pub codes: BTreeMap<String, String>,
}

/// Immutable mapping from access code to directory.
///
/// Loaded once at startup and shared read-only for the lifetime of
/// the process.
#[derive(Debug, Clone, Default)]
pub struct CodeRegistry {
    codes: HashMap<AccessCode, DirectoryName>,
}

impl CodeRegistry {
    /// Build a registry from raw `(code, directory)` pairs.
    /// Codes are normalized; pairs that collide after normalization are rejected.
    pub fn from_pairs<I, C, D>(pairs: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (C, D)>,
        C: AsRef<str>,
        D: Into<String>,
    {
        let mut codes = HashMap::new();
        for (raw, directory) in pairs {
            let code = AccessCode::normalize(raw.as_ref());
            if code.is_empty() {
                return Err(RegistryError::EmptyCode);
            }
            let directory = DirectoryName::new(directory)?;
            if codes.insert(code.clone(), directory).is_some() {
                return Err(RegistryError::DuplicateCode(code.to_string()));
            }
        }

        Ok(Self { codes })
    }

    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let file: CodesFile = serde_json::from_str(json)?;
        Self::from_pairs(file.codes)
    }

    /// Read and parse the codes file at `path`
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let json = fs::read_to_string(path).map_err(|source| RegistryError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let registry = Self::from_json(&json)?;

        tracing::info!(
            path = %path.display(),
            codes = registry.len(),
            "loaded access code registry"
        );

        Ok(registry)
    }

    /// Look up a code that has already been normalized
    pub fn get(&self, code: &AccessCode) -> Option<&DirectoryName> {
        self.codes.get(code)
    }

    /// Resolve an authorization token.
    ///
    /// Tokens are issued as the normalized code, so the lookup is exact.
    pub fn resolve_token(&self, token: &str) -> Option<&DirectoryName> {
        self.codes.get(&AccessCode(token.to_string()))
    }

    /// Distinct directories reachable through at least one code, sorted
    pub fn directories(&self) -> Vec<&DirectoryName> {
        let mut directories: Vec<_> = self.codes.values().collect();
        directories.sort();
        directories.dedup();
        directories
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to read codes file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid codes file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("access codes must not be empty")]
    EmptyCode,

    #[error("access code {0} is defined more than once")]
    DuplicateCode(String),

    #[error("invalid directory name {0:?}: must be a single path segment")]
    InvalidDirectory(String),
}
