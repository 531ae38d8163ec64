//! Shell manifest and cache generation naming

use std::fmt;

/// Every cache generation name starts with this
pub const CACHE_NAME_PREFIX: &str = "las-validator-";

/// Served to navigation requests when the network is gone
pub const ROOT_DOCUMENT: &str = "/";

/// Resources populated at install time
pub const PRECACHE_MANIFEST: [&str; 4] = [
    ROOT_DOCUMENT,
    "/static/manifest.json",
    "/static/css/styles.css",
    "/static/assets/favicon.ico",
];

/// One cache generation, named after the shell version it holds
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheVersion {
    name: String,
}

impl CacheVersion {
    /// `las-validator-{version}`
    pub fn for_version(version: &str) -> Self {
        Self {
            name: format!("{}{}", CACHE_NAME_PREFIX, version),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matches(&self, cache_name: &str) -> bool {
        self.name == cache_name
    }
}

impl fmt::Display for CacheVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_name_template() {
        let version = CacheVersion::for_version("v2");
        assert_eq!(version.name(), "las-validator-v2");
        assert!(version.matches("las-validator-v2"));
        assert!(!version.matches("las-validator-v1"));
    }

    #[test]
    fn test_manifest_starts_with_root() {
        assert_eq!(PRECACHE_MANIFEST[0], ROOT_DOCUMENT);
        assert_eq!(PRECACHE_MANIFEST.len(), 4);
    }
}
