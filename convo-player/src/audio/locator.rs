//! Audio resource addressing
//!
//! Line file names resolve against one fixed asset base. Interactive players
//! and the exporter share this rule so both always address the same file.

/// Resolves line file names to fetchable URLs or paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioLocator {
    base: String,
}

impl AudioLocator {
    /// `base` is an http(s) URL prefix or a directory path
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Join the base and a file name with exactly one `/`
    pub fn resolve(&self, filename: &str) -> String {
        let base = self.base.trim_end_matches('/');
        let name = filename.trim_start_matches('/');
        if base.is_empty() {
            return format!("/{}", name);
        }
        format!("{}/{}", base, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_joins_with_single_slash() {
        let locator = AudioLocator::new("/deadlock-conversations/audioFiles/");
        assert_eq!(
            locator.resolve("inferno_01.mp3"),
            "/deadlock-conversations/audioFiles/inferno_01.mp3"
        );
        assert_eq!(
            locator.resolve("/inferno_01.mp3"),
            "/deadlock-conversations/audioFiles/inferno_01.mp3"
        );
    }

    #[test]
    fn test_resolve_url_base() {
        let locator = AudioLocator::new("https://cdn.example.org/audioFiles");
        assert_eq!(
            locator.resolve("a.mp3"),
            "https://cdn.example.org/audioFiles/a.mp3"
        );
    }

    #[test]
    fn test_resolve_empty_base_is_root() {
        assert_eq!(AudioLocator::new("").resolve("a.mp3"), "/a.mp3");
    }
}
