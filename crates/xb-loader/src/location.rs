//! Manifest location handling
//!
//! The archive/directory decision is made once, here, from the location
//! suffix. Everything downstream matches on [`ManifestLocation`].

use std::fmt;
use url::Url;

/// Suffixes that select the archive resolver
pub const ARCHIVE_EXTENSIONS: &[&str] = &[".zip"];

/// Query parameter carrying the manifest location in a page URL
pub const MANIFEST_QUERY_PARAM: &str = "manifest";

/// Where the manifest lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestLocation {
    /// A single archive bundling `manifest.json` and the resources
    Archive(String),
    /// A directory base, always ending in `/`
    Directory(String),
}

impl ManifestLocation {
    /// Classify a raw location. Returns `None` for an empty location.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if is_archive(raw) {
            return Some(Self::Archive(raw.to_string()));
        }

        let mut base = raw.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Some(Self::Directory(base))
    }

    /// Pull the location out of the `manifest` query parameter of a page URL
    pub fn from_page_url(page: &str) -> Option<Self> {
        let url = match Url::parse(page) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Ignoring unparseable page URL {:?}: {}", page, e);
                return None;
            }
        };

        url.query_pairs()
            .find(|(key, _)| key == MANIFEST_QUERY_PARAM)
            .and_then(|(_, value)| Self::parse(&value))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Archive(s) | Self::Directory(s) => s,
        }
    }

    pub fn is_archive(&self) -> bool {
        matches!(self, Self::Archive(_))
    }
}

impl fmt::Display for ManifestLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Archive(s) => write!(f, "archive {}", s),
            Self::Directory(s) => write!(f, "directory {}", s),
        }
    }
}

fn is_archive(location: &str) -> bool {
    let lower = location.to_ascii_lowercase();
    ARCHIVE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}
