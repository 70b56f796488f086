//! Providers - where a core's sources come from when they are not local.

use std::path::{Path, PathBuf};
use std::time::Duration;

use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;

use crate::sources::git::GitProvider;
use crate::sources::tarball::UrlProvider;

/// Error while fetching a core's sources.
#[derive(Debug, Error, Diagnostic)]
pub enum FetchError {
    #[error("cannot fetch {url} in offline mode")]
    #[diagnostic(
        code(socstage::fetch::offline),
        help("Disable `net.offline` or fetch the core once while online")
    )]
    Offline { url: String },

    #[error("failed to download {url}")]
    #[diagnostic(
        code(socstage::fetch::network),
        help("Check your network connection and try again")
    )]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to download {url}: HTTP {status}")]
    #[diagnostic(code(socstage::fetch::http))]
    Http { url: String, status: u16 },

    #[error("checksum mismatch for {url}: expected {expected}, found {actual}")]
    #[diagnostic(code(socstage::fetch::checksum))]
    Checksum {
        url: String,
        expected: String,
        actual: String,
    },

    #[error("git operation failed for {url}")]
    #[diagnostic(code(socstage::fetch::git))]
    Git {
        url: String,
        #[source]
        source: git2::Error,
    },

    #[error("failed to unpack archive from {url}")]
    #[diagnostic(code(socstage::fetch::extract))]
    Extract {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error at {}", .path.display())]
    #[diagnostic(code(socstage::fetch::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Settings shared by all providers.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Refuse any network access
    pub offline: bool,

    /// Timeout for HTTP downloads
    pub timeout: Option<Duration>,
}

/// A remote location for a core's sources.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Provider {
    Git(GitProvider),
    Url(UrlProvider),
}

impl Provider {
    /// Location shown in logs and errors.
    pub fn location(&self) -> &str {
        match self {
            Provider::Git(git) => git.repo.as_str(),
            Provider::Url(url) => url.url.as_str(),
        }
    }

    /// Fetch into `dest`, which must not exist yet.
    ///
    /// The sources are first placed in a sibling temporary directory and
    /// renamed into place, so an interrupted fetch never leaves a
    /// half-populated `dest` behind.
    pub fn fetch(&self, dest: &Path, opts: &FetchOptions) -> Result<(), FetchError> {
        if opts.offline {
            return Err(FetchError::Offline {
                url: self.location().to_string(),
            });
        }

        let parent = dest.parent().unwrap_or(Path::new("."));
        std::fs::create_dir_all(parent).map_err(|source| FetchError::Io {
            path: parent.to_path_buf(),
            source,
        })?;

        let staging = tempfile::Builder::new()
            .prefix(".fetch-")
            .tempdir_in(parent)
            .map_err(|source| FetchError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        let checkout = staging.path().join("checkout");

        match self {
            Provider::Git(git) => git.fetch(&checkout)?,
            Provider::Url(url) => url.fetch(&checkout, opts)?,
        }

        std::fs::rename(&checkout, dest).map_err(|source| FetchError::Io {
            path: dest.to_path_buf(),
            source,
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[derive(Deserialize)]
    struct Wrapper {
        provider: Provider,
    }

    #[test]
    fn test_provider_git_from_toml() {
        let w: Wrapper = toml::from_str(
            r#"
[provider]
git = "https://github.com/acme/uart.git"
rev = "v1.0"
"#,
        )
        .unwrap();

        match w.provider {
            Provider::Git(git) => {
                assert_eq!(git.repo.as_str(), "https://github.com/acme/uart.git");
                assert_eq!(git.rev.as_deref(), Some("v1.0"));
            }
            other => panic!("expected git provider, got {:?}", other),
        }
    }

    #[test]
    fn test_provider_url_from_toml() {
        let w: Wrapper = toml::from_str(
            r#"
[provider]
url = "https://example.com/uart-1.0.tar.gz"
strip_prefix = "uart-1.0"
"#,
        )
        .unwrap();

        assert!(matches!(w.provider, Provider::Url(_)));
        assert_eq!(w.provider.location(), "https://example.com/uart-1.0.tar.gz");
    }

    #[test]
    fn test_offline_refuses_fetch() {
        let tmp = TempDir::new().unwrap();
        let w: Wrapper = toml::from_str(
            r#"
[provider]
url = "https://example.com/uart-1.0.tar.gz"
"#,
        )
        .unwrap();

        let opts = FetchOptions {
            offline: true,
            timeout: None,
        };
        let err = w.provider.fetch(&tmp.path().join("uart"), &opts).unwrap_err();

        assert!(matches!(err, FetchError::Offline { .. }));
        assert!(!tmp.path().join("uart").exists());
    }
}
