//! Git provider - cores hosted in git repositories.

use std::path::Path;

use git2::{Repository, ResetType};
use serde::Deserialize;
use url::Url;

use crate::sources::FetchError;

/// A git repository and an optional revision (commit, tag or branch).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitProvider {
    /// Remote repository URL
    #[serde(rename = "git")]
    pub repo: Url,

    /// Revision to check out; the default branch when absent
    #[serde(default)]
    pub rev: Option<String>,
}

impl GitProvider {
    /// Clone the repository into `dest` and check out the revision.
    pub fn fetch(&self, dest: &Path) -> Result<(), FetchError> {
        tracing::info!("Cloning {}", self.repo);

        let repo = Repository::clone(self.repo.as_str(), dest).map_err(|e| self.git_error(e))?;

        if let Some(rev) = &self.rev {
            self.checkout(&repo, rev)?;
        }

        Ok(())
    }

    fn checkout(&self, repo: &Repository, rev: &str) -> Result<(), FetchError> {
        // Branches only exist as remote-tracking refs right after a clone.
        let object = repo
            .revparse_single(rev)
            .or_else(|_| repo.revparse_single(&format!("origin/{}", rev)))
            .map_err(|e| self.git_error(e))?;

        let commit = object.peel_to_commit().map_err(|e| self.git_error(e))?;
        tracing::debug!("Checking out {} at {}", self.repo, commit.id());

        repo.reset(commit.as_object(), ResetType::Hard, None)
            .map_err(|e| self.git_error(e))?;

        Ok(())
    }

    fn git_error(&self, source: git2::Error) -> FetchError {
        FetchError::Git {
            url: self.repo.to_string(),
            source,
        }
    }
}
