//! Core sources.
//!
//! Providers fetch a core's files from a remote location (git
//! repositories, tarball URLs) into the local cache.

pub mod git;
pub mod provider;
pub mod tarball;

pub use git::GitProvider;
pub use provider::{FetchError, FetchOptions, Provider};
pub use tarball::UrlProvider;
