//! Core library error types.

use miette::Diagnostic;
use thiserror::Error;

/// Error while looking up or ordering cores.
#[derive(Debug, Error, Diagnostic)]
pub enum LibraryError {
    #[error("core `{name}` not found{}", .required_by.as_ref().map(|r| format!(" (required by `{}`)", r)).unwrap_or_default())]
    #[diagnostic(code(socstage::library::not_found))]
    CoreNotFound {
        name: String,
        required_by: Option<String>,
        #[help]
        help: Option<String>,
    },

    #[error("dependency cycle detected: {}", .cores.join(" -> "))]
    #[diagnostic(
        code(socstage::library::cycle),
        help("Break the cycle by removing one of the `depends` entries")
    )]
    Cycle { cores: Vec<String> },
}

impl LibraryError {
    /// Build a not-found error, suggesting known cores with a similar name.
    pub fn not_found<'a>(
        name: &str,
        required_by: Option<String>,
        known: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let needle = name.rsplit(':').find(|s| !s.is_empty()).unwrap_or(name);
        let mut suggestions: Vec<&str> = known
            .into_iter()
            .filter(|k| !needle.is_empty() && k.contains(needle))
            .collect();
        suggestions.sort_unstable();
        suggestions.dedup();

        let help = if suggestions.is_empty() {
            Some("Check `library.cores_root` or pass `--cores-root`".to_string())
        } else {
            Some(format!("did you mean: {}?", suggestions.join(", ")))
        };

        LibraryError::CoreNotFound {
            name: name.to_string(),
            required_by,
            help,
        }
    }
}
