//! Core identification - `vendor:library:name:version`.
//!
//! Any leading field may be empty (`::uart:1.0`). Shorter forms are
//! accepted too: `uart`, `uart:1.0` and `acme:ip:uart` (no version).

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use semver::Version;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A parsed core identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoreName {
    vendor: String,
    library: String,
    name: String,
    version: String,
}

impl CoreName {
    /// Parse a core identifier.
    pub fn parse(s: &str) -> Self {
        let fields: Vec<&str> = s.trim().split(':').collect();
        let (vendor, library, name, version) = match fields.as_slice() {
            [name] => ("", "", *name, String::new()),
            [name, version] => ("", "", *name, version.to_string()),
            [vendor, library, name] => (*vendor, *library, *name, String::new()),
            // Anything past the name belongs to the version (`1.0:rc1`).
            [vendor, library, name, version @ ..] => (*vendor, *library, *name, version.join(":")),
            [] => ("", "", "", String::new()),
        };

        CoreName {
            vendor: vendor.to_string(),
            library: library.to_string(),
            name: name.to_string(),
            version,
        }
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn library(&self) -> &str {
        &self.library
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// The `vendor:library:name` part, without version.
    pub fn vln(&self) -> String {
        format!("{}:{}:{}", self.vendor, self.library, self.name)
    }

    /// Whether this core satisfies a dependency on `dep`.
    ///
    /// A dependency without a version matches any version of the same
    /// `vendor:library:name`.
    pub fn satisfies(&self, dep: &CoreName) -> bool {
        if self.vendor != dep.vendor || self.library != dep.library || self.name != dep.name {
            return false;
        }
        dep.version.is_empty() || dep.version == self.version
    }

    /// Filesystem-safe form used for staging and cache directories.
    pub fn sanitized(&self) -> String {
        let joined = format!(
            "{}_{}_{}_{}",
            self.vendor, self.library, self.name, self.version
        );

        joined
            .trim_start_matches('_')
            .trim_end_matches('_')
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }

    /// Compare versions, treating `1.0` as `1.0.0` and falling back to
    /// plain string order for non-numeric versions.
    pub fn cmp_version(&self, other: &CoreName) -> Ordering {
        match (lenient_version(&self.version), lenient_version(&other.version)) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => self.version.cmp(&other.version),
        }
    }
}

/// Parse a version string, padding missing minor/patch components.
pub fn lenient_version(s: &str) -> Option<Version> {
    let s = s.trim().trim_start_matches('v');
    if s.is_empty() {
        return None;
    }

    if let Ok(v) = Version::parse(s) {
        return Some(v);
    }

    let (core, rest) = match s.find(['-', '+']) {
        Some(idx) => (&s[..idx], &s[idx..]),
        None => (s, ""),
    };

    let mut parts: Vec<&str> = core.split('.').collect();
    if parts.len() > 3 || parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    while parts.len() < 3 {
        parts.push("0");
    }

    Version::parse(&format!("{}{}", parts.join("."), rest)).ok()
}

impl fmt::Display for CoreName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.vendor.is_empty() && self.library.is_empty() && self.version.is_empty() {
            return f.write_str(&self.name);
        }
        write!(f, "{}:{}:{}", self.vendor, self.library, self.name)?;
        if !self.version.is_empty() {
            write!(f, ":{}", self.version)?;
        }
        Ok(())
    }
}

impl FromStr for CoreName {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(CoreName::parse(s))
    }
}

impl Serialize for CoreName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CoreName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(CoreName::parse(&s))
    }
}
