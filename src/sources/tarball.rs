//! URL provider - cores distributed as `.tar.gz` archives.

use std::io::Cursor;
use std::path::Path;

use flate2::read::GzDecoder;
use serde::Deserialize;
use tar::Archive;
use url::Url;

use crate::sources::{FetchError, FetchOptions};
use crate::util::hash::sha256_bytes;

/// A gzip-compressed tarball reachable over HTTP(S).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UrlProvider {
    pub url: Url,

    /// Leading directory to strip from archive entries
    #[serde(default)]
    pub strip_prefix: Option<String>,

    /// Expected SHA-256 of the archive (hex)
    #[serde(default)]
    pub sha256: Option<String>,
}

impl UrlProvider {
    /// Download the archive and unpack it into `dest`.
    pub fn fetch(&self, dest: &Path, opts: &FetchOptions) -> Result<(), FetchError> {
        tracing::info!("Downloading {}", self.url);

        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = opts.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|source| self.network_error(source))?;

        let response = client
            .get(self.url.clone())
            .send()
            .map_err(|source| self.network_error(source))?;

        if !response.status().is_success() {
            return Err(FetchError::Http {
                url: self.url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .map_err(|source| self.network_error(source))?;

        self.unpack(&bytes, dest)
    }

    /// Verify and unpack already-downloaded archive bytes.
    pub fn unpack(&self, data: &[u8], dest: &Path) -> Result<(), FetchError> {
        if let Some(expected) = &self.sha256 {
            let actual = sha256_bytes(data);
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(FetchError::Checksum {
                    url: self.url.to_string(),
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        extract_tarball(data, dest, self.strip_prefix.as_deref()).map_err(|source| {
            FetchError::Extract {
                url: self.url.to_string(),
                source,
            }
        })
    }

    fn network_error(&self, source: reqwest::Error) -> FetchError {
        FetchError::Network {
            url: self.url.to_string(),
            source,
        }
    }
}

/// Extract a gzip-compressed tarball into `dest`.
///
/// Entries under `strip_prefix/` lose that prefix; the prefix directory
/// itself is skipped. Entries that would land outside `dest` are rejected.
pub fn extract_tarball(data: &[u8], dest: &Path, strip_prefix: Option<&str>) -> std::io::Result<()> {
    let mut archive = Archive::new(GzDecoder::new(Cursor::new(data)));
    std::fs::create_dir_all(dest)?;

    for entry in archive.entries()? {
        let mut entry = entry?;
        let entry_path = entry.path()?.to_string_lossy().replace('\\', "/");

        let relative = match strip_prefix.map(|p| p.trim_end_matches('/')) {
            Some(prefix) if entry_path.trim_end_matches('/') == prefix => continue,
            Some(prefix) => entry_path
                .strip_prefix(&format!("{}/", prefix))
                .unwrap_or(&entry_path)
                .to_string(),
            None => entry_path.clone(),
        };
        if relative.is_empty() {
            continue;
        }

        let relative = Path::new(&relative);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("archive entry escapes destination: {}", entry_path),
            ));
        }

        let output_path = dest.join(relative);
        match entry.header().entry_type() {
            tar::EntryType::Directory => std::fs::create_dir_all(&output_path)?,
            tar::EntryType::Regular | tar::EntryType::Continuous | tar::EntryType::Link => {
                if let Some(parent) = output_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                entry.unpack(&output_path)?;
            }
            other => {
                tracing::debug!("Skipping {:?} entry {}", other, entry_path);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tar::Builder;
    use tempfile::TempDir;

    fn tarball(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut data = Vec::new();
        {
            let encoder = GzEncoder::new(&mut data, Compression::default());
            let mut builder = Builder::new(encoder);
            for (path, content) in entries {
                let mut header = tar::Header::new_gnu();
                header.set_path(path).unwrap();
                header.set_size(content.len() as u64);
                header.set_mode(0o644);
                header.set_cksum();
                builder.append(&header, content.as_bytes()).unwrap();
            }
            builder.into_inner().unwrap().finish().unwrap();
        }
        data
    }

    fn provider(sha256: Option<String>) -> UrlProvider {
        UrlProvider {
            url: Url::parse("https://example.com/uart-1.0.tar.gz").unwrap(),
            strip_prefix: Some("uart-1.0".to_string()),
            sha256,
        }
    }

    #[test]
    fn test_unpack_strips_prefix() {
        let data = tarball(&[("uart-1.0/rtl/uart.v", "module uart; endmodule")]);
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("uart");

        provider(None).unpack(&data, &dest).unwrap();

        let content = std::fs::read_to_string(dest.join("rtl/uart.v")).unwrap();
        assert_eq!(content, "module uart; endmodule");
        assert!(!dest.join("uart-1.0").exists());
    }

    #[test]
    fn test_unpack_verifies_checksum() {
        let data = tarball(&[("uart-1.0/rtl/uart.v", "module uart; endmodule")]);
        let tmp = TempDir::new().unwrap();

        let err = provider(Some("00".repeat(32)))
            .unpack(&data, &tmp.path().join("uart"))
            .unwrap_err();
        assert!(matches!(err, FetchError::Checksum { .. }));

        provider(Some(sha256_bytes(&data)))
            .unpack(&data, &tmp.path().join("uart"))
            .unwrap();
    }
}
