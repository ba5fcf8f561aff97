//! Screenshot artifact storage

use crate::engine::Snapshot;
use crate::output::traits::{ArtifactSink, OutputResult};
use std::fmt;
use std::path::{Path, PathBuf};

/// Longest slug derived from a URL
const MAX_SLUG_LEN: usize = 80;

/// Reference to a stored artifact (a file path for `DirectorySink`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactRef(String);

impl ArtifactRef {
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Writes artifacts as files under one directory
///
/// Files are named `<seq>-<slug>-<suffix>.<ext>` where `seq` is a per-run
/// counter, so repeated captures of the same URL never collide. The
/// directory is created on first use.
pub struct DirectorySink {
    directory: PathBuf,
    sequence: u32,
    created: bool,
}

impl DirectorySink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            sequence: 0,
            created: false,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl ArtifactSink for DirectorySink {
    fn store(&mut self, name: &str, suffix: &str, snapshot: &Snapshot) -> OutputResult<ArtifactRef> {
        if !self.created {
            std::fs::create_dir_all(&self.directory)?;
            self.created = true;
        }

        self.sequence += 1;
        let file_name = format!(
            "{:04}-{}-{}.{}",
            self.sequence,
            slugify(name),
            suffix,
            snapshot.extension
        );
        let path = self.directory.join(file_name);
        std::fs::write(&path, &snapshot.bytes)?;

        tracing::debug!("Stored {} artifact for {} at {}", suffix, name, path.display());
        Ok(ArtifactRef::new(path.to_string_lossy()))
    }
}

/// Turns a URL into a file-name-safe slug
fn slugify(url: &str) -> String {
    let without_scheme = url
        .split_once("://")
        .map_or(url, |(_, rest)| rest);

    let mut slug = String::with_capacity(without_scheme.len());
    for c in without_scheme.chars() {
        if c.is_ascii_alphanumeric() || c == '-' {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }

    let slug = slug.trim_matches('_');
    let slug: String = slug.chars().take(MAX_SLUG_LEN).collect();
    if slug.is_empty() {
        "page".to_string()
    } else {
        slug
    }
}
