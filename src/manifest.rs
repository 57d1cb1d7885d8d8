//! JSON manifest read by the command-line tool.
//!
//! ```json
//! {
//!   "title": "My Novel",
//!   "author": "Someone",
//!   "home_url": "https://novels.example/",
//!   "cover": "cover.jpg",
//!   "volumes": [
//!     { "label": "Vol 1", "chapters": [
//!       { "title": "Chapter 1", "body": "<p>...</p>", "volume": "1", "volume_title": "Volume 1" }
//!     ] }
//!   ]
//! }
//! ```
//!
//! Relative `cover` and `output` paths are resolved against the manifest's
//! directory.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::assemble::BindOptions;
use crate::error::{Error, Result};
use crate::model::{BookMetadata, VolumeBucket};

/// Characters that are not allowed in generated file names.
const UNSAFE_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Manifest {
    pub title: String,
    pub author: String,
    pub identifier: String,
    pub language: Option<String>,
    pub home_url: Option<String>,
    pub cover: Option<PathBuf>,
    /// Output root. Defaults to the manifest's directory.
    pub output: Option<PathBuf>,
    /// Artifact base name. Derived from the title when unset.
    pub file_name: Option<String>,
    pub no_volume_suffix: bool,
    pub volumes: Vec<VolumeBucket>,
}

impl Manifest {
    /// Read and validate a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate manifest JSON.
    pub fn parse(content: &str) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Reject manifests that would write two volumes to the same file.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for bucket in &self.volumes {
            if !seen.insert(bucket.label.as_str()) {
                return Err(Error::InvalidInput(format!(
                    "duplicate volume label: {:?}",
                    bucket.label
                )));
            }
        }
        Ok(())
    }

    /// Split into binding options and the ordered volume list.
    ///
    /// `base_dir` anchors relative paths.
    pub fn into_options(self, base_dir: &Path) -> (BindOptions, Vec<VolumeBucket>) {
        let file_name = self
            .file_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| safe_file_name(&self.title));

        let metadata = BookMetadata {
            title: self.title,
            author: self.author,
            identifier: self.identifier,
            language: self.language.unwrap_or_else(|| "en".to_string()),
            home_url: self.home_url.filter(|url| !url.is_empty()),
            cover: self.cover.map(|p| base_dir.join(p)),
        };

        let output_root = self
            .output
            .map(|p| base_dir.join(p))
            .unwrap_or_else(|| base_dir.to_path_buf());

        let options = BindOptions::new(output_root, file_name)
            .with_metadata(metadata)
            .suppress_volume_suffix(self.no_volume_suffix);
        (options, self.volumes)
    }
}

/// Derive a file name from a title by replacing path-hostile characters.
pub fn safe_file_name(title: &str) -> String {
    let name: String = title
        .chars()
        .map(|c| {
            if c.is_control() || UNSAFE_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();
    let name = name.trim().trim_matches('.').trim();
    if name.is_empty() {
        "book".to_string()
    } else {
        name.to_string()
    }
}
