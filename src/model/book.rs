use std::path::PathBuf;

/// Novel-level metadata supplied by the caller.
///
/// The assembler scopes `title` and `identifier` per volume; everything else
/// is used as given. Empty strings are allowed and fall back to literal text
/// on the intro page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookMetadata {
    pub title: String,
    pub author: String,
    /// Unique identifier. When empty, the output root is used instead.
    pub identifier: String,
    pub language: String,
    /// Home page of the site the chapters were scraped from.
    pub home_url: Option<String>,
    /// Path to a cover image on disk.
    pub cover: Option<PathBuf>,
}

impl BookMetadata {
    /// Create metadata with a title and the default language (`en`).
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            language: "en".to_string(),
            ..Default::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_home_url(mut self, url: impl Into<String>) -> Self {
        self.home_url = Some(url.into());
        self
    }

    pub fn with_cover(mut self, path: impl Into<PathBuf>) -> Self {
        self.cover = Some(path.into());
        self
    }

    /// Title scoped to one volume: `"<title> <volume>"`, trimmed.
    pub fn volume_title(&self, volume: &str) -> String {
        format!("{} {}", self.title, volume).trim().to_string()
    }
}

/// A scraped chapter.
///
/// Chapters must arrive in final reading order, with each volume forming a
/// contiguous run. The position in the sequence is the chapter's ordinal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Deserialize, serde::Serialize))]
pub struct Chapter {
    pub title: String,
    /// HTML fragment. May be empty.
    #[cfg_attr(feature = "cli", serde(default))]
    pub body: String,
    /// Volume identifier used for boundary detection.
    #[cfg_attr(feature = "cli", serde(default))]
    pub volume: String,
    /// Display title of the volume, used as the TOC group label.
    #[cfg_attr(feature = "cli", serde(default))]
    pub volume_title: String,
}

impl Chapter {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            ..Default::default()
        }
    }

    /// Set both the volume identifier and its display title.
    pub fn in_volume(mut self, volume: impl Into<String>, volume_title: impl Into<String>) -> Self {
        self.volume = volume.into();
        self.volume_title = volume_title.into();
        self
    }
}

/// Chapters grouped under one output label.
///
/// One artifact is written per non-empty bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Deserialize, serde::Serialize))]
pub struct VolumeBucket {
    pub label: String,
    #[cfg_attr(feature = "cli", serde(default))]
    pub chapters: Vec<Chapter>,
}

impl VolumeBucket {
    pub fn new(label: impl Into<String>, chapters: Vec<Chapter>) -> Self {
        Self {
            label: label.into(),
            chapters,
        }
    }
}
