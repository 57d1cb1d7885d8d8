use super::BookMetadata;

/// An XHTML content document.
///
/// `body` is an HTML fragment placed inside `<body>` untouched; the packager
/// adds the surrounding document skeleton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentNode {
    pub id: String,
    pub file_name: String,
    pub title: String,
    pub body: String,
}

impl DocumentNode {
    pub fn new(
        id: impl Into<String>,
        file_name: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            title: title.into(),
            body: body.into(),
        }
    }
}

/// A binary image resource (the cover).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub file_name: String,
    pub media_type: String,
    pub data: Vec<u8>,
}

/// One entry of the reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpineItem {
    /// Cover page, synthesized by the packager from the cover image.
    Cover,
    /// Navigation document.
    Nav,
    /// A content document, by id.
    Document(String),
}

/// The linear reading order.
pub type SpineOrder = Vec<SpineItem>;

/// A table of contents entry (hierarchical).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub title: String,
    pub href: String,
    pub children: Vec<TocEntry>,
}

impl TocEntry {
    pub fn new(title: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            href: href.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<TocEntry>) -> Self {
        self.children = children;
        self
    }
}

/// Everything the packager needs to write one book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledBook {
    /// Metadata already scoped to the volume being written.
    pub metadata: BookMetadata,
    pub cover: Option<ImageAsset>,
    /// Intro page followed by chapter documents, in reading order.
    pub documents: Vec<DocumentNode>,
    pub spine: SpineOrder,
    pub toc: Vec<TocEntry>,
}

impl AssembledBook {
    /// Look up a content document by id.
    pub fn document(&self, id: &str) -> Option<&DocumentNode> {
        self.documents.iter().find(|doc| doc.id == id)
    }

    /// Number of chapter entries across all TOC groups.
    pub fn toc_chapter_count(&self) -> usize {
        self.toc.iter().map(|entry| entry.children.len()).sum()
    }
}
