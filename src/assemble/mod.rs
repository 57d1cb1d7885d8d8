//! Book assembly.
//!
//! Turns an ordered chapter list into an [`AssembledBook`] and writes it to
//! disk through a [`Packager`]. Each call is a one-shot pipeline: no state is
//! kept between volumes, so volumes can be bound independently.
//!
//! # Example
//!
//! ```no_run
//! use novel_binder::{BindOptions, BookAssembler, BookMetadata, Chapter, VolumeBucket};
//!
//! let options = BindOptions::new("output", "My Novel")
//!     .with_metadata(BookMetadata::new("My Novel").with_author("Someone"));
//! let volumes = vec![VolumeBucket::new(
//!     "Vol 1",
//!     vec![Chapter::new("Chapter 1", "<p>...</p>").in_volume("1", "Volume 1")],
//! )];
//!
//! let written = BookAssembler::new(options).bind_volumes(&volumes)?;
//! assert_eq!(written.len(), 1);
//! # Ok::<(), novel_binder::Error>(())
//! ```

mod cover;
mod intro;
mod toc;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::Result;
use crate::export::{EpubPackager, Packager};
use crate::model::{AssembledBook, BookMetadata, Chapter, SpineItem, VolumeBucket};
use crate::report::{Fields, Reporter, TracingReporter};

pub use cover::resolve_cover;
pub use intro::{INTRO_FILE, INTRO_ID, PROJECT_URL, build_intro};
pub use toc::{build_chapters, chapter_id};

/// Subdirectory of the output root that receives the artifacts.
pub const OUTPUT_SUBDIR: &str = "epub";

/// Caller-supplied settings for one binding run.
#[derive(Debug, Clone, Default)]
pub struct BindOptions {
    pub metadata: BookMetadata,
    /// Root directory; artifacts land in `<output_root>/epub/`.
    pub output_root: PathBuf,
    /// Filesystem-safe base name of the artifacts.
    pub file_name: String,
    /// Do not append the volume label to artifact names.
    pub suppress_volume_suffix: bool,
}

impl BindOptions {
    pub fn new(output_root: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            output_root: output_root.into(),
            file_name: file_name.into(),
            ..Default::default()
        }
    }

    pub fn with_metadata(mut self, metadata: BookMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn suppress_volume_suffix(mut self, suppress: bool) -> Self {
        self.suppress_volume_suffix = suppress;
        self
    }

    /// Directory the artifacts are written to.
    pub fn output_dir(&self) -> PathBuf {
        self.output_root.join(OUTPUT_SUBDIR)
    }

    /// Artifact base name for `volume`, without extension.
    pub fn artifact_name(&self, volume: &str) -> String {
        if self.suppress_volume_suffix || volume.is_empty() {
            self.file_name.clone()
        } else {
            format!("{} {}", self.file_name, volume)
        }
    }
}

/// Assembles and writes books.
pub struct BookAssembler<P = EpubPackager> {
    options: BindOptions,
    packager: P,
    reporter: Arc<dyn Reporter>,
}

impl BookAssembler {
    /// Create an assembler writing EPUB files and reporting through `tracing`.
    pub fn new(options: BindOptions) -> Self {
        Self {
            options,
            packager: EpubPackager::new(),
            reporter: Arc::new(TracingReporter),
        }
    }
}

impl<P: Packager> BookAssembler<P> {
    /// Replace the packager.
    pub fn with_packager<Q: Packager>(self, packager: Q) -> BookAssembler<Q> {
        BookAssembler {
            options: self.options,
            packager,
            reporter: self.reporter,
        }
    }

    /// Replace the reporter.
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn options(&self) -> &BindOptions {
        &self.options
    }

    /// Build the in-memory book for one volume without writing anything.
    ///
    /// The spine is `[cover] → intro → nav → chapters`, with the cover only
    /// present when one was found. The TOC groups chapters by volume but never
    /// changes their reading order.
    pub fn assemble(&self, volume: &str, chapters: &[Chapter]) -> AssembledBook {
        let source = &self.options.metadata;
        let metadata = self.scoped_metadata(volume);

        let cover = resolve_cover(source.cover.as_deref(), self.reporter.as_ref());
        if cover.is_none() {
            let fields = Fields::new().with_title(&metadata.title).with_volume(volume);
            self.reporter.warn("No cover image", &fields);
        }

        let intro = build_intro(
            Some(source.title.as_str()),
            Some(source.author.as_str()),
            source.home_url.as_deref(),
            cover.as_ref(),
        );

        let mut spine = Vec::with_capacity(chapters.len() + 3);
        if cover.is_some() {
            spine.push(SpineItem::Cover);
        }
        spine.push(SpineItem::Document(intro.id.clone()));
        spine.push(SpineItem::Nav);

        let (chapter_docs, toc) = build_chapters(chapters);
        spine.extend(chapter_docs.iter().map(|doc| SpineItem::Document(doc.id.clone())));

        let mut documents = Vec::with_capacity(chapter_docs.len() + 1);
        documents.push(intro);
        documents.extend(chapter_docs);

        AssembledBook {
            metadata,
            cover,
            documents,
            spine,
            toc,
        }
    }

    /// Assemble one volume and write it to `<output_root>/epub/<name>.<ext>`.
    ///
    /// Creates the output directory if needed and returns the written path.
    pub fn bind(&self, volume: &str, chapters: &[Chapter]) -> Result<PathBuf> {
        let book = self.assemble(volume, chapters);
        let fields = Fields::new()
            .with_title(&book.metadata.title)
            .with_volume(volume);
        self.reporter
            .debug(&format!("Binding {}: {}", self.packager.extension(), book.metadata.title), &fields);

        let dir = self.options.output_dir();
        fs::create_dir_all(&dir)?;

        let file_name = format!(
            "{}.{}",
            self.options.artifact_name(volume),
            self.packager.extension()
        );
        let path = dir.join(&file_name);
        let fields = fields.with_path(&path);
        self.reporter.debug(&format!("Writing {}", path.display()), &fields);

        if let Err(e) = self.write(&book, &path) {
            self.reporter
                .error(&format!("Failed to write {}: {e}", path.display()), &fields);
            return Err(e);
        }

        self.reporter.info(&format!("Created: {file_name}"), &fields);
        Ok(path)
    }

    /// Bind every non-empty volume, in order.
    ///
    /// Volumes without chapters are skipped. The first failure aborts the run.
    pub fn bind_volumes(&self, volumes: &[VolumeBucket]) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for bucket in volumes {
            if bucket.chapters.is_empty() {
                self.reporter.debug(
                    &format!("Skipping empty volume: {}", bucket.label),
                    &Fields::new().with_volume(&bucket.label),
                );
                continue;
            }
            written.push(self.bind(&bucket.label, &bucket.chapters)?);
        }
        Ok(written)
    }

    fn scoped_metadata(&self, volume: &str) -> BookMetadata {
        let source = &self.options.metadata;
        let base_id = if source.identifier.is_empty() {
            self.options.output_root.display().to_string()
        } else {
            source.identifier.clone()
        };
        BookMetadata {
            title: source.volume_title(volume),
            identifier: format!("{base_id}{volume}"),
            language: if source.language.is_empty() {
                "en".to_string()
            } else {
                source.language.clone()
            },
            ..source.clone()
        }
    }

    fn write(&self, book: &AssembledBook, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.packager.package(book, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Bind every non-empty volume with the default EPUB packager.
pub fn bind_volumes(options: BindOptions, volumes: &[VolumeBucket]) -> Result<Vec<PathBuf>> {
    BookAssembler::new(options).bind_volumes(volumes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Level, MemoryReporter};
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn chapters(volume: &str, count: usize) -> Vec<Chapter> {
        (0..count)
            .map(|i| {
                Chapter::new(format!("{volume} ch{i}"), format!("<p>{i}</p>"))
                    .in_volume(volume, format!("Volume {volume}"))
            })
            .collect()
    }

    fn assembler(options: BindOptions) -> (BookAssembler, Arc<MemoryReporter>) {
        let reporter = Arc::new(MemoryReporter::new());
        let assembler = BookAssembler::new(options).with_reporter(reporter.clone());
        (assembler, reporter)
    }

    fn with_cover(dir: &TempDir) -> BindOptions {
        let cover = dir.path().join("cover.png");
        fs::write(&cover, b"png").unwrap();
        BindOptions::new(dir.path(), "Novel")
            .with_metadata(BookMetadata::new("Novel").with_author("Author").with_cover(cover))
    }

    #[test]
    fn test_spine_without_cover() {
        let (assembler, reporter) = assembler(BindOptions::new("out", "Novel"));
        let book = assembler.assemble("Vol 1", &chapters("1", 2));

        assert_eq!(
            book.spine,
            vec![
                SpineItem::Document("intro".to_string()),
                SpineItem::Nav,
                SpineItem::Document("chap_00001".to_string()),
                SpineItem::Document("chap_00002".to_string()),
            ]
        );
        assert!(book.cover.is_none());
        assert_eq!(reporter.messages(Level::Warn), vec!["No cover image"]);
    }

    #[test]
    fn test_spine_with_cover() {
        let dir = TempDir::new().unwrap();
        let (assembler, reporter) = assembler(with_cover(&dir));
        let book = assembler.assemble("", &chapters("1", 1));

        assert_eq!(book.spine[0], SpineItem::Cover);
        assert_eq!(book.spine[1], SpineItem::Document("intro".to_string()));
        assert_eq!(book.spine[2], SpineItem::Nav);
        assert_eq!(book.spine.len(), 4);
        assert!(reporter.messages(Level::Warn).is_empty());
        assert!(book.documents[0].body.contains("src=\"cover-image.png\""));
    }

    #[test]
    fn test_empty_chapters_still_assemble() {
        let (assembler, _) = assembler(BindOptions::new("out", "Novel"));
        let book = assembler.assemble("", &[]);

        assert!(book.toc.is_empty());
        assert_eq!(book.documents.len(), 1);
        assert_eq!(book.spine.len(), 2);
    }

    #[test]
    fn test_metadata_is_scoped_to_volume() {
        let options = BindOptions::new("/books", "Novel").with_metadata(
            BookMetadata::new("Novel").with_author("Author"),
        );
        let (assembler, _) = assembler(options);
        let book = assembler.assemble("Vol 2", &chapters("2", 1));

        assert_eq!(book.metadata.title, "Novel Vol 2");
        assert_eq!(book.metadata.identifier, "/booksVol 2");
        assert_eq!(book.metadata.author, "Author");
        assert_eq!(book.metadata.language, "en");
        // The intro page keeps the unscoped title.
        assert!(book.documents[0].body.contains("<h1>Novel</h1>"));
    }

    #[test]
    fn test_explicit_identifier_is_suffixed() {
        let options = BindOptions::new("/books", "Novel")
            .with_metadata(BookMetadata::new("Novel").with_identifier("urn:novel:"));
        let (assembler, _) = assembler(options);
        let book = assembler.assemble("3", &chapters("3", 1));
        assert_eq!(book.metadata.identifier, "urn:novel:3");
    }

    #[test]
    fn test_artifact_name() {
        let options = BindOptions::new("out", "Novel");
        assert_eq!(options.artifact_name("Vol 1"), "Novel Vol 1");
        assert_eq!(options.artifact_name(""), "Novel");
        let options = options.suppress_volume_suffix(true);
        assert_eq!(options.artifact_name("Vol 1"), "Novel");
    }

    #[test]
    fn test_bind_writes_under_epub_dir() {
        let dir = TempDir::new().unwrap();
        let (assembler, reporter) = assembler(BindOptions::new(dir.path(), "Novel"));
        let path = assembler.bind("Vol 1", &chapters("1", 2)).unwrap();

        assert_eq!(path, dir.path().join("epub").join("Novel Vol 1.epub"));
        assert!(path.is_file());
        let created = reporter
            .entries()
            .into_iter()
            .find(|e| e.message == "Created: Novel Vol 1.epub")
            .unwrap();
        assert_eq!(created.level, Level::Info);
        assert_eq!(created.title.as_deref(), Some("Novel Vol 1"));
        assert_eq!(created.volume.as_deref(), Some("Vol 1"));
        assert_eq!(created.path.as_deref(), Some(path.as_path()));

        // Existing directory is fine.
        assembler.bind("Vol 2", &chapters("2", 1)).unwrap();
    }

    #[test]
    fn test_bind_volumes_skips_empty() {
        let dir = TempDir::new().unwrap();
        let (assembler, _) = assembler(BindOptions::new(dir.path(), "Novel"));
        let volumes = vec![
            VolumeBucket::new("Vol1", chapters("1", 3)),
            VolumeBucket::new("Vol2", Vec::new()),
            VolumeBucket::new("Vol3", chapters("3", 1)),
        ];
        let written = assembler.bind_volumes(&volumes).unwrap();

        let names: Vec<_> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["Novel Vol1.epub", "Novel Vol3.epub"]);
        assert!(!dir.path().join("epub").join("Novel Vol2.epub").exists());
    }

    #[test]
    fn test_output_dir_failure_is_fatal() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("root");
        fs::write(&blocker, b"not a directory").unwrap();

        let (assembler, _) = assembler(BindOptions::new(&blocker, "Novel"));
        let volumes = vec![
            VolumeBucket::new("Vol1", chapters("1", 1)),
            VolumeBucket::new("Vol2", chapters("2", 1)),
        ];
        assert!(assembler.bind_volumes(&volumes).is_err());
    }

    #[test]
    fn test_cover_named_like_a_page_still_binds() {
        let dir = TempDir::new().unwrap();
        let cover = dir.path().join("art.xhtml");
        fs::write(&cover, b"<html/>").unwrap();
        let options = BindOptions::new(dir.path(), "Novel")
            .with_metadata(BookMetadata::new("Novel").with_cover(cover));
        let (assembler, _) = assembler(options);

        let path = assembler.bind("Vol 1", &chapters("1", 1)).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn test_skipped_volume_reports_label() {
        let dir = TempDir::new().unwrap();
        let (assembler, reporter) = assembler(BindOptions::new(dir.path(), "Novel"));
        assembler
            .bind_volumes(&[VolumeBucket::new("Vol2", Vec::new())])
            .unwrap();

        let entries = reporter.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, Level::Debug);
        assert_eq!(entries[0].volume.as_deref(), Some("Vol2"));
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let (assembler, _) = assembler(with_cover(&dir));
        let input = chapters("1", 4);
        assert_eq!(assembler.assemble("V", &input), assembler.assemble("V", &input));
    }

    proptest! {
        #[test]
        fn prop_spine_length_and_order(
            volumes in prop::collection::vec(0u8..3, 0..30),
            cover in any::<bool>(),
        ) {
            let dir = TempDir::new().unwrap();
            let options = if cover { with_cover(&dir) } else { BindOptions::new(dir.path(), "Novel") };
            let (assembler, _) = assembler(options);
            let input: Vec<_> = volumes
                .iter()
                .enumerate()
                .map(|(i, v)| Chapter::new(format!("c{i}"), "").in_volume(v.to_string(), v.to_string()))
                .collect();
            let book = assembler.assemble("", &input);

            let offset = usize::from(cover);
            prop_assert_eq!(book.spine.len(), offset + 2 + input.len());
            prop_assert_eq!(&book.spine[offset], &SpineItem::Document("intro".to_string()));
            prop_assert_eq!(&book.spine[offset + 1], &SpineItem::Nav);
            for (i, item) in book.spine[offset + 2..].iter().enumerate() {
                prop_assert_eq!(item, &SpineItem::Document(chapter_id(i)));
            }
            prop_assert_eq!(book.toc_chapter_count(), input.len());
        }
    }
}
