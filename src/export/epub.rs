//! EPUB packager.
//!
//! Writes EPUB 3 files (with an NCX for EPUB 2 readers) from assembled books.

use std::borrow::Cow;
use std::io::{Seek, Write};

use quick_xml::escape::escape;
use zip::{CompressionMethod, DateTime};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::dom::fragment_to_xhtml;
use crate::error::Result;
use crate::model::{AssembledBook, BookMetadata, ImageAsset, SpineItem, TocEntry};

use super::Packager;

/// Timestamp written when none is configured, keeping output reproducible.
const DEFAULT_MODIFIED: &str = "2024-01-01T00:00:00Z";

const NAV_ID: &str = "nav";
const NAV_FILE: &str = "nav.xhtml";
const COVER_PAGE_ID: &str = "cover";
const COVER_PAGE_FILE: &str = "cover.xhtml";
const COVER_IMAGE_ID: &str = "cover-image";
const STYLE_FILE: &str = "style.css";

/// Configuration for EPUB packaging.
#[derive(Debug, Clone)]
pub struct EpubConfig {
    /// Compression level for deflate (0-9, default 6).
    pub compression_level: Option<u32>,
    /// Value of `dcterms:modified`. Defaults to a fixed timestamp.
    pub modified: Option<String>,
    /// Include a small default stylesheet.
    pub stylesheet: bool,
}

impl Default for EpubConfig {
    fn default() -> Self {
        Self {
            compression_level: None,
            modified: None,
            stylesheet: true,
        }
    }
}

/// EPUB format packager.
///
/// # Example
///
/// ```no_run
/// use std::fs::File;
/// use novel_binder::export::{EpubConfig, EpubPackager, Packager};
/// # fn book() -> novel_binder::AssembledBook { unimplemented!() }
///
/// let mut file = File::create("output.epub")?;
/// let config = EpubConfig { compression_level: Some(9), ..Default::default() };
/// EpubPackager::new().with_config(config).package(&book(), &mut file)?;
/// # Ok::<(), novel_binder::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct EpubPackager {
    config: EpubConfig,
}

impl EpubPackager {
    /// Create a new packager with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the packager with custom settings.
    pub fn with_config(mut self, config: EpubConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EpubConfig {
        &self.config
    }
}

impl Packager for EpubPackager {
    fn package<W: Write + Seek>(&self, book: &AssembledBook, writer: &mut W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);

        let compression_level = self.config.compression_level.unwrap_or(6);
        // Fixed entry timestamps so identical books produce identical bytes.
        let base = SimpleFileOptions::default().last_modified_time(DateTime::default());
        let stored = base.compression_method(CompressionMethod::Stored);
        let deflated = base
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(compression_level as i64));

        let language = language_or_default(&book.metadata);

        // 1. Write mimetype (must be first, uncompressed)
        zip.start_file("mimetype", stored)?;
        zip.write_all(b"application/epub+zip")?;

        // 2. Write container.xml
        zip.start_file("META-INF/container.xml", deflated)?;
        zip.write_all(CONTAINER_XML)?;

        // 3. Collect manifest and spine
        let manifest = build_manifest(book, self.config.stylesheet);
        let spine_refs: Vec<&str> = book
            .spine
            .iter()
            .filter_map(|item| match item {
                SpineItem::Cover => book.cover.as_ref().map(|_| COVER_PAGE_ID),
                SpineItem::Nav => Some(NAV_ID),
                SpineItem::Document(id) => Some(id.as_str()),
            })
            .collect();

        // 4. Write content.opf
        let modified = self.config.modified.as_deref().unwrap_or(DEFAULT_MODIFIED);
        let opf = generate_opf(&book.metadata, modified, &manifest, &spine_refs);
        zip.start_file("OEBPS/content.opf", deflated)?;
        zip.write_all(opf.as_bytes())?;

        // 5. Write toc.ncx and nav.xhtml
        let toc = navigation_entries(book);
        zip.start_file("OEBPS/toc.ncx", deflated)?;
        zip.write_all(generate_ncx(&book.metadata, &toc).as_bytes())?;

        zip.start_file(format!("OEBPS/{NAV_FILE}"), deflated)?;
        zip.write_all(generate_nav(&toc, language, self.config.stylesheet).as_bytes())?;

        // 6. Write stylesheet
        if self.config.stylesheet {
            zip.start_file(format!("OEBPS/{STYLE_FILE}"), deflated)?;
            zip.write_all(DEFAULT_CSS)?;
        }

        // 7. Write cover image and cover page
        if let Some(cover) = &book.cover {
            zip.start_file(format!("OEBPS/{}", cover.file_name), stored)?;
            zip.write_all(&cover.data)?;

            zip.start_file(format!("OEBPS/{COVER_PAGE_FILE}"), deflated)?;
            zip.write_all(generate_cover_page(cover, language).as_bytes())?;
        }

        // 8. Write content documents, rewriting scraped HTML as XHTML
        for doc in &book.documents {
            let body = fragment_to_xhtml(&doc.body);
            zip.start_file(format!("OEBPS/{}", doc.file_name), deflated)?;
            zip.write_all(wrap_document(&doc.title, &body, language, self.config.stylesheet).as_bytes())?;
        }

        zip.finish()?;
        Ok(())
    }

    fn extension(&self) -> &'static str {
        "epub"
    }
}

/// Container.xml template.
const CONTAINER_XML: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

const DEFAULT_CSS: &[u8] = b"body { margin: 0 5%; text-align: justify; }
h1, h3 { text-align: center; }
img { max-width: 100%; }
nav ol { list-style-type: none; }
";

struct ManifestItem {
    id: String,
    href: String,
    media_type: String,
    properties: Option<&'static str>,
}

impl ManifestItem {
    fn new(id: impl Into<String>, href: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            href: href.into(),
            media_type: media_type.into(),
            properties: None,
        }
    }

    fn with_properties(mut self, properties: &'static str) -> Self {
        self.properties = Some(properties);
        self
    }
}

fn build_manifest(book: &AssembledBook, stylesheet: bool) -> Vec<ManifestItem> {
    let mut manifest = vec![
        ManifestItem::new("ncx", "toc.ncx", "application/x-dtbncx+xml"),
        ManifestItem::new(NAV_ID, NAV_FILE, "application/xhtml+xml").with_properties("nav"),
    ];

    if stylesheet {
        manifest.push(ManifestItem::new("style", STYLE_FILE, "text/css"));
    }

    if let Some(cover) = &book.cover {
        manifest.push(
            ManifestItem::new(COVER_IMAGE_ID, cover.file_name.as_str(), cover.media_type.as_str())
                .with_properties("cover-image"),
        );
        manifest.push(ManifestItem::new(
            COVER_PAGE_ID,
            COVER_PAGE_FILE,
            "application/xhtml+xml",
        ));
    }

    for doc in &book.documents {
        manifest.push(ManifestItem::new(
            doc.id.as_str(),
            doc.file_name.as_str(),
            "application/xhtml+xml",
        ));
    }

    manifest
}

fn language_or_default(metadata: &BookMetadata) -> &str {
    if metadata.language.is_empty() {
        "en"
    } else {
        &metadata.language
    }
}

/// Generate content.opf from metadata and manifest.
fn generate_opf(
    metadata: &BookMetadata,
    modified: &str,
    manifest: &[ManifestItem],
    spine_refs: &[&str],
) -> String {
    let mut opf = String::new();

    opf.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="BookId">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
"#,
    );

    opf.push_str(&format!(
        "    <dc:title>{}</dc:title>\n",
        escape(metadata.title.as_str())
    ));
    if !metadata.author.is_empty() {
        opf.push_str(&format!(
            "    <dc:creator id=\"creator\">{}</dc:creator>\n",
            escape(metadata.author.as_str())
        ));
    }
    opf.push_str(&format!(
        "    <dc:language>{}</dc:language>\n",
        escape(language_or_default(metadata))
    ));
    opf.push_str(&format!(
        "    <dc:identifier id=\"BookId\">{}</dc:identifier>\n",
        escape(metadata.identifier.as_str())
    ));
    if let Some(source) = &metadata.home_url {
        opf.push_str(&format!(
            "    <dc:source>{}</dc:source>\n",
            escape(source.as_str())
        ));
    }
    opf.push_str(&format!(
        "    <meta property=\"dcterms:modified\">{}</meta>\n",
        escape(modified)
    ));
    if manifest.iter().any(|item| item.id == COVER_IMAGE_ID) {
        // EPUB 2 readers look for this instead of the manifest property.
        opf.push_str(&format!(
            "    <meta name=\"cover\" content=\"{COVER_IMAGE_ID}\"/>\n"
        ));
    }
    opf.push_str("  </metadata>\n");

    // Manifest
    opf.push_str("  <manifest>\n");
    for item in manifest {
        let properties = item
            .properties
            .map(|p| format!(" properties=\"{p}\""))
            .unwrap_or_default();
        opf.push_str(&format!(
            "    <item id=\"{}\" href=\"{}\" media-type=\"{}\"{}/>\n",
            escape(item.id.as_str()),
            escape(item.href.as_str()),
            escape(item.media_type.as_str()),
            properties
        ));
    }
    opf.push_str("  </manifest>\n");

    // Spine
    opf.push_str("  <spine toc=\"ncx\">\n");
    for id in spine_refs {
        opf.push_str(&format!("    <itemref idref=\"{}\"/>\n", escape(*id)));
    }
    opf.push_str("  </spine>\n");

    opf.push_str("</package>\n");
    opf
}

/// TOC used for the NCX and nav document.
///
/// Both must list at least one entry, so a book without chapters points at
/// its first document (the intro page).
fn navigation_entries(book: &AssembledBook) -> Cow<'_, [TocEntry]> {
    if !book.toc.is_empty() {
        return Cow::Borrowed(&book.toc);
    }
    let entry = match book.documents.first() {
        Some(doc) => TocEntry::new(doc.title.as_str(), doc.file_name.as_str()),
        None => TocEntry::new("Table of Contents", NAV_FILE),
    };
    Cow::Owned(vec![entry])
}

fn toc_depth(entries: &[TocEntry]) -> usize {
    entries
        .iter()
        .map(|entry| 1 + toc_depth(&entry.children))
        .max()
        .unwrap_or(0)
}

/// Generate toc.ncx from TOC entries.
fn generate_ncx(metadata: &BookMetadata, toc: &[TocEntry]) -> String {
    let mut ncx = String::new();

    ncx.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE ncx PUBLIC "-//NISO//DTD ncx 2005-1//EN" "http://www.daisy.org/z3986/2005/ncx-2005-1.dtd">
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
"#,
    );
    ncx.push_str(&format!(
        "    <meta name=\"dtb:uid\" content=\"{}\"/>\n",
        escape(metadata.identifier.as_str())
    ));
    ncx.push_str(&format!(
        "    <meta name=\"dtb:depth\" content=\"{}\"/>\n",
        toc_depth(toc).max(1)
    ));
    ncx.push_str(
        r#"    <meta name="dtb:totalPageCount" content="0"/>
    <meta name="dtb:maxPageNumber" content="0"/>
  </head>
"#,
    );
    ncx.push_str(&format!(
        "  <docTitle>\n    <text>{}</text>\n  </docTitle>\n  <navMap>\n",
        escape(metadata.title.as_str())
    ));

    let mut play_order = 1;
    write_nav_points(&mut ncx, toc, &mut play_order, 2);

    ncx.push_str("  </navMap>\n</ncx>\n");
    ncx
}

/// Recursively write navPoint elements.
fn write_nav_points(ncx: &mut String, entries: &[TocEntry], play_order: &mut usize, indent: usize) {
    let indent_str = "  ".repeat(indent);

    for entry in entries {
        ncx.push_str(&format!(
            "{}<navPoint id=\"navPoint-{}\" playOrder=\"{}\">\n",
            indent_str, play_order, play_order
        ));
        ncx.push_str(&format!(
            "{}  <navLabel><text>{}</text></navLabel>\n",
            indent_str,
            escape(entry.title.as_str())
        ));
        ncx.push_str(&format!(
            "{}  <content src=\"{}\"/>\n",
            indent_str,
            escape(entry.href.as_str())
        ));

        *play_order += 1;

        if !entry.children.is_empty() {
            write_nav_points(ncx, &entry.children, play_order, indent + 1);
        }

        ncx.push_str(&format!("{}</navPoint>\n", indent_str));
    }
}

/// Generate the EPUB 3 navigation document.
fn generate_nav(toc: &[TocEntry], language: &str, stylesheet: bool) -> String {
    let mut body = String::from("<nav epub:type=\"toc\" id=\"toc\">\n<h1>Table of Contents</h1>\n");
    write_nav_list(&mut body, toc, 0);
    body.push_str("</nav>");

    wrap_document("Table of Contents", &body, language, stylesheet)
}

fn write_nav_list(out: &mut String, entries: &[TocEntry], indent: usize) {
    let indent_str = "  ".repeat(indent);
    out.push_str(&format!("{indent_str}<ol>\n"));
    for entry in entries {
        out.push_str(&format!(
            "{}  <li><a href=\"{}\">{}</a>",
            indent_str,
            escape(entry.href.as_str()),
            escape(entry.title.as_str())
        ));
        if !entry.children.is_empty() {
            out.push('\n');
            write_nav_list(out, &entry.children, indent + 2);
            out.push_str(&format!("{indent_str}  "));
        }
        out.push_str("</li>\n");
    }
    out.push_str(&format!("{indent_str}</ol>\n"));
}

fn generate_cover_page(cover: &ImageAsset, language: &str) -> String {
    let body = format!(
        "<div style=\"text-align: center\">\n  <img src=\"{}\" alt=\"Cover\" style=\"max-height: 100%; max-width: 100%\"/>\n</div>",
        escape(cover.file_name.as_str())
    );
    wrap_document("Cover", &body, language, false)
}

/// Wrap an XHTML body fragment in a document skeleton.
///
/// `body` must already be well-formed; an empty body gets the title as a
/// heading so the page is not blank.
fn wrap_document(title: &str, body: &str, language: &str, stylesheet: bool) -> String {
    let lang = escape(language);
    let title = escape(title);
    let mut out = String::with_capacity(body.len() + 512);

    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE html>\n");
    out.push_str(&format!(
        "<html xmlns=\"http://www.w3.org/1999/xhtml\" xmlns:epub=\"http://www.idpf.org/2007/ops\" lang=\"{lang}\" xml:lang=\"{lang}\">\n"
    ));
    out.push_str(&format!("<head>\n  <meta charset=\"UTF-8\"/>\n  <title>{title}</title>\n"));
    if stylesheet {
        out.push_str(&format!(
            "  <link rel=\"stylesheet\" type=\"text/css\" href=\"{STYLE_FILE}\"/>\n"
        ));
    }
    out.push_str("</head>\n<body>\n");
    if body.trim().is_empty() {
        out.push_str(&format!("<h1>{title}</h1>"));
    } else {
        out.push_str(body);
    }
    out.push_str("\n</body>\n</html>\n");
    out
}
