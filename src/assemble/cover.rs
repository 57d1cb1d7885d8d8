//! Cover image lookup.

use std::fs;
use std::path::Path;

use crate::model::ImageAsset;
use crate::report::{Fields, Reporter};

/// Extension used when the cover path has none.
const DEFAULT_EXTENSION: &str = "jpg";

/// Stem of the in-book image file name. Distinct from the `cover.xhtml`
/// page so no source extension can make the two collide.
const IMAGE_STEM: &str = "cover-image";

/// Load the cover image at `path`, if there is one.
///
/// Returns `None` when the path is unset, is not a regular file, or cannot be
/// read. The media type is `image/<extension>` with the extension taken
/// verbatim (lower-cased); the bytes are never sniffed. The image is stored
/// in the book as `cover-image.<extension>`.
pub fn resolve_cover(path: Option<&Path>, reporter: &dyn Reporter) -> Option<ImageAsset> {
    let path = path?;
    if !path.is_file() {
        return None;
    }

    let fields = Fields::new().with_path(path);
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            reporter.debug(&format!("Failed to read cover: {e}"), &fields);
            return None;
        }
    };

    reporter.info(&format!("Creating cover: {}", path.display()), &fields);
    let ext = cover_extension(path);
    Some(ImageAsset {
        file_name: format!("{IMAGE_STEM}.{ext}"),
        media_type: format!("image/{ext}"),
        data,
    })
}

fn cover_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .unwrap_or(DEFAULT_EXTENSION)
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Level, MemoryReporter};
    use tempfile::TempDir;

    #[test]
    fn test_unset_path_has_no_cover() {
        let reporter = MemoryReporter::new();
        assert!(resolve_cover(None, &reporter).is_none());
        assert!(reporter.entries().is_empty());
    }

    #[test]
    fn test_missing_file_has_no_cover() {
        let dir = TempDir::new().unwrap();
        let reporter = MemoryReporter::new();
        let path = dir.path().join("missing.png");
        assert!(resolve_cover(Some(&path), &reporter).is_none());
    }

    #[test]
    fn test_directory_is_not_a_cover() {
        let dir = TempDir::new().unwrap();
        let reporter = MemoryReporter::new();
        assert!(resolve_cover(Some(dir.path()), &reporter).is_none());
    }

    #[test]
    fn test_media_type_from_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Cover.PNG");
        fs::write(&path, b"\x89PNG fake").unwrap();

        let reporter = MemoryReporter::new();
        let cover = resolve_cover(Some(&path), &reporter).unwrap();
        assert_eq!(cover.media_type, "image/png");
        assert_eq!(cover.file_name, "cover-image.png");
        assert_eq!(cover.data, b"\x89PNG fake");

        let entries = reporter.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, Level::Info);
        assert_eq!(entries[0].path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_extension_is_trusted_verbatim() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cover.jpg");
        // PNG magic bytes, but the extension wins.
        fs::write(&path, b"\x89PNG").unwrap();

        let cover = resolve_cover(Some(&path), &MemoryReporter::new()).unwrap();
        assert_eq!(cover.media_type, "image/jpg");
    }

    #[test]
    fn test_missing_extension_uses_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cover");
        fs::write(&path, b"data").unwrap();

        let cover = resolve_cover(Some(&path), &MemoryReporter::new()).unwrap();
        assert_eq!(cover.file_name, "cover-image.jpg");
        assert_eq!(cover.media_type, "image/jpg");
    }

    #[test]
    fn test_page_extension_does_not_clash_with_cover_page() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("art.xhtml");
        fs::write(&path, b"<html/>").unwrap();

        let cover = resolve_cover(Some(&path), &MemoryReporter::new()).unwrap();
        assert_eq!(cover.file_name, "cover-image.xhtml");
        assert_ne!(cover.file_name, "cover.xhtml");
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cover.webp");
        fs::write(&path, [1u8, 2, 3, 4, 5]).unwrap();

        let reporter = MemoryReporter::new();
        let first = resolve_cover(Some(&path), &reporter).unwrap();
        let second = resolve_cover(Some(&path), &reporter).unwrap();
        assert_eq!(first, second);
    }
}
