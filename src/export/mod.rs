//! Packaging of assembled books into container files.
//!
//! Provides the `Packager` trait and the EPUB implementation.
//!
//! # Architecture
//!
//! The `Packager` trait uses a builder pattern:
//! - `new()` creates a packager with default configuration
//! - `with_config()` allows customization
//! - `package()` writes to any `Write + Seek` destination
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//! use novel_binder::export::{EpubPackager, Packager};
//! use novel_binder::{AssembledBook, BookMetadata};
//!
//! let book = AssembledBook {
//!     metadata: BookMetadata::new("Empty").with_identifier("empty-1"),
//!     cover: None,
//!     documents: Vec::new(),
//!     spine: Vec::new(),
//!     toc: Vec::new(),
//! };
//! let mut out = Cursor::new(Vec::new());
//! EpubPackager::new().package(&book, &mut out)?;
//! assert!(!out.into_inner().is_empty());
//! # Ok::<(), novel_binder::Error>(())
//! ```

use std::io::{Seek, Write};

use crate::error::Result;
use crate::model::AssembledBook;

mod epub;

pub use epub::{EpubConfig, EpubPackager};

/// Serializes an assembled book into a container format.
///
/// The assembler never inspects the emitted bytes; any failure here is fatal
/// for the book being written.
pub trait Packager {
    /// Write the book to the provided writer.
    ///
    /// The writer can be:
    /// - `std::fs::File` (or a `BufWriter` around one) for disk output
    /// - `std::io::Cursor<Vec<u8>>` for seekable in-memory output
    fn package<W: Write + Seek>(&self, book: &AssembledBook, writer: &mut W) -> Result<()>;

    /// File extension of the produced container, without the dot.
    fn extension(&self) -> &'static str;
}
