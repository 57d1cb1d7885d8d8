//! # novel-binder
//!
//! Binds scraped novel chapters into EPUB books, one file per volume.
//!
//! ## Features
//!
//! - Groups an ordered chapter list into a volume-level table of contents
//! - Generates an intro page with title, author, cover and source link
//! - Picks up a cover image from disk, and carries on without one
//! - Rewrites scraped chapter HTML as well-formed XHTML
//! - Writes EPUB 3 (with NCX) through a swappable [`export::Packager`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use novel_binder::{BindOptions, BookMetadata, Chapter, VolumeBucket, bind_volumes};
//!
//! let metadata = BookMetadata::new("My Novel")
//!     .with_author("Author Name")
//!     .with_home_url("https://novels.example/")
//!     .with_cover("cover.jpg");
//! let options = BindOptions::new("output", "My Novel").with_metadata(metadata);
//!
//! let chapters = vec![
//!     Chapter::new("Prologue", "<p>...</p>").in_volume("1", "Volume 1"),
//!     Chapter::new("Chapter 1", "<p>...</p>").in_volume("1", "Volume 1"),
//! ];
//! let written = bind_volumes(options, &[VolumeBucket::new("Vol 1", chapters)])?;
//! // output/epub/My Novel Vol 1.epub
//! # Ok::<(), novel_binder::Error>(())
//! ```
//!
//! ## Chapter order
//!
//! Chapters are never re-sorted. Callers must supply them in reading order with
//! each volume contiguous; a volume id that reappears later produces a second
//! TOC group with the same label.

pub mod assemble;
pub mod dom;
mod error;
pub mod export;
#[cfg(feature = "cli")]
pub mod manifest;
pub mod model;
pub mod report;

pub use assemble::{BindOptions, BookAssembler, bind_volumes};
pub use error::{Error, Result};
pub use model::{
    AssembledBook, BookMetadata, Chapter, DocumentNode, ImageAsset, SpineItem, SpineOrder,
    TocEntry, VolumeBucket,
};
pub use report::{Fields, Level, MemoryReporter, Reporter, TracingReporter};
