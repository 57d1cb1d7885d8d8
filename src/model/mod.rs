//! Core data model for book assembly.
//!
//! This module contains:
//! - Input types handed over by the scraper (metadata, chapters, volumes)
//! - The narrow document model the packager consumes (documents, images,
//!   spine order, table of contents)

mod book;
mod document;

pub use book::{BookMetadata, Chapter, VolumeBucket};
pub use document::{AssembledBook, DocumentNode, ImageAsset, SpineItem, SpineOrder, TocEntry};
