//! Chapter documents and the volume-grouped table of contents.

use crate::model::{Chapter, DocumentNode, TocEntry};

/// Document id for the chapter at zero-based `index`.
pub fn chapter_id(index: usize) -> String {
    format!("chap_{:05}", index + 1)
}

/// Turn the chapter sequence into documents and a TOC grouped by volume.
///
/// Volume boundaries are found by comparing each chapter's volume id with the
/// next one, so a volume id that reappears later starts a new group. Each
/// group points at its first chapter and lists all of its chapters in order.
pub fn build_chapters(chapters: &[Chapter]) -> (Vec<DocumentNode>, Vec<TocEntry>) {
    let mut documents = Vec::with_capacity(chapters.len());
    let mut toc = Vec::new();
    let mut volume: Vec<TocEntry> = Vec::new();

    for (i, chapter) in chapters.iter().enumerate() {
        let id = chapter_id(i);
        let file_name = format!("{id}.xhtml");
        volume.push(TocEntry::new(chapter.title.clone(), file_name.clone()));
        documents.push(DocumentNode::new(id, file_name, chapter.title.clone(), chapter.body.clone()));

        let is_boundary = chapters
            .get(i + 1)
            .is_none_or(|next| next.volume != chapter.volume);
        if is_boundary {
            let href = volume[0].href.clone();
            let children = std::mem::take(&mut volume);
            toc.push(TocEntry::new(chapter.volume_title.clone(), href).with_children(children));
        }
    }

    (documents, toc)
}
