//! Synthetic front-matter page.

use quick_xml::escape::escape;

use crate::model::{DocumentNode, ImageAsset};

/// Link target of the attribution line.
pub const PROJECT_URL: &str = "https://github.com/dipu-bd/lightnovel-crawler";

const PROJECT_NAME: &str = "Lightnovel Crawler";

pub const INTRO_ID: &str = "intro";
pub const INTRO_FILE: &str = "intro.xhtml";

const CONTAINER_STYLE: &[&str] = &[
    "min-height: 6.5in",
    "display: flex",
    "text-align: center",
    "flex-direction: column",
    "justify-content: space-between",
];

const COVER_STYLE: &[&str] = &[
    "max-height: 65%",
    "min-height: 3.0in",
    "object-fit: contain",
    "object-position: center center",
];

/// Build the intro page.
///
/// The body lists, in order: title, author, the cover (when present), a
/// source link and one attribution link. Missing or empty title and author
/// render as `N/A`; a missing home URL renders as `Unknown`.
pub fn build_intro(
    title: Option<&str>,
    author: Option<&str>,
    home_url: Option<&str>,
    cover: Option<&ImageAsset>,
) -> DocumentNode {
    let title = or_fallback(title, "N/A");
    let author = or_fallback(author, "N/A");
    let source = escape(or_fallback(home_url, "Unknown"));

    let mut html = format!("<div style=\"{}\">\n", CONTAINER_STYLE.join(";"));
    html.push_str(&format!(
        "  <div>\n    <h1>{}</h1>\n    <h3>{}</h3>\n  </div>\n",
        escape(title),
        escape(author)
    ));

    if let Some(cover) = cover {
        html.push_str(&format!(
            "  <img id=\"cover\" alt=\"Cover\" src=\"{}\" style=\"{}\"/>\n",
            escape(cover.file_name.as_str()),
            COVER_STYLE.join("; ")
        ));
    }

    html.push_str(&format!(
        "  <div>\n    <b>Source:</b> <a href=\"{source}\">{source}</a><br/>\n    \
         <i>Generated by <b><a href=\"{PROJECT_URL}\">{PROJECT_NAME}</a></b></i>\n  </div>\n"
    ));
    html.push_str("</div>");

    DocumentNode::new(INTRO_ID, INTRO_FILE, "Intro", html)
}

fn or_fallback<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => fallback,
    }
}
