//! Article and preview models

use chrono::{DateTime, Local};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};

/// Characters escaped inside a URL path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?')
    .add(b'%')
    .add(b'/');

/// A single blog article, identified by its file name without extension.
///
/// Articles are never stored in memory between requests; an `Article` is the
/// result of one fresh read from disk.
#[derive(Debug, Clone, Serialize)]
pub struct Article {
    /// File name without the `.md` extension
    pub name: String,
    /// Raw markdown content, byte-for-byte as on disk
    pub raw: String,
}

impl Article {
    /// Link to this article's detail view
    pub fn href(&self) -> String {
        article_href(&self.name)
    }
}

/// A truncated view of an article's opening lines, shown in the list view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePreview {
    /// File name without the `.md` extension
    pub file_name: String,
    /// Leading lines of the raw markdown, right-trimmed, marker appended
    pub content: String,
    /// File modification time, when the filesystem reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Local>>,
}

/// Build the detail-view link for an article name.
///
/// Names may contain spaces or other characters that are not URL-safe.
pub fn article_href(name: &str) -> String {
    format!("/article/{}", utf8_percent_encode(name, PATH_SEGMENT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_href_plain() {
        assert_eq!(article_href("hello"), "/article/hello");
    }

    #[test]
    fn test_article_href_encodes_spaces() {
        assert_eq!(article_href("my post"), "/article/my%20post");
    }

    #[test]
    fn test_preview_json_shape() {
        let preview = ArticlePreview {
            file_name: "hello".to_string(),
            content: "# Hello...".to_string(),
            modified: None,
        };
        let json = serde_json::to_value(&preview).unwrap();
        assert_eq!(json["fileName"], "hello");
        assert_eq!(json["content"], "# Hello...");
        assert!(json.get("modified").is_none());
    }
}
