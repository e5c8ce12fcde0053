//! Article store - reads articles fresh from disk on every call

use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use super::{Article, ArticlePreview};
use crate::config::SiteConfig;

/// Errors produced by the article store
#[derive(Debug, Error)]
pub enum StoreError {
    /// No `<name>.md` exists in the articles directory
    #[error("article not found: {0}")]
    NotFound(String),

    /// The requested name is not a plain file name
    #[error("invalid article name: {0}")]
    InvalidName(String),

    /// Any other filesystem failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Read access to a directory of `.md` articles.
///
/// The store holds no content in memory; listing and retrieval re-read the
/// directory on each call, so dropping a file in or out of the directory is
/// immediately visible.
#[derive(Debug, Clone)]
pub struct ArticleStore {
    articles_dir: PathBuf,
    preview_lines: usize,
    preview_marker: String,
}

impl ArticleStore {
    /// Create a store over the given directory
    pub fn new<P: AsRef<Path>>(articles_dir: P, config: &SiteConfig) -> Self {
        Self {
            articles_dir: articles_dir.as_ref().to_path_buf(),
            preview_lines: config.preview.lines,
            preview_marker: config.preview.marker.clone(),
        }
    }

    /// List previews for every markdown file in the articles directory.
    ///
    /// Entries come back in directory-read order. A failure to scan the
    /// directory or to read any listed file fails the whole listing.
    pub fn list_previews(&self) -> Result<Vec<ArticlePreview>, StoreError> {
        let mut previews = Vec::new();

        for entry in WalkDir::new(&self.articles_dir)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = entry.map_err(std::io::Error::from)?;
            let path = entry.path();
            if !path.is_file() || !is_markdown_file(path) {
                continue;
            }

            let file_name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            let raw = fs::read_to_string(path)?;
            let modified = fs::metadata(path)
                .and_then(|m| m.modified())
                .ok()
                .map(DateTime::<Local>::from);

            previews.push(ArticlePreview {
                file_name,
                content: self.preview_of(&raw),
                modified,
            });
        }

        Ok(previews)
    }

    /// Load a single article by name (without extension), verbatim.
    pub fn load(&self, name: &str) -> Result<Article, StoreError> {
        if !is_valid_name(name) {
            return Err(StoreError::InvalidName(name.to_string()));
        }

        let path = self.articles_dir.join(format!("{}.md", name));
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Article {
                name: name.to_string(),
                raw,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(name.to_string()))
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    /// First `preview_lines` lines, right-trimmed, with the marker appended.
    ///
    /// The marker is appended even when the file is shorter than the cutoff.
    fn preview_of(&self, raw: &str) -> String {
        let head: Vec<&str> = raw.lines().take(self.preview_lines).collect();
        format!("{}{}", head.join("\n").trim_end(), self.preview_marker)
    }
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md")
        .unwrap_or(false)
}

/// Names must stay inside the articles directory
fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && !name.contains('\\') && name != "." && name != ".."
}
