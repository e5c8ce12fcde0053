//! Content module - article models, the on-disk store, and markdown rendering

mod article;
mod markdown;
pub mod store;

pub use article::{article_href, Article, ArticlePreview};
pub use markdown::{MarkdownRenderer, SafeHtml};
pub use store::{ArticleStore, StoreError};
