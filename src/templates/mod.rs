//! Page templates using the Tera template engine
//!
//! All templates are embedded directly in the binary. Auto-escaping stays
//! enabled; markdown output enters the page only as [`SafeHtml`] through the
//! `safe` filter.

use anyhow::Result;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::SafeHtml;

/// One entry of the home view's article list
#[derive(Debug, Clone, Serialize)]
pub struct PreviewItem {
    /// File name without the `.md` extension
    pub file_name: String,
    /// Link to the detail view
    pub href: String,
    /// Rendered preview markdown
    pub content: SafeHtml,
    /// File modification time, shown as the published date
    pub modified: Option<DateTime<Local>>,
}

/// Renders full HTML pages from embedded templates
pub struct TemplateRenderer {
    tera: Tera,
    config: SiteConfig,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("theme/layout.html")),
            ("home.html", include_str!("theme/home.html")),
            ("article.html", include_str!("theme/article.html")),
            ("not_found.html", include_str!("theme/not_found.html")),
        ])?;

        tera.register_filter("date_format", date_format_filter);

        Ok(Self {
            tera,
            config: config.clone(),
        })
    }

    /// Render the home view: a list of previews linking to detail views
    pub fn render_home(&self, previews: &[PreviewItem]) -> Result<String> {
        let mut context = self.base_context();
        context.insert("previews", previews);
        Ok(self.tera.render("home.html", &context)?)
    }

    /// Render the article detail view
    pub fn render_article(&self, name: &str, content: &SafeHtml) -> Result<String> {
        let mut context = self.base_context();
        context.insert("name", name);
        context.insert("content", content);
        Ok(self.tera.render("article.html", &context)?)
    }

    /// Render the not-found page, optionally naming the missing article
    pub fn render_not_found(&self, name: Option<&str>) -> Result<String> {
        let mut context = self.base_context();
        if let Some(name) = name {
            context.insert("name", name);
        }
        Ok(self.tera.render("not_found.html", &context)?)
    }

    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site_title", &self.config.title);
        context.insert("description", &self.config.description);
        context.insert("author", &self.config.author);
        context.insert("language", &self.config.language);
        context
    }
}

/// Tera filter: format an RFC 3339 timestamp for display
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = args
        .get("format")
        .and_then(|v| v.as_str())
        .unwrap_or("%Y-%m-%d");

    let date = DateTime::parse_from_rfc3339(&s)
        .map_err(|e| tera::Error::msg(format!("date_format: invalid date '{}': {}", s, e)))?;

    Ok(tera::Value::String(date.format(format).to_string()))
}
