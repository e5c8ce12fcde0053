//! HTTP server - content API, static assets, and server-rendered pages

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Path as RoutePath, State},
    http::{header, HeaderValue, Request, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use percent_encoding::percent_decode_str;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::{article_href, ArticleStore, MarkdownRenderer, StoreError};
use crate::templates::{PreviewItem, TemplateRenderer};
use crate::Blog;

/// Cache policy for pre-built client assets
const STATIC_CACHE_CONTROL: &str = "public, max-age=31536000";

/// Server state shared by all request handlers
struct ServerState {
    store: ArticleStore,
    renderer: MarkdownRenderer,
    templates: TemplateRenderer,
    static_dir: PathBuf,
}

/// Start the blog server
pub async fn start(blog: &Blog, ip: &str, port: u16) -> Result<()> {
    let app = router(blog)?;

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router
pub fn router(blog: &Blog) -> Result<Router> {
    let state = Arc::new(ServerState {
        store: ArticleStore::new(&blog.articles_dir, &blog.config),
        renderer: MarkdownRenderer::with_options(
            &blog.config.highlight.theme,
            blog.config.highlight.enable,
        ),
        templates: TemplateRenderer::new(&blog.config)?,
        static_dir: blog.static_dir.clone(),
    });

    Ok(Router::new()
        .route("/api/articles", get(list_articles))
        .route("/api/articles/:name", get(get_article))
        .fallback(page_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// GET /api/articles - preview listing as JSON
async fn list_articles(State(state): State<Arc<ServerState>>) -> Response {
    match state.store.list_previews() {
        Ok(previews) => Json(previews).into_response(),
        Err(e) => {
            tracing::error!("Error scanning articles directory: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Unable to scan directory" })),
            )
                .into_response()
        }
    }
}

/// GET /api/articles/:name - raw markdown text
async fn get_article(
    State(state): State<Arc<ServerState>>,
    RoutePath(name): RoutePath<String>,
) -> Response {
    match state.store.load(&name) {
        Ok(article) => article.raw.into_response(),
        Err(StoreError::NotFound(_)) | Err(StoreError::InvalidName(_)) => {
            (StatusCode::NOT_FOUND, "Article not found").into_response()
        }
        Err(e) => {
            tracing::error!("Error reading article {}: {}", name, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Unable to read article").into_response()
        }
    }
}

/// Fallback handler: pre-built client assets first, then rendered pages
async fn page_handler(State(state): State<Arc<ServerState>>, request: Request<Body>) -> Response {
    let uri = request.uri().clone();

    if let Some(response) = serve_static(&state.static_dir, request).await {
        return response;
    }

    render_page(&state, &uri)
}

/// Try the static directory; misses fall through to page rendering
async fn serve_static(static_dir: &Path, request: Request<Body>) -> Option<Response> {
    let mut service = ServeDir::new(static_dir).append_index_html_on_directories(false);

    match service.try_call(request).await {
        Ok(response) if response.status() != StatusCode::NOT_FOUND => {
            let mut response = response.into_response();
            response.headers_mut().insert(
                header::CACHE_CONTROL,
                HeaderValue::from_static(STATIC_CACHE_CONTROL),
            );
            Some(response)
        }
        _ => None,
    }
}

/// Dispatch a request path to the matching server-rendered page
fn render_page(state: &ServerState, uri: &Uri) -> Response {
    let path = uri.path();

    let result = if path == "/" {
        home_page(state)
    } else if let Some(raw_name) = path.strip_prefix("/article/") {
        let name = percent_decode_str(raw_name).decode_utf8_lossy();
        article_page(state, &name)
    } else {
        not_found_page(state, None)
    };

    match result {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Page render failed for {}: {}", path, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<h1>Server error</h1>".to_string()),
            )
                .into_response()
        }
    }
}

/// Home view: every preview converted to HTML, linked by file name
fn home_page(state: &ServerState) -> Result<Response> {
    let previews = state.store.list_previews()?;

    let items: Vec<PreviewItem> = previews
        .into_iter()
        .map(|p| PreviewItem {
            href: article_href(&p.file_name),
            content: state.renderer.render(&p.content),
            file_name: p.file_name,
            modified: p.modified,
        })
        .collect();

    let html = state.templates.render_home(&items)?;
    Ok(Html(html).into_response())
}

/// Article detail view
fn article_page(state: &ServerState, name: &str) -> Result<Response> {
    match state.store.load(name) {
        Ok(article) => {
            let content = state.renderer.render(&article.raw);
            let html = state.templates.render_article(&article.name, &content)?;
            Ok(Html(html).into_response())
        }
        Err(StoreError::NotFound(_)) | Err(StoreError::InvalidName(_)) => {
            not_found_page(state, Some(name))
        }
        Err(e) => Err(e.into()),
    }
}

/// Visible not-found state, optionally naming the missing article
fn not_found_page(state: &ServerState, name: Option<&str>) -> Result<Response> {
    let html = state.templates.render_not_found(name)?;
    Ok((StatusCode::NOT_FOUND, Html(html)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;
    use std::fs;
    use tempfile::TempDir;
    use tower::util::ServiceExt;

    fn blog_in(dir: &TempDir) -> Blog {
        fs::create_dir_all(dir.path().join("articles")).unwrap();
        Blog::new(dir.path()).unwrap()
    }

    async fn get_response(app: Router, uri: &str) -> Response {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        app.oneshot(req).await.unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_api_listing_returns_all_markdown_files() {
        let dir = TempDir::new().unwrap();
        let blog = blog_in(&dir);
        fs::write(blog.articles_dir.join("a.md"), "1\n2\n3\n4\n5").unwrap();
        fs::write(blog.articles_dir.join("b.md"), "x\ny").unwrap();
        fs::write(blog.articles_dir.join("skip.txt"), "nope").unwrap();

        let resp = get_response(router(&blog).unwrap(), "/api/articles").await;
        assert_eq!(resp.status(), StatusCode::OK);

        let json: Value = serde_json::from_str(&body_string(resp).await).unwrap();
        let mut entries = json.as_array().unwrap().clone();
        entries.sort_by_key(|e| e["fileName"].as_str().unwrap().to_string());

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["fileName"], "a");
        assert_eq!(entries[0]["content"], "1\n2\n3\n4...");
        assert_eq!(entries[1]["fileName"], "b");
        assert_eq!(entries[1]["content"], "x\ny...");
    }

    #[tokio::test]
    async fn test_api_listing_scan_failure_returns_500() {
        let dir = TempDir::new().unwrap();
        let blog = blog_in(&dir);
        fs::remove_dir(&blog.articles_dir).unwrap();

        let resp = get_response(router(&blog).unwrap(), "/api/articles").await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json: Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(json["error"], "Unable to scan directory");
    }

    #[tokio::test]
    async fn test_api_get_article_returns_raw_text() {
        let dir = TempDir::new().unwrap();
        let blog = blog_in(&dir);
        let text = "# Hello\n\nsome *markdown*, untouched\n";
        fs::write(blog.articles_dir.join("hello.md"), text).unwrap();

        let resp = get_response(router(&blog).unwrap(), "/api/articles/hello").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_string(resp).await, text);
    }

    #[tokio::test]
    async fn test_api_get_missing_article_returns_404_not_500() {
        let dir = TempDir::new().unwrap();
        let blog = blog_in(&dir);

        let resp = get_response(router(&blog).unwrap(), "/api/articles/ghost").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(resp).await, "Article not found");
    }

    #[tokio::test]
    async fn test_api_get_rejects_traversal_names() {
        let dir = TempDir::new().unwrap();
        let blog = blog_in(&dir);
        fs::write(dir.path().join("secret.md"), "private").unwrap();

        let resp = get_response(router(&blog).unwrap(), "/api/articles/..%2Fsecret").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_home_page_renders_preview_list() {
        let dir = TempDir::new().unwrap();
        let blog = blog_in(&dir);
        fs::write(blog.articles_dir.join("post.md"), "# Post Title\n\nintro").unwrap();

        let resp = get_response(router(&blog).unwrap(), "/").await;
        assert_eq!(resp.status(), StatusCode::OK);

        let html = body_string(resp).await;
        assert!(html.contains(r#"href="/article/post""#));
        assert!(html.contains("<h1>Post Title</h1>"));
    }

    #[tokio::test]
    async fn test_article_page_renders_markdown_as_html() {
        let dir = TempDir::new().unwrap();
        let blog = blog_in(&dir);
        fs::write(
            blog.articles_dir.join("post.md"),
            "# Title\n\na paragraph with [a link](/somewhere)",
        )
        .unwrap();

        let resp = get_response(router(&blog).unwrap(), "/article/post").await;
        assert_eq!(resp.status(), StatusCode::OK);

        let html = body_string(resp).await;
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains(r#"<a href="/somewhere">a link</a>"#));
    }

    #[tokio::test]
    async fn test_article_page_missing_shows_not_found_state() {
        let dir = TempDir::new().unwrap();
        let blog = blog_in(&dir);

        let resp = get_response(router(&blog).unwrap(), "/article/ghost").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let html = body_string(resp).await;
        assert!(html.contains("Article not found"));
        assert!(html.contains("ghost"));
    }

    #[tokio::test]
    async fn test_static_asset_served_with_cache_header() {
        let dir = TempDir::new().unwrap();
        let blog = blog_in(&dir);
        fs::create_dir_all(&blog.static_dir).unwrap();
        fs::write(blog.static_dir.join("app.js"), "console.log('hi');").unwrap();

        let resp = get_response(router(&blog).unwrap(), "/app.js").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CACHE_CONTROL).unwrap(),
            STATIC_CACHE_CONTROL
        );
    }

    #[tokio::test]
    async fn test_unknown_route_falls_through_to_not_found_page() {
        let dir = TempDir::new().unwrap();
        let blog = blog_in(&dir);

        let resp = get_response(router(&blog).unwrap(), "/no/such/page").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(body_string(resp).await.contains("Page not found"));
    }
}
