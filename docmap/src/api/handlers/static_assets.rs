//! HTTP handlers for the embedded forms.

use axum::{
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use tracing::{debug, instrument};

use crate::static_assets;

/// Map a request path onto an embedded file: directories resolve to their `index.html`.
fn asset_path(uri_path: &str) -> String {
    let path = uri_path.trim_matches('/');
    if path.is_empty() {
        return "index.html".to_string();
    }
    if path.rsplit('/').next().is_some_and(|segment| segment.contains('.')) {
        path.to_string()
    } else {
        format!("{path}/index.html")
    }
}

/// Serve an embedded asset, e.g. `/` (public form), `/admin` (admin form) or `/assets/admin.js`
#[instrument]
pub async fn serve_embedded_asset(uri: Uri) -> Response {
    let path = asset_path(uri.path());

    let Some(content) = static_assets::Assets::get(&path) else {
        debug!("No embedded asset at {}", path);
        return StatusCode::NOT_FOUND.into_response();
    };

    let mime = mime_guess::from_path(&path).first_or_octet_stream();

    // Scripts and styles are not content-hashed, so every asset is revalidated
    (
        [
            (header::CONTENT_TYPE, mime.as_ref().to_string()),
            (header::CACHE_CONTROL, "no-cache".to_string()),
        ],
        content.data.into_owned(),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum_test::TestServer;

    fn create_test_router() -> Router {
        Router::new().fallback(serve_embedded_asset)
    }

    #[test]
    fn test_asset_path() {
        assert_eq!(asset_path("/"), "index.html");
        assert_eq!(asset_path("/admin"), "admin/index.html");
        assert_eq!(asset_path("/admin/"), "admin/index.html");
        assert_eq!(asset_path("/assets/styles.css"), "assets/styles.css");
    }

    #[tokio::test]
    async fn test_serve_public_form() {
        let server = TestServer::new(create_test_router()).unwrap();

        let response = server.get("/").await;

        response.assert_status(StatusCode::OK);
        assert_eq!(response.header("content-type"), "text/html");
        assert_eq!(response.header("cache-control"), "no-cache");

        let text = response.text();
        assert!(text.contains("<!doctype html>"));
        assert!(text.contains(r#"dir="rtl""#));
        assert!(text.contains("/assets/public.js"));
    }

    #[tokio::test]
    async fn test_serve_admin_form() {
        let server = TestServer::new(create_test_router()).unwrap();

        for path in ["/admin", "/admin/"] {
            let response = server.get(path).await;
            response.assert_status(StatusCode::OK);
            assert_eq!(response.header("content-type"), "text/html");
            assert!(response.text().contains("/assets/admin.js"));
        }
    }

    #[tokio::test]
    async fn test_serve_scripts_and_styles() {
        let server = TestServer::new(create_test_router()).unwrap();

        let response = server.get("/assets/admin.js").await;
        response.assert_status(StatusCode::OK);
        assert!(response.header("content-type").to_str().unwrap().contains("javascript"));

        let response = server.get("/assets/styles.css").await;
        response.assert_status(StatusCode::OK);
        assert_eq!(response.header("content-type"), "text/css");
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let server = TestServer::new(create_test_router()).unwrap();

        server.get("/nothing/here").await.assert_status(StatusCode::NOT_FOUND);
        server.get("/missing.js").await.assert_status(StatusCode::NOT_FOUND);
    }
}
