//! Shared helpers for HTTP and database tests.

use crate::config::{Config, DatabaseConfig, PoolSettings, UploadConfig};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::{TestResponse, TestServer};
use sqlx::PgPool;

/// Upload limit used by [`create_test_config`], small enough to exceed cheaply in tests
pub const TEST_MAX_FILE_SIZE: u64 = 16 * 1024;

pub async fn create_test_app(pool: PgPool) -> TestServer {
    let config = create_test_config();

    let app = crate::Application::new_with_pool(config, Some(pool))
        .await
        .expect("Failed to create application");

    app.into_test_server()
}

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database: DatabaseConfig {
            // The pool is handed over directly
            url: None,
            pool: PoolSettings {
                max_connections: 2,
                min_connections: 0,
                ..Default::default()
            },
        },
        uploads: UploadConfig {
            max_file_size: TEST_MAX_FILE_SIZE,
        },
        enable_metrics: false,
        enable_otel_export: false,
        ..Default::default()
    }
}

/// A `file` part carrying a PDF mime type
pub fn pdf_part(file_name: &str, content: Vec<u8>) -> Part {
    Part::bytes(content).file_name(file_name).mime_type("application/pdf")
}

/// POST a mapping form with both identifiers and the given file part
pub async fn upload_mapping(server: &TestServer, id_number: &str, serial_number: &str, file: Part) -> TestResponse {
    server
        .post("/mappings")
        .multipart(
            MultipartForm::new()
                .add_text("idNumber", id_number)
                .add_text("serialNumber", serial_number)
                .add_part("file", file),
        )
        .await
}
