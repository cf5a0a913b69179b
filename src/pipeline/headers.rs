//! # Headers de Respuesta
//! src/pipeline/headers.rs
//!
//! Conjunto fijo de headers, en el orden en que se envían.

use chrono::Utc;

/// Identidad del servidor en el header `Server`
pub const SERVER_NAME: &str = "file_server";

/// Formato RFC 1123 del header `Date`
pub const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// `Content-Type`, `Server` y `Date` (hora actual)
pub fn build_headers() -> Vec<(String, String)> {
    vec![
        ("Content-Type".to_string(), "text/html".to_string()),
        ("Server".to_string(), SERVER_NAME.to_string()),
        (
            "Date".to_string(),
            Utc::now().format(HTTP_DATE_FORMAT).to_string(),
        ),
    ]
}
