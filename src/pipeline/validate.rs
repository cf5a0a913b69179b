//! # Validación del Request
//! src/pipeline/validate.rs

use crate::http::request::{method_token, request_line};
use crate::http::Method;

/// Mínimo de tokens en la request line: método y ruta
pub const MIN_TOKENS: usize = 2;

/// Un request es válido si su método es reconocido y la request line
/// tiene al menos método y ruta
///
/// # Ejemplo
/// ```
/// use file_server::pipeline::validate_request;
///
/// assert!(validate_request("GET / HTTP/1.0\r\n\r\n"));
/// assert!(!validate_request("DELETE / HTTP/1.0\r\n\r\n"));
/// ```
pub fn validate_request(raw: &str) -> bool {
    let recognized = method_token(raw).and_then(Method::from_token).is_some();
    recognized && request_line(raw).split_whitespace().count() >= MIN_TOKENS
}
