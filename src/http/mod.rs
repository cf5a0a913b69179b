//! # Módulo HTTP
//! src/http/mod.rs
//!
//! Lo mínimo de HTTP/1.0 que necesita el servidor de archivos:
//!
//! - Extraer método y ruta de la request line
//! - Construir la respuesta (status line, headers en orden, body)
//! - Los tres códigos de estado que produce el pipeline
//!
//! Cada conexión atiende un solo request; no hay keep-alive.

pub mod request; // Request line: método y ruta
pub mod response; // Construcción de respuestas
pub mod status; // 200 / 400 / 404

pub use request::{parse_route, Method};
pub use response::Response;
pub use status::StatusCode;
