//! # Pipeline de Requests
//! src/pipeline/mod.rs
//!
//! - `source`: lectura de disco detrás del trait `ContentSource`
//! - `fetch`: `FileService`, resolución de rutas y lectura vía cache
//! - `validate`: predicado sobre el request crudo
//! - `headers`: headers fijos de la respuesta
//! - `handler`: `RequestPipeline`, fan-out de los tres sub-tasks y respuesta

pub mod fetch;
pub mod handler;
pub mod headers;
pub mod source;
pub mod validate;

pub use fetch::FileService;
pub use handler::RequestPipeline;
pub use headers::build_headers;
pub use source::{ContentSource, FsSource};
pub use validate::validate_request;
