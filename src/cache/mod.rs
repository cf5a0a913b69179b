//! # Cache de Archivos
//! src/cache/mod.rs
//!
//! - `entry`: contenido + último acceso
//! - `manager`: `ContentCache` (lectores-escritores) y el `Sweeper` de TTL

pub mod entry;
pub mod manager;

pub use entry::CacheEntry;
pub use manager::{ContentCache, Sweeper, DEFAULT_SWEEP_INTERVAL};
