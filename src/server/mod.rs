//! # Módulo del Servidor
//! src/server/mod.rs
//!
//! Transporte TCP: acepta conexiones, lee la cabecera del request y se la
//! pasa al pipeline dentro de un worker del pool.

pub mod tcp;

pub use tcp::{serve_connection, Server};
