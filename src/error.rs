//! # Tipos de Error
//! src/error.rs
//!
//! Errores que cruzan los límites de los módulos. Los errores de I/O
//! del pipeline de requests nunca llegan aquí: se convierten en contenido
//! vacío + un evento de log en el punto donde ocurren.

use thiserror::Error;

/// Configuración inválida
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Workers must be >= 1")]
    NoWorkers,

    #[error("Cache TTL must be > 0")]
    ZeroTtl,

    #[error("Sweep interval must be > 0")]
    ZeroSweepInterval,

    #[error("Document root must not be empty")]
    EmptyDocumentRoot,

    #[error("Log file name must not be empty")]
    EmptyLogFileName,
}

/// Fallos al escribir en un sink de log
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Log file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed log file {path}: {reason}")]
    MalformedLogFile { path: String, reason: String },

    #[error("Could not serialize log entry: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errores fatales del servidor (arranque)
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
