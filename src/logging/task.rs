//! # Tareas de Log
//! src/logging/task.rs
//!
//! Un `LogTask` es un mensaje inmutable: nivel, destino, texto y el
//! instante en que se creó. Lo produce cualquier componente y lo consume
//! exactamente una vez el thread del `Logger`.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Formato del timestamp en el log de requests
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Severidad o categoría del mensaje
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    /// Resultado de un request (formato JSON especial)
    Request,
}

impl LogLevel {
    /// Prefijo usado en las líneas de texto
    pub fn tag(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Request => "REQUEST",
        }
    }
}

/// Destino del mensaje
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogSink {
    ConsoleOut,
    ConsoleErr,
    /// Archivo JSON (un array de entradas)
    File,
}

/// Mensaje de log inmutable
#[derive(Debug, Clone)]
pub struct LogTask {
    level: LogLevel,
    sink: LogSink,
    message: String,
    created_at: DateTime<Local>,
}

impl LogTask {
    pub fn new(level: LogLevel, sink: LogSink, message: impl Into<String>) -> Self {
        Self {
            level,
            sink,
            message: message.into(),
            created_at: Local::now(),
        }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn sink(&self) -> LogSink {
        self.sink
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    /// Línea de texto con prefijo: `[INFO] mensaje`
    pub fn format_line(&self) -> String {
        format!("[{}] {}", self.level.tag(), self.message)
    }
}

/// Entrada del log de requests, tal como se escribe en el archivo
///
/// ```text
/// {"timestamp":"...","method":"GET","route":"/","origin":"127.0.0.1","status":200}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub timestamp: String,
    pub method: String,
    pub route: String,
    pub origin: String,
    pub status: u16,
}

impl RequestRecord {
    /// Mensaje que viaja en la cola: `METHOD ROUTE STATUS ORIGIN`
    pub fn message(method: &str, route: &str, status: u16, origin: &str) -> String {
        format!("{} {} {} {}", method, route, status, origin)
    }

    /// Reconstruye el registro a partir de un `LogTask` de nivel Request
    ///
    /// Retorna `None` si el mensaje no tiene los 4 tokens o el status no
    /// es numérico.
    pub fn from_task(task: &LogTask) -> Option<Self> {
        let mut tokens = task.message().split_whitespace();
        let method = tokens.next()?;
        let route = tokens.next()?;
        let status = tokens.next()?.parse::<u16>().ok()?;
        let origin = tokens.next()?;

        Some(Self {
            timestamp: task.created_at().format(TIMESTAMP_FORMAT).to_string(),
            method: method.to_string(),
            route: route.to_string(),
            origin: origin.to_string(),
            status,
        })
    }
}
