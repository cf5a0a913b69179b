//! # Pipeline de Logging
//! src/logging/mod.rs
//!
//! Logging asíncrono de muchos productores y un solo consumidor:
//!
//! - `task`: mensajes (`LogTask`), niveles, destinos y el registro JSON de requests
//! - `handle`: lado productor (`LogHandle`), se clona a cada componente
//! - `logger`: thread consumidor (`Logger`) y despacho a los sinks
//! - `sink`: consola y archivo JSON con forma de array

pub mod handle;
pub mod logger;
pub mod sink;
pub mod task;

pub use handle::LogHandle;
pub use logger::{LogSinks, Logger};
pub use sink::JsonArrayFile;
pub use task::{LogLevel, LogSink, LogTask, RequestRecord};
