//! # File Server
//! src/lib.rs
//!
//! Servidor de archivos HTTP concurrente construido sobre primitivas de
//! sincronización clásicas: locks FIFO por archivo, cache con protocolo de
//! lectores-escritores, logging de muchos productores y un consumidor, y un
//! pool fijo de workers.
//!
//! ## Arquitectura
//!
//! - `config`: Configuración por CLI y variables de entorno
//! - `error`: Tipos de error
//! - `sync`: Semáforo y mutex FIFO, cola bloqueante, interrupción y `ResourceMonitor`
//! - `cache`: `ContentCache` con TTL y su thread de barrido
//! - `logging`: Cola de logs, consumidor y sinks (consola y archivo JSON)
//! - `http`: Request line, respuestas y códigos de estado
//! - `pipeline`: Fan-out de cada request en tres sub-tasks
//! - `pool`: `WorkDispatcher`, pool de workers de tamaño fijo
//! - `server`: Transporte TCP
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use file_server::config::Config;
//! use file_server::server::Server;
//!
//! let config = Config::default();
//! let server = Server::bind(config).expect("Error al iniciar servidor");
//! server.run().expect("Error en el loop de accept");
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod pipeline;
pub mod pool;
pub mod server;
pub mod sync;
