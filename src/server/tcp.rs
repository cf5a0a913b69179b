//! # Servidor TCP
//! src/server/tcp.rs
//!
//! Transporte del servidor de archivos: acepta conexiones y se las pasa
//! al pool de workers. Cada worker lee la cabecera del request, la entrega
//! al `RequestPipeline` junto con la IP del cliente y cierra la conexión.
//!
//! Arranque (un solo objeto de cada tipo, inyectado a quien lo use):
//!
//! ```text
//! LogHandle ──► ResourceMonitor ──► Logger (consola + archivo JSON)
//!     │                │
//!     ├──► ContentCache ──► Sweeper
//!     │                │
//!     └──► FileService ─┴─► RequestPipeline ──► WorkDispatcher ◄── accept()
//! ```

use crate::cache::{ContentCache, Sweeper};
use crate::config::Config;
use crate::error::ServerError;
use crate::logging::{LogHandle, LogSinks, Logger};
use crate::pipeline::{ContentSource, FileService, FsSource, RequestPipeline};
use crate::pool::WorkDispatcher;
use crate::sync::ResourceMonitor;
use std::io::{self, BufRead, BufReader, Read};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::time::Duration;

/// Tamaño máximo de la cabecera de un request
pub const MAX_REQUEST_HEAD: usize = 8192;

/// Tiempo máximo esperando datos del cliente
pub const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Servidor de archivos concurrente
///
/// El orden de los campos es el orden de apagado: primero dejan de
/// atenderse requests, luego se detiene el barrido y al final el logger.
pub struct Server {
    listener: TcpListener,
    dispatcher: WorkDispatcher,
    pipeline: Arc<RequestPipeline>,
    cache: Arc<ContentCache>,
    sweeper: Sweeper,
    logger: Logger,
    log: LogHandle,
    config: Config,
}

impl Server {
    /// Arma todos los componentes y abre el socket, leyendo del disco
    pub fn bind(config: Config) -> Result<Self, ServerError> {
        Self::with_source(config, Arc::new(FsSource))
    }

    /// Igual que `bind`, con otra fuente de contenido
    pub fn with_source(config: Config, source: Arc<dyn ContentSource>) -> Result<Self, ServerError> {
        config.validate()?;

        let log = LogHandle::new();
        let monitor = Arc::new(ResourceMonitor::new(log.clone()));
        let logger = Logger::spawn(
            &log,
            LogSinks::stdio(config.log_file_path(), Arc::clone(&monitor)),
        );

        let cache = Arc::new(ContentCache::new(config.cache_ttl(), log.clone()));
        let sweeper = cache.start_sweeper(config.sweep_interval());

        let files = FileService::new(
            &config,
            Arc::clone(&cache),
            monitor,
            source,
            log.clone(),
        );
        let pipeline = Arc::new(RequestPipeline::new(&config, files, log.clone()));
        let dispatcher = WorkDispatcher::new(config.workers, log.clone());

        let listener = TcpListener::bind(config.address())?;
        log.info(format!("Server listening on {}", listener.local_addr()?));

        Ok(Self {
            listener,
            dispatcher,
            pipeline,
            cache,
            sweeper,
            logger,
            log,
            config,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &Arc<ContentCache> {
        &self.cache
    }

    pub fn log(&self) -> &LogHandle {
        &self.log
    }

    /// Acepta una conexión y la encola en el pool
    pub fn accept_one(&self) -> Result<(), ServerError> {
        let (stream, _) = self.listener.accept()?;
        let pipeline = Arc::clone(&self.pipeline);
        let log = self.log.clone();

        if !self
            .dispatcher
            .execute(move || serve_connection(stream, &pipeline, &log))
        {
            self.log.warning("Connection dropped: dispatcher is shut down");
        }
        Ok(())
    }

    /// Loop de accept; los errores de una conexión no detienen el servidor
    pub fn run(&self) -> Result<(), ServerError> {
        loop {
            if let Err(e) = self.accept_one() {
                self.log.error(format!("Error accepting connection: {}", e));
            }
        }
    }

    /// Apaga pool, barrido y logger, en ese orden
    pub fn shutdown(mut self) {
        self.dispatcher.join();
        self.sweeper.stop();
        self.logger.join();
    }
}

/// Atiende una conexión: lee la cabecera, corre el pipeline y cierra
pub fn serve_connection(stream: TcpStream, pipeline: &RequestPipeline, log: &LogHandle) {
    let origin = stream
        .peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    if let Err(e) = stream.set_read_timeout(Some(READ_TIMEOUT)) {
        log.warning(format!("Could not set read timeout for {}: {}", origin, e));
    }

    let raw = match read_request_head(&stream) {
        Ok(raw) => raw,
        Err(e) => {
            log.error(format!("Error reading request from {}: {}", origin, e));
            return;
        }
    };

    let mut writer = &stream;
    pipeline.handle(&raw, &origin, &mut writer);
}

/// Lee líneas hasta la primera vacía (o EOF), normalizadas a `\r\n`
///
/// Nunca se leen más de `MAX_REQUEST_HEAD + 1` bytes del socket, haya o no
/// fin de línea.
fn read_request_head(stream: &TcpStream) -> io::Result<String> {
    let mut reader = BufReader::new(Read::take(stream, MAX_REQUEST_HEAD as u64 + 1));
    let mut raw = String::new();
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            // EOF real del cliente, o se agotó el límite de bytes
            if reader.get_ref().limit() == 0 {
                return Err(head_too_large());
            }
            break;
        }

        let content = line.trim_end_matches(['\r', '\n']);
        if content.trim().is_empty() {
            break;
        }

        raw.push_str(content);
        raw.push_str("\r\n");

        if raw.len() > MAX_REQUEST_HEAD {
            return Err(head_too_large());
        }
    }

    Ok(raw)
}

fn head_too_large() -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("request head larger than {} bytes", MAX_REQUEST_HEAD),
    )
}
