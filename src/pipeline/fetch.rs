//! # Obtención de Contenido
//! src/pipeline/fetch.rs
//!
//! Resuelve una ruta HTTP a un archivo y obtiene su contenido pasando por
//! el cache, con doble verificación alrededor del lock por archivo:
//!
//! ```text
//! cache.read(path) ── hit ──────────────────────────────► contenido
//!        │ miss
//!        ▼
//! monitor.lock(path)
//!        │
//! cache.read(path) ── hit (otro request lo cargó) ──────► contenido
//!        │ miss
//!        ▼
//! source.read_file(path) ── ok ──► cache.write ─────────► contenido
//!        │ error
//!        ▼
//!   log error ──────────────────────────────────────────► vacío
//! ```

use super::source::ContentSource;
use crate::cache::ContentCache;
use crate::config::Config;
use crate::http::request::strip_query;
use crate::logging::LogHandle;
use crate::sync::ResourceMonitor;
use std::path::Path;
use std::sync::Arc;

/// Servicio de lectura de archivos del document root
#[derive(Clone)]
pub struct FileService {
    document_root: String,
    default_file: String,
    cache: Arc<ContentCache>,
    monitor: Arc<ResourceMonitor>,
    source: Arc<dyn ContentSource>,
    log: LogHandle,
}

impl FileService {
    pub fn new(
        config: &Config,
        cache: Arc<ContentCache>,
        monitor: Arc<ResourceMonitor>,
        source: Arc<dyn ContentSource>,
        log: LogHandle,
    ) -> Self {
        Self {
            document_root: config.document_root.trim_end_matches('/').to_string(),
            default_file: format!("{}.{}", config.default_page, config.default_page_extension),
            cache,
            monitor,
            source,
            log,
        }
    }

    /// Ruta del archivo para `route`
    ///
    /// - Se descarta el query string
    /// - Una ruta que termina en `/` apunta a la página por defecto
    /// - Una ruta con un segmento `..` no resuelve a nada
    pub fn resolve(&self, route: &str) -> Option<String> {
        let route = strip_query(route);
        if route.split(['/', '\\']).any(|segment| segment == "..") {
            return None;
        }

        let mut path = String::with_capacity(self.document_root.len() + route.len() + 16);
        path.push_str(&self.document_root);
        if !route.starts_with('/') {
            path.push('/');
        }
        path.push_str(route);
        if route.is_empty() || route.ends_with('/') {
            if route.is_empty() {
                path.push('/');
            }
            path.push_str(&self.default_file);
        }

        Some(path)
    }

    /// Contenido para `route`; vacío si no existe o no se pudo leer
    pub fn fetch(&self, route: &str) -> Arc<[u8]> {
        match self.resolve(route) {
            Some(path) => self.fetch_path(&path),
            None => {
                self.log
                    .error(format!("Error reading file: refused route {}", route));
                empty()
            }
        }
    }

    fn fetch_path(&self, path: &str) -> Arc<[u8]> {
        if let Some(content) = self.cache.read(path) {
            self.log.info(format!("Served from cache: {}", path));
            return content;
        }

        let _guard = self.monitor.lock(path);

        // Otro request pudo haberlo cargado mientras esperábamos el lock
        if let Some(content) = self.cache.read(path) {
            self.log.info(format!("Served from cache: {}", path));
            return content;
        }

        match self.source.read_file(Path::new(path)) {
            Ok(bytes) => {
                let content: Arc<[u8]> = Arc::from(bytes);
                self.cache.write(path, Arc::clone(&content));
                self.log.info(format!("DONE READING FILE: {}", path));
                content
            }
            Err(e) => {
                self.log
                    .error(format!("Error reading file: {}: {}", path, e));
                empty()
            }
        }
    }
}

fn empty() -> Arc<[u8]> {
    Arc::from(Vec::new())
}
