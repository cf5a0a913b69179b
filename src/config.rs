//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del servidor de archivos con soporte para argumentos CLI
//! y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./file_server --port 8080 \
//!   --document-root ./server/html \
//!   --workers 5 \
//!   --cache-ttl 30
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 MAX_REQUESTS=10 LOG_DIR=/var/log/fs ./file_server
//! ```

use crate::error::ConfigError;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Configuración del servidor de archivos
#[derive(Debug, Clone, Parser)]
#[command(name = "file_server")]
#[command(about = "Servidor de archivos HTTP concurrente con cache y logging asíncrono")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "8080", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HTTP_HOST")]
    pub host: String,

    // === Archivos ===
    /// Directorio raíz desde donde se sirven los archivos
    #[arg(long = "document-root", default_value = "./server/html", env = "DOCUMENT_ROOT")]
    pub document_root: String,

    /// Nombre de la página por defecto (para rutas que terminan en `/`)
    #[arg(long = "default-page", default_value = "index", env = "DEFAULT_PAGE")]
    pub default_page: String,

    /// Extensión de la página por defecto
    #[arg(
        long = "default-page-extension",
        default_value = "html",
        env = "DEFAULT_PAGE_EXTENSION"
    )]
    pub default_page_extension: String,

    /// Ruta (relativa al document root) del documento 404
    #[arg(long = "page-404", default_value = "/404.html", env = "PAGE_404")]
    pub page_404: String,

    // === Workers ===
    /// Número de workers (requests atendidos en paralelo)
    #[arg(long = "workers", default_value = "5", env = "MAX_REQUESTS")]
    pub workers: usize,

    /// Demora artificial de los sub-tasks de validación y headers, en ms
    #[arg(long = "subtask-delay", default_value = "0", env = "SUBTASK_DELAY_MS")]
    pub subtask_delay_ms: u64,

    // === Cache ===
    /// Segundos sin uso tras los que una entrada del cache expira
    #[arg(long = "cache-ttl", default_value = "30", env = "CACHE_TTL_SECS")]
    pub cache_ttl_secs: u64,

    /// Intervalo entre barridos del cache, en ms
    #[arg(long = "sweep-interval", default_value = "5000", env = "SWEEP_INTERVAL_MS")]
    pub sweep_interval_ms: u64,

    // === Logging ===
    /// Directorio de logs
    #[arg(long = "log-dir", default_value = "./logs", env = "LOG_DIR")]
    pub log_dir: String,

    /// Nombre del archivo de log (sin extensión)
    #[arg(long = "log-file", default_value = "requests", env = "LOG_FILE_NAME")]
    pub log_file_name: String,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use file_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `<log_dir>/<log_file_name>.log`
    pub fn log_file_path(&self) -> PathBuf {
        PathBuf::from(&self.log_dir).join(format!("{}.log", self.log_file_name))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    pub fn subtask_delay(&self) -> Duration {
        Duration::from_millis(self.subtask_delay_ms)
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::ZeroTtl);
        }
        if self.sweep_interval_ms == 0 {
            return Err(ConfigError::ZeroSweepInterval);
        }
        if self.document_root.trim().is_empty() {
            return Err(ConfigError::EmptyDocumentRoot);
        }
        if self.log_file_name.trim().is_empty() {
            return Err(ConfigError::EmptyLogFileName);
        }

        Ok(())
    }

    /// Imprime un resumen de la configuración
    pub fn print_summary(&self) {
        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║              File Server Configuration                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝");
        println!();
        println!("🌐 Network:");
        println!("   Address:      {}", self.address());
        println!("   Workers:      {}", self.workers);
        println!();
        println!("📁 Files:");
        println!("   Root:         {}", self.document_root);
        println!(
            "   Default page: {}.{}",
            self.default_page, self.default_page_extension
        );
        println!("   404 page:     {}", self.page_404);
        println!();
        println!("🗄️  Cache:");
        println!("   TTL:          {} s", self.cache_ttl_secs);
        println!("   Sweep every:  {} ms", self.sweep_interval_ms);
        println!();
        println!("📝 Logging:");
        println!("   File:         {}", self.log_file_path().display());
        if self.subtask_delay_ms > 0 {
            println!("   Sub-task delay: {} ms", self.subtask_delay_ms);
        }
        println!();
        println!("═══════════════════════════════════════════════════════════════");
        println!();
    }
}

impl Default for Config {
    /// Los mismos valores que los defaults de clap
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            document_root: "./server/html".to_string(),
            default_page: "index".to_string(),
            default_page_extension: "html".to_string(),
            page_404: "/404.html".to_string(),
            workers: 5,
            subtask_delay_ms: 0,
            cache_ttl_secs: 30,
            sweep_interval_ms: 5_000,
            log_dir: "./logs".to_string(),
            log_file_name: "requests".to_string(),
        }
    }
}
