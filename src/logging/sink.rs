//! # Sinks de Log
//! src/logging/sink.rs
//!
//! Destinos físicos de los mensajes:
//! - consola (stdout / stderr), inyectables para poder capturarlos
//! - archivo JSON con forma de array, que siempre queda bien formado
//!
//! ## Archivo JSON
//!
//! Cada append es un read-modify-write completo:
//!
//! ```text
//! (vacío)            →  [\n<entry>\n]
//! [\n<a>\n]          →  [\n<a>,\n<entry>\n]
//! ```
//!
//! El ciclo completo corre con el lock del `ResourceMonitor` para la ruta
//! del archivo, y la escritura final es un archivo temporal + rename.

use crate::error::SinkError;
use crate::sync::ResourceMonitor;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

/// Stream de consola inyectable
pub type ConsoleStream = Box<dyn Write + Send>;

/// Archivo de log con forma de array JSON
pub struct JsonArrayFile {
    /// Ruta al archivo
    path: PathBuf,

    /// Serializa el read-modify-write por ruta
    monitor: Arc<ResourceMonitor>,
}

impl JsonArrayFile {
    pub fn new(path: impl Into<PathBuf>, monitor: Arc<ResourceMonitor>) -> Self {
        Self {
            path: path.into(),
            monitor,
        }
    }

    /// Agrega una entrada (JSON ya serializado) al final del array
    pub fn append(&self, entry: &str) -> Result<(), SinkError> {
        let key = self.path.to_string_lossy().into_owned();
        let _guard = self.monitor.lock(&key);

        let current = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        let updated = splice_entry(&current, entry).map_err(|reason| {
            SinkError::MalformedLogFile {
                path: key.clone(),
                reason: reason.to_string(),
            }
        })?;

        self.write_atomic(&updated)
    }

    /// Escribe en un temporal y renombra (atómico en sistemas Unix)
    fn write_atomic(&self, content: &str) -> Result<(), SinkError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = format!("{}.tmp", self.path.display());
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content.as_bytes())?;
        writer.flush()?;

        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

/// Inserta `entry` antes del corchete de cierre del array
///
/// Un archivo vacío (o solo espacios) se convierte en un array nuevo.
pub fn splice_entry(current: &str, entry: &str) -> Result<String, &'static str> {
    if current.trim().is_empty() {
        return Ok(format!("[\n{}\n]\n", entry));
    }

    let close = current.rfind(']').ok_or("missing closing bracket")?;
    let head = current[..close].trim_end();
    if !head.trim_start().starts_with('[') {
        return Err("missing opening bracket");
    }

    // Array vacío: sin separador
    let separator = if head.ends_with('[') { "\n" } else { ",\n" };

    Ok(format!("{}{}{}\n]\n", head, separator, entry))
}
