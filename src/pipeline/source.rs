//! # Fuente de Contenido
//! src/pipeline/source.rs
//!
//! El acceso a disco queda detrás de un trait para que los tests puedan
//! contar lecturas o simular fallos sin tocar el filesystem.

use std::fs;
use std::io;
use std::path::Path;

/// Lee el contenido completo de un archivo
pub trait ContentSource: Send + Sync {
    /// Falla con un error de I/O si el archivo no existe, no se puede
    /// leer o no hay permisos
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Lectura directa del filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl ContentSource for FsSource {
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }
}
