//! # Monitor de Recursos
//! src/sync/monitor.rs
//!
//! Exclusión mutua por clave (normalmente la ruta de un archivo). Cada
//! clave tiene su propio lock FIFO-fair, creado la primera vez que se usa
//! y conservado durante toda la vida del proceso.
//!
//! Lo usan la lectura de archivos del document root y el sink de archivo
//! del logger, para que nunca haya dos threads tocando el mismo archivo.

use super::fair::FairSemaphore;
use crate::logging::LogHandle;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Locks por clave con atención FIFO
pub struct ResourceMonitor {
    /// Mapa clave → lock (solo crece)
    locks: Mutex<HashMap<String, Arc<FairSemaphore>>>,

    /// Para reportar liberaciones inválidas
    log: LogHandle,
}

impl ResourceMonitor {
    pub fn new(log: LogHandle) -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
            log,
        }
    }

    /// Bloquea hasta ser el único dueño de `key`
    ///
    /// Los que esperan son atendidos en orden de llegada.
    pub fn acquire(&self, key: &str) {
        let lock = {
            let mut locks = self.locks.lock();
            Arc::clone(
                locks
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(FairSemaphore::new())),
            )
        };

        // El mapa ya está libre: esperar el turno no bloquea otras claves
        lock.acquire();
    }

    /// Libera el lock de `key`
    ///
    /// Liberar una clave que no está tomada (o que nunca existió) no
    /// bloquea ni hace panic: se registra un error y retorna `false`.
    pub fn release(&self, key: &str) -> bool {
        let lock = self.locks.lock().get(key).cloned();

        match lock {
            Some(lock) => {
                if lock.release() {
                    true
                } else {
                    self.log
                        .error(format!("Lock for file \"{}\" was not held", key));
                    false
                }
            }
            None => {
                self.log
                    .error(format!("Lock for file \"{}\" was not found", key));
                false
            }
        }
    }

    /// Adquiere `key` y retorna un guard que lo libera al salir de scope
    pub fn lock(&self, key: &str) -> MonitorGuard<'_> {
        self.acquire(key);
        MonitorGuard {
            monitor: self,
            key: key.to_string(),
        }
    }

    /// Número de claves que tienen lock creado
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Guard RAII de una clave del monitor
pub struct MonitorGuard<'a> {
    monitor: &'a ResourceMonitor,
    key: String,
}

impl MonitorGuard<'_> {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for MonitorGuard<'_> {
    fn drop(&mut self) {
        self.monitor.release(&self.key);
    }
}
