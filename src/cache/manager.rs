//! # Cache de Contenido
//! src/cache/manager.rs
//!
//! Cache en memoria `ruta → contenido` con el protocolo clásico de
//! lectores-escritores:
//!
//! ```text
//! read():   lock(reader_count); count += 1
//!           si count == 1 → acquire(writer_permit)     // primer lector
//!           unlock(reader_count)
//!           ... leer ...
//!           lock(reader_count); count -= 1
//!           si count == 0 → release(writer_permit)     // último lector
//!           unlock(reader_count)
//!
//! write():  acquire(writer_permit) ... escribir ... release(writer_permit)
//! ```
//!
//! Ambos locks son FIFO-fair. Un thread de fondo (`Sweeper`) elimina cada
//! cierto intervalo las entradas que no se usan hace más de `ttl`.

use super::entry::CacheEntry;
use crate::logging::LogHandle;
use crate::sync::{FairMutex, FairSemaphore, Interrupt};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Intervalo por defecto entre barridos
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Cache con TTL protegido por lectores-escritores
pub struct ContentCache {
    /// Entradas. El `RwLock` nunca tiene contención real: el protocolo
    /// de abajo ya excluye a los escritores mientras hay lectores.
    entries: RwLock<HashMap<String, CacheEntry>>,

    /// Lectores con acceso lógico (solo se toca con este lock)
    reader_count: FairMutex<usize>,

    /// Acceso exclusivo de escritura (1 permiso)
    writer_permit: FairSemaphore,

    /// Tiempo sin uso tras el cual una entrada expira
    ttl: Mutex<Duration>,

    log: LogHandle,

    #[cfg(test)]
    probe: probe::AccessProbe,
}

impl ContentCache {
    pub fn new(ttl: Duration, log: LogHandle) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            reader_count: FairMutex::new(0),
            writer_permit: FairSemaphore::new(),
            ttl: Mutex::new(ttl),
            log,
            #[cfg(test)]
            probe: probe::AccessProbe::default(),
        }
    }

    // ==================== Protocolo ====================

    fn read_access(&self) -> ReadAccess<'_> {
        let mut readers = self.reader_count.lock();
        *readers += 1;
        if *readers == 1 {
            // Primer lector: bloquea a los escritores
            self.writer_permit.acquire();
        }
        drop(readers);

        #[cfg(test)]
        self.probe.enter_read();

        ReadAccess { cache: self }
    }

    fn end_read(&self) {
        #[cfg(test)]
        self.probe.exit_read();

        let mut readers = self.reader_count.lock();
        *readers -= 1;
        if *readers == 0 {
            // Último lector: deja pasar a los escritores
            self.writer_permit.release();
        }
    }

    fn write_access(&self) -> WriteAccess<'_> {
        self.writer_permit.acquire();

        #[cfg(test)]
        self.probe.enter_write();

        WriteAccess { cache: self }
    }

    fn end_write(&self) {
        #[cfg(test)]
        self.probe.exit_write();

        self.writer_permit.release();
    }

    // ==================== Operaciones ====================

    /// Busca `key`; si existe, actualiza su último acceso
    pub fn read(&self, key: &str) -> Option<Arc<[u8]>> {
        let _access = self.read_access();
        self.entries.read().get(key).map(CacheEntry::content)
    }

    /// Inserta o reemplaza `key`, con último acceso = ahora
    pub fn write(&self, key: &str, content: impl Into<Arc<[u8]>>) {
        let content = content.into();
        {
            let _access = self.write_access();
            self.entries
                .write()
                .insert(key.to_string(), CacheEntry::new(content));
        }
        self.log.info(format!("Cache entry created: {}", key));
    }

    /// Verifica si `key` está en cache, sin tocar su último acceso
    pub fn contains(&self, key: &str) -> bool {
        let _access = self.read_access();
        self.entries.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        let _access = self.read_access();
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ttl(&self) -> Duration {
        *self.ttl.lock()
    }

    /// Cambia el TTL; las entradas se evalúan con el valor nuevo en el
    /// siguiente barrido
    pub fn set_ttl(&self, ttl: Duration) {
        *self.ttl.lock() = ttl;
    }

    /// Un barrido: elimina las entradas expiradas
    ///
    /// Retorna cuántas se eliminaron.
    pub fn sweep_expired(&self) -> usize {
        let ttl = self.ttl();

        self.expired_keys(ttl)
            .iter()
            .filter(|key| self.remove_if_expired(key, ttl))
            .count()
    }

    /// Foto de las claves expiradas, tomada como lector
    fn expired_keys(&self, ttl: Duration) -> Vec<String> {
        let _access = self.read_access();
        let now = Instant::now();
        self.entries
            .read()
            .iter()
            .filter(|(_, entry)| entry.is_expired(ttl, now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Elimina `key` por el mismo camino exclusivo que `write`
    ///
    /// Se vuelve a verificar la expiración: un lector pudo haberla usado
    /// entre la foto y este punto.
    fn remove_if_expired(&self, key: &str, ttl: Duration) -> bool {
        let removed = {
            let _access = self.write_access();
            let mut entries = self.entries.write();
            match entries.get(key) {
                Some(entry) if entry.is_expired(ttl, Instant::now()) => {
                    entries.remove(key);
                    true
                }
                _ => false,
            }
        };

        if removed {
            self.log.info(format!("Cache expired: {}", key));
        }
        removed
    }

    /// Lanza el thread de barrido periódico
    pub fn start_sweeper(self: &Arc<Self>, interval: Duration) -> Sweeper {
        let cache = Arc::clone(self);
        let stop = Arc::new(Interrupt::new());
        let signal = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("cache-sweeper".to_string())
            .spawn(move || loop {
                cache.sweep_expired();
                if signal.sleep(interval).is_err() {
                    break;
                }
            })
            .ok();

        if handle.is_none() {
            self.log.error("Could not start cache sweeper thread");
        }

        Sweeper { stop, handle }
    }
}

/// Acceso lógico de lectura (RAII)
struct ReadAccess<'a> {
    cache: &'a ContentCache,
}

impl Drop for ReadAccess<'_> {
    fn drop(&mut self) {
        self.cache.end_read();
    }
}

/// Acceso exclusivo de escritura (RAII)
struct WriteAccess<'a> {
    cache: &'a ContentCache,
}

impl Drop for WriteAccess<'_> {
    fn drop(&mut self) {
        self.cache.end_write();
    }
}

/// Handle del thread de barrido; al soltarlo, el thread se detiene
pub struct Sweeper {
    stop: Arc<Interrupt>,
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    /// Detiene el barrido y espera al thread
    pub fn stop(mut self) {
        self.halt();
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn halt(&mut self) {
        self.stop.raise();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.halt();
    }
}
