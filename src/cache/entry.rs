//! # Entrada del Cache
//! src/cache/entry.rs

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Contenido de un archivo + último acceso
///
/// El contenido es inmutable y se comparte sin copiar; el último acceso
/// se actualiza en cada lectura exitosa (varios lectores a la vez, de ahí
/// el mutex propio).
#[derive(Debug)]
pub struct CacheEntry {
    content: Arc<[u8]>,
    last_access: Mutex<Instant>,
}

impl CacheEntry {
    pub fn new(content: Arc<[u8]>) -> Self {
        Self {
            content,
            last_access: Mutex::new(Instant::now()),
        }
    }

    /// Retorna el contenido y marca el acceso
    pub fn content(&self) -> Arc<[u8]> {
        *self.last_access.lock() = Instant::now();
        Arc::clone(&self.content)
    }

    pub fn last_access(&self) -> Instant {
        *self.last_access.lock()
    }

    /// `last_access + ttl < now`; un TTL que no cabe en un `Instant` nunca expira
    pub fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        self.last_access()
            .checked_add(ttl)
            .is_some_and(|deadline| deadline < now)
    }
}
