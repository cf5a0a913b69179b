//! # Cola Bloqueante
//! src/sync/queue.rs
//!
//! Cola FIFO thread-safe y sin límite de capacidad. La usan tanto el pool
//! de workers (cola de tareas) como el pipeline de logging (cola de logs).
//!
//! - `push` nunca bloquea
//! - `take` bloquea hasta que haya un elemento o la cola se cierre
//! - `poll` bloquea como máximo un timeout
//!
//! Una vez cerrada, la cola rechaza elementos nuevos y `take` retorna
//! `None` aunque queden elementos pendientes.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Estado protegido por el mutex
struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// Cola FIFO sin límite, compartible entre threads (clonar = misma cola)
pub struct BlockingQueue<T> {
    /// Elementos y bandera de cierre
    state: Arc<Mutex<QueueState<T>>>,

    /// Condvar para notificar cuando hay elementos nuevos o se cierra
    condvar: Arc<Condvar>,
}

impl<T> BlockingQueue<T> {
    /// Crea una cola vacía
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(QueueState {
                items: VecDeque::new(),
                closed: false,
            })),
            condvar: Arc::new(Condvar::new()),
        }
    }

    /// Encola un elemento al final
    ///
    /// Retorna `Err(item)` si la cola ya fue cerrada.
    pub fn push(&self, item: T) -> Result<(), T> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(item);
        }
        state.items.push_back(item);

        // Notificar a un consumidor esperando
        self.condvar.notify_one();
        Ok(())
    }

    /// Desencola el primer elemento
    ///
    /// Bloquea hasta que haya uno disponible. Retorna `None` cuando la
    /// cola está cerrada.
    pub fn take(&self) -> Option<T> {
        let mut state = self.state.lock();

        loop {
            if state.closed {
                return None;
            }
            if let Some(item) = state.items.pop_front() {
                return Some(item);
            }

            // Esperar a que haya elementos
            self.condvar.wait(&mut state);
        }
    }

    /// Como `take`, pero se rinde después de `timeout`
    pub fn poll(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();

        loop {
            if state.closed {
                return None;
            }
            if let Some(item) = state.items.pop_front() {
                return Some(item);
            }
            if self.condvar.wait_until(&mut state, deadline).timed_out() {
                if state.closed {
                    return None;
                }
                return state.items.pop_front();
            }
        }
    }

    /// Intenta desencolar sin bloquear
    pub fn try_take(&self) -> Option<T> {
        let mut state = self.state.lock();
        if state.closed {
            return None;
        }
        state.items.pop_front()
    }

    /// Cierra la cola y despierta a todos los consumidores
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        drop(state);
        self.condvar.notify_all();
    }

    /// Verifica si la cola fue cerrada
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Retorna el número de elementos pendientes
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    /// Verifica si la cola está vacía
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for BlockingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for BlockingQueue<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            condvar: Arc::clone(&self.condvar),
        }
    }
}
