//! # Primitivas FIFO-fair
//! src/sync/fair.rs
//!
//! Semáforo binario y mutex que atienden a los threads en estricto orden
//! de llegada, usando el esquema de tickets (como en una panadería):
//!
//! ```text
//! acquire():  ticket = next_ticket++
//!             esperar hasta (now_serving == ticket && available)
//!             available = false; now_serving++
//! release():  available = true; despertar a todos
//! ```
//!
//! El semáforo no tiene dueño: un thread puede adquirirlo y otro
//! liberarlo. El cache lo necesita así, porque el primer lector toma el
//! permiso de escritura y el último lector (otro thread) lo devuelve.

use parking_lot::{Condvar, Mutex, MutexGuard};
use std::ops::{Deref, DerefMut};

/// Estado interno del semáforo de tickets
#[derive(Debug)]
struct TicketState {
    /// Próximo ticket a repartir
    next_ticket: u64,

    /// Ticket que tiene el turno
    now_serving: u64,

    /// El único permiso está libre
    available: bool,
}

/// Semáforo binario (1 permiso) con atención FIFO
#[derive(Debug)]
pub struct FairSemaphore {
    state: Mutex<TicketState>,
    turn: Condvar,
}

impl FairSemaphore {
    /// Crea un semáforo con el permiso disponible
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TicketState {
                next_ticket: 0,
                now_serving: 0,
                available: true,
            }),
            turn: Condvar::new(),
        }
    }

    /// Bloquea hasta obtener el permiso, respetando el orden de llegada
    pub fn acquire(&self) {
        let mut state = self.state.lock();
        let ticket = state.next_ticket;
        state.next_ticket += 1;

        while !(state.available && state.now_serving == ticket) {
            self.turn.wait(&mut state);
        }

        state.available = false;
        state.now_serving += 1;
    }

    /// Devuelve el permiso
    ///
    /// Retorna `false` (sin bloquear) si el permiso no estaba tomado.
    pub fn release(&self) -> bool {
        let mut state = self.state.lock();
        if state.available {
            return false;
        }
        state.available = true;
        drop(state);

        // Todos despiertan, pero solo el dueño del siguiente ticket avanza
        self.turn.notify_all();
        true
    }

    /// Indica si alguien tiene el permiso ahora mismo
    pub fn is_held(&self) -> bool {
        !self.state.lock().available
    }

    /// Threads esperando turno (sin contar al que tiene el permiso)
    pub fn waiting(&self) -> u64 {
        let state = self.state.lock();
        state.next_ticket - state.now_serving
    }
}

impl Default for FairSemaphore {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutex FIFO-fair que protege un valor
///
/// El orden lo decide `gate`; el `Mutex` interno solo da acceso seguro
/// al valor y nunca tiene contención real.
#[derive(Debug, Default)]
pub struct FairMutex<T> {
    gate: FairSemaphore,
    value: Mutex<T>,
}

impl<T> FairMutex<T> {
    pub fn new(value: T) -> Self {
        Self {
            gate: FairSemaphore::new(),
            value: Mutex::new(value),
        }
    }

    /// Bloquea hasta que sea el turno de este thread
    pub fn lock(&self) -> FairMutexGuard<'_, T> {
        self.gate.acquire();
        FairMutexGuard {
            gate: &self.gate,
            value: self.value.lock(),
        }
    }
}

/// Guard del `FairMutex`: libera el turno al salir de scope
pub struct FairMutexGuard<'a, T> {
    gate: &'a FairSemaphore,
    value: MutexGuard<'a, T>,
}

impl<T> Deref for FairMutexGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for FairMutexGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T> Drop for FairMutexGuard<'_, T> {
    fn drop(&mut self) {
        // El MutexGuard interno se suelta justo después de este cuerpo;
        // el siguiente en la fila puede esperar un instante en `value.lock()`.
        self.gate.release();
    }
}
