//! # Señal de Interrupción
//! src/sync/interrupt.rs
//!
//! Rust no puede interrumpir un thread desde afuera. En su lugar, los
//! threads que duermen o esperan lo hacen sobre una `Interrupt`: cuando
//! alguien la levanta, todas las esperas terminan de inmediato.

use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;

/// La espera fue cortada por una interrupción
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("interrupted")]
pub struct Interrupted;

/// Señal de interrupción cooperativa
#[derive(Debug, Default)]
pub struct Interrupt {
    raised: Mutex<bool>,
    condvar: Condvar,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Levanta la señal y despierta a todos los que duermen sobre ella
    pub fn raise(&self) {
        *self.raised.lock() = true;
        self.condvar.notify_all();
    }

    pub fn is_raised(&self) -> bool {
        *self.raised.lock()
    }

    /// Duerme `duration`, o menos si la señal se levanta antes
    ///
    /// Una duración que no cabe en un `Instant` duerme hasta la interrupción.
    pub fn sleep(&self, duration: Duration) -> Result<(), Interrupted> {
        let deadline = Instant::now().checked_add(duration);
        let mut raised = self.raised.lock();

        while !*raised {
            match deadline {
                Some(deadline) => {
                    if self.condvar.wait_until(&mut raised, deadline).timed_out() {
                        return if *raised { Err(Interrupted) } else { Ok(()) };
                    }
                }
                None => self.condvar.wait(&mut raised),
            }
        }

        Err(Interrupted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_sleep_completes() {
        let interrupt = Interrupt::new();
        let start = Instant::now();

        assert_eq!(interrupt.sleep(Duration::from_millis(30)), Ok(()));
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_sleep_interrupted() {
        let interrupt = Arc::new(Interrupt::new());
        let sleeper = Arc::clone(&interrupt);

        let start = Instant::now();
        let handle = thread::spawn(move || sleeper.sleep(Duration::from_secs(10)));

        thread::sleep(Duration::from_millis(50));
        interrupt.raise();

        assert_eq!(handle.join().unwrap(), Err(Interrupted));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_sleep_after_raise_returns_immediately() {
        let interrupt = Interrupt::new();
        interrupt.raise();

        assert!(interrupt.is_raised());
        assert_eq!(interrupt.sleep(Duration::from_secs(10)), Err(Interrupted));
    }

    #[test]
    fn test_sleep_without_deadline_is_interrupted() {
        let interrupt = Arc::new(Interrupt::new());
        let sleeper = Arc::clone(&interrupt);

        let handle = thread::spawn(move || sleeper.sleep(Duration::MAX));

        thread::sleep(Duration::from_millis(50));
        interrupt.raise();

        assert_eq!(handle.join().unwrap(), Err(Interrupted));
    }
}
