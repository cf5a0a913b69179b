//! # Pool de Workers
//! src/pool/dispatcher.rs
//!
//! N workers de larga vida sacan trabajos de una cola FIFO compartida:
//!
//! ```text
//! execute(job) ──► [ TaskQueue ] ──┬──► worker-0 ──► job()
//!                                  ├──► worker-1 ──► job()
//!                                  └──► worker-N ──► job()
//! ```
//!
//! `shutdown()` cierra la cola (despierta a los que esperan en `take`) y
//! levanta la señal de interrupción, que corta cualquier
//! `interruptible_sleep` en curso dentro de un trabajo.

use crate::logging::LogHandle;
use crate::sync::{BlockingQueue, Interrupt, Interrupted};
use std::any::Any;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Unidad de trabajo opaca
pub type Job = Box<dyn FnOnce() + Send + 'static>;

thread_local! {
    /// Señal de interrupción del worker que corre en este thread
    static CURRENT: RefCell<Option<Arc<Interrupt>>> = const { RefCell::new(None) };
}

/// Señal de interrupción del worker actual, si el thread es un worker
pub fn current_interrupt() -> Option<Arc<Interrupt>> {
    CURRENT.with(|current| current.borrow().clone())
}

/// Duerme `duration`; dentro de un worker, se corta si el pool se apaga
///
/// Fuera de un worker es un `thread::sleep` normal.
pub fn interruptible_sleep(duration: Duration) -> Result<(), Interrupted> {
    match current_interrupt() {
        Some(interrupt) => interrupt.sleep(duration),
        None => {
            thread::sleep(duration);
            Ok(())
        }
    }
}

/// Pool de tamaño fijo
pub struct WorkDispatcher {
    queue: BlockingQueue<Job>,
    interrupt: Arc<Interrupt>,
    shutdown: AtomicBool,
    workers: Vec<JoinHandle<()>>,
    size: usize,
    log: LogHandle,
}

impl WorkDispatcher {
    /// Lanza `size` workers (al menos uno)
    pub fn new(size: usize, log: LogHandle) -> Self {
        let size = size.max(1);
        let queue = BlockingQueue::new();
        let interrupt = Arc::new(Interrupt::new());

        let workers = (0..size)
            .filter_map(|id| {
                let name = format!("worker-{}", id);
                let queue = queue.clone();
                let interrupt = Arc::clone(&interrupt);
                let worker_log = log.clone();

                thread::Builder::new()
                    .name(name.clone())
                    .spawn(move || Self::worker_loop(queue, interrupt, worker_log))
                    .map_err(|e| log.error(format!("Could not start {}: {}", name, e)))
                    .ok()
            })
            .collect();

        Self {
            queue,
            interrupt,
            shutdown: AtomicBool::new(false),
            workers,
            size,
            log,
        }
    }

    /// Loop principal del worker
    fn worker_loop(queue: BlockingQueue<Job>, interrupt: Arc<Interrupt>, log: LogHandle) {
        CURRENT.with(|current| *current.borrow_mut() = Some(Arc::clone(&interrupt)));

        // `take` retorna None cuando la cola se cierra
        while let Some(job) = queue.take() {
            if interrupt.is_raised() {
                break;
            }

            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
                log.error(format!("Task execution error: {}", panic_message(&*payload)));
            }
        }

        CURRENT.with(|current| current.borrow_mut().take());
    }

    /// Encola un trabajo; después de `shutdown` se descarta
    ///
    /// Retorna `true` si quedó en la cola.
    pub fn execute<F>(&self, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        if self.is_shutdown() {
            return false;
        }
        self.queue.push(Box::new(job)).is_ok()
    }

    /// Marca el pool como apagado e interrumpe a los workers
    ///
    /// Los trabajos que seguían en la cola no se ejecutan.
    pub fn shutdown(&self) {
        if self.shutdown.swap(true, Ordering::SeqCst) {
            return;
        }
        self.interrupt.raise();
        self.queue.close();
        self.log
            .info(format!("Work dispatcher shut down ({} queued jobs dropped)", self.queued()));
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    pub fn worker_count(&self) -> usize {
        self.size
    }

    /// Trabajos esperando un worker
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Apaga el pool y espera a que todos los workers terminen
    pub fn join(&mut self) {
        self.shutdown();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for WorkDispatcher {
    fn drop(&mut self) {
        self.join();
    }
}

/// Texto de un panic capturado
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;
    use std::time::Instant;

    // ==================== Concurrencia ====================

    #[test]
    fn test_runs_at_most_n_concurrently() {
        let pool = WorkDispatcher::new(3, LogHandle::new());
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..10 {
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            let done = Arc::clone(&done);
            assert!(pool.execute(move || {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(50));
                active.fetch_sub(1, Ordering::SeqCst);
                done.fetch_add(1, Ordering::SeqCst);
            }));
        }

        let start = Instant::now();
        while done.load(Ordering::SeqCst) < 10 && start.elapsed() < Duration::from_secs(5) {
            thread::sleep(Duration::from_millis(10));
        }

        assert_eq!(done.load(Ordering::SeqCst), 10);
        assert_eq!(peak.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_zero_size_means_one_worker() {
        let pool = WorkDispatcher::new(0, LogHandle::new());
        assert_eq!(pool.worker_count(), 1);

        let (tx, rx) = mpsc::channel();
        pool.execute(move || tx.send(42).unwrap());
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(42));
    }

    #[test]
    fn test_queues_excess_work() {
        let pool = WorkDispatcher::new(1, LogHandle::new());
        let (release_tx, release_rx) = mpsc::channel::<()>();

        pool.execute(move || {
            let _ = release_rx.recv();
        });
        pool.execute(|| {});
        pool.execute(|| {});

        thread::sleep(Duration::from_millis(50));
        assert_eq!(pool.queued(), 2);
        release_tx.send(()).unwrap();
    }

    // ==================== Shutdown ====================

    #[test]
    fn test_execute_after_shutdown_is_discarded() {
        let mut pool = WorkDispatcher::new(2, LogHandle::new());
        let counter = Arc::new(AtomicUsize::new(0));

        pool.shutdown();
        assert!(pool.is_shutdown());

        let c = Arc::clone(&counter);
        assert!(!pool.execute(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));

        pool.join();
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_shutdown_interrupts_sleeping_task() {
        let mut pool = WorkDispatcher::new(1, LogHandle::new());
        let (tx, rx) = mpsc::channel();

        pool.execute(move || {
            let _ = tx.send(interruptible_sleep(Duration::from_secs(30)));
        });
        thread::sleep(Duration::from_millis(50));

        let start = Instant::now();
        pool.join();

        assert_eq!(rx.recv_timeout(Duration::from_secs(1)), Ok(Err(Interrupted)));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_sleep_outside_worker() {
        assert!(current_interrupt().is_none());
        assert_eq!(interruptible_sleep(Duration::from_millis(1)), Ok(()));
    }

    // ==================== Errores ====================

    #[test]
    fn test_panicking_task_keeps_worker_alive() {
        let log = LogHandle::new();
        let pool = WorkDispatcher::new(1, log.clone());
        let (tx, rx) = mpsc::channel();

        pool.execute(|| panic!("boom"));
        pool.execute(move || tx.send("sigo").unwrap());

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok("sigo"));

        let task = log.try_next().unwrap();
        assert_eq!(task.level(), LogLevel::Error);
        assert_eq!(task.message(), "Task execution error: boom");
    }

    #[test]
    fn test_panic_message_from_string() {
        let payload: Box<dyn Any + Send> = Box::new(format!("fallo {}", 7));
        assert_eq!(panic_message(&*payload), "fallo 7");
    }
}
