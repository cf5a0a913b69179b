//! # Sincronización
//! src/sync/mod.rs
//!
//! Primitivas de concurrencia que usa el resto del servidor:
//! - `fair`: semáforo y mutex FIFO-fair (tickets)
//! - `queue`: cola bloqueante sin límite (tareas y logs)
//! - `interrupt`: interrupción cooperativa de threads dormidos
//! - `monitor`: exclusión mutua por archivo

pub mod fair;
pub mod interrupt;
pub mod monitor;
pub mod queue;

pub use fair::{FairMutex, FairSemaphore};
pub use interrupt::{Interrupt, Interrupted};
pub use monitor::{MonitorGuard, ResourceMonitor};
pub use queue::BlockingQueue;
