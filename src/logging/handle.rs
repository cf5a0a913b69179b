//! # Productor de Logs
//! src/logging/handle.rs
//!
//! `LogHandle` es el lado productor de la cola de logs. Se clona y se
//! entrega a cada componente que necesite loguear; todos los clones
//! comparten la misma cola. Encolar nunca bloquea ni falla de forma
//! observable.

use super::task::{LogLevel, LogSink, LogTask, RequestRecord};
use crate::sync::BlockingQueue;
use std::time::Duration;

/// Handle clonable hacia la cola de logs del proceso
#[derive(Clone, Default)]
pub struct LogHandle {
    queue: BlockingQueue<LogTask>,
}

impl LogHandle {
    /// Crea una cola de logs nueva (una por proceso en producción)
    pub fn new() -> Self {
        Self {
            queue: BlockingQueue::new(),
        }
    }

    /// Encola una tarea de log
    pub fn enqueue(&self, task: LogTask) {
        // La cola de logs nunca se cierra; si lo estuviera, se descarta
        let _ = self.queue.push(task);
    }

    /// Mensaje informativo a stdout
    pub fn info(&self, message: impl Into<String>) {
        self.enqueue(LogTask::new(LogLevel::Info, LogSink::ConsoleOut, message));
    }

    /// Advertencia a stderr
    pub fn warning(&self, message: impl Into<String>) {
        self.enqueue(LogTask::new(LogLevel::Warning, LogSink::ConsoleErr, message));
    }

    /// Error a stderr
    pub fn error(&self, message: impl Into<String>) {
        self.enqueue(LogTask::new(LogLevel::Error, LogSink::ConsoleErr, message));
    }

    /// Resultado de un request, al archivo de log
    pub fn request(&self, method: &str, route: &str, status: u16, origin: &str) {
        self.enqueue(LogTask::new(
            LogLevel::Request,
            LogSink::File,
            RequestRecord::message(method, route, status, origin),
        ));
    }

    /// Número de tareas esperando al consumidor
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Saca la siguiente tarea sin bloquear
    pub fn try_next(&self) -> Option<LogTask> {
        self.queue.try_take()
    }

    /// Espera la siguiente tarea como máximo `timeout`
    pub(crate) fn poll(&self, timeout: Duration) -> Option<LogTask> {
        self.queue.poll(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_helpers_pick_sink() {
        let log = LogHandle::new();
        log.info("a");
        log.warning("b");
        log.error("c");
        log.request("GET", "/", 200, "127.0.0.1");

        let tasks: Vec<_> = std::iter::from_fn(|| log.try_next()).collect();
        let kinds: Vec<_> = tasks.iter().map(|t| (t.level(), t.sink())).collect();

        assert_eq!(
            kinds,
            vec![
                (LogLevel::Info, LogSink::ConsoleOut),
                (LogLevel::Warning, LogSink::ConsoleErr),
                (LogLevel::Error, LogSink::ConsoleErr),
                (LogLevel::Request, LogSink::File),
            ]
        );
        assert_eq!(tasks[3].message(), "GET / 200 127.0.0.1");
    }

    #[test]
    fn test_clones_share_queue() {
        let log = LogHandle::new();
        let producers: Vec<_> = (0..4)
            .map(|i| {
                let log = log.clone();
                thread::spawn(move || {
                    for j in 0..10 {
                        log.info(format!("{}-{}", i, j));
                    }
                })
            })
            .collect();

        for producer in producers {
            producer.join().unwrap();
        }

        assert_eq!(log.pending(), 40);
    }
}
