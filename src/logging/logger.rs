//! # Consumidor de Logs
//! src/logging/logger.rs
//!
//! Un único thread saca tareas de la cola y las despacha según
//! `(nivel, destino)`. Espera con timeout corto para poder ver la bandera
//! de shutdown a tiempo.
//!
//! ```text
//! productores ──► [ LogQueue ] ──► Logger ──┬─► stdout
//!                                           ├─► stderr
//!                                           └─► archivo JSON
//! ```

use super::handle::LogHandle;
use super::sink::{ConsoleStream, JsonArrayFile};
use super::task::{LogLevel, LogSink, LogTask, RequestRecord};
use crate::error::SinkError;
use crate::sync::ResourceMonitor;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Cada cuánto el consumidor revisa la bandera de shutdown
pub const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Destinos físicos del logger
pub struct LogSinks {
    out: ConsoleStream,
    err: ConsoleStream,
    file: JsonArrayFile,
}

impl LogSinks {
    pub fn new(
        out: ConsoleStream,
        err: ConsoleStream,
        file_path: impl Into<PathBuf>,
        monitor: Arc<ResourceMonitor>,
    ) -> Self {
        Self {
            out,
            err,
            file: JsonArrayFile::new(file_path, monitor),
        }
    }

    /// Consola real del proceso
    pub fn stdio(file_path: impl Into<PathBuf>, monitor: Arc<ResourceMonitor>) -> Self {
        Self::new(
            Box::new(io::stdout()),
            Box::new(io::stderr()),
            file_path,
            monitor,
        )
    }

    /// Despacha una tarea a su destino
    pub fn dispatch(&mut self, task: &LogTask) -> Result<(), SinkError> {
        let (line, entry) = match task.level() {
            LogLevel::Request => match RequestRecord::from_task(task) {
                Some(record) => {
                    let json = serde_json::to_string(&record)?;
                    (json.clone(), json)
                }
                None => {
                    let line = task.format_line();
                    let entry = serde_json::to_string(&line)?;
                    (line, entry)
                }
            },
            _ => {
                let line = task.format_line();
                let entry = serde_json::to_string(&line)?;
                (line, entry)
            }
        };

        match task.sink() {
            LogSink::ConsoleOut => {
                writeln!(self.out, "{}", line)?;
                self.out.flush()?;
            }
            LogSink::ConsoleErr => {
                writeln!(self.err, "{}", line)?;
                self.err.flush()?;
            }
            LogSink::File => self.file.append(&entry)?,
        }

        Ok(())
    }

    /// Reporta un fallo del propio logger (no puede volver a la cola)
    fn report(&mut self, message: &str) {
        let _ = writeln!(self.err, "[ERROR] Logger: {}", message);
        let _ = self.err.flush();
    }
}

/// Thread consumidor de la cola de logs
pub struct Logger {
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Logger {
    /// Lanza el thread consumidor sobre la cola de `log`
    pub fn spawn(log: &LogHandle, sinks: LogSinks) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let queue = log.clone();
        let flag = Arc::clone(&shutdown);

        let handle = thread::Builder::new()
            .name("logger".to_string())
            .spawn(move || Self::consume_loop(queue, flag, sinks));

        Self {
            shutdown,
            handle: Self::started(handle),
        }
    }

    /// El logger no puede loguear su propio fallo: va directo a stderr
    fn started(spawned: io::Result<JoinHandle<()>>) -> Option<JoinHandle<()>> {
        spawned
            .map_err(|e| eprintln!("Could not start logger thread: {}", e))
            .ok()
    }

    /// Loop principal: poll con timeout hasta que se pida shutdown
    fn consume_loop(queue: LogHandle, shutdown: Arc<AtomicBool>, mut sinks: LogSinks) {
        while !shutdown.load(Ordering::SeqCst) {
            let Some(task) = queue.poll(POLL_TIMEOUT) else {
                continue;
            };

            let result = panic::catch_unwind(AssertUnwindSafe(|| sinks.dispatch(&task)));
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => sinks.report(&e.to_string()),
                Err(_) => sinks.report("panic while writing a log entry"),
            }
        }
    }

    /// Pide al consumidor que termine
    ///
    /// Sale después del poll en curso; lo que quede en la cola no se
    /// garantiza que se procese.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Pide shutdown y espera a que el thread termine
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::fs;
    use std::time::Instant;

    /// Writer que guarda todo en memoria para inspeccionarlo después
    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Fixture {
        log: LogHandle,
        out: Capture,
        err: Capture,
        path: PathBuf,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        Fixture {
            log: LogHandle::new(),
            out: Capture::default(),
            err: Capture::default(),
            path: dir.path().join("logs").join("server.log"),
            _dir: dir,
        }
    }

    fn sinks(f: &Fixture) -> LogSinks {
        LogSinks::new(
            Box::new(f.out.clone()),
            Box::new(f.err.clone()),
            &f.path,
            Arc::new(ResourceMonitor::new(f.log.clone())),
        )
    }

    /// Espera hasta que la condición se cumpla (máximo 5s)
    fn wait_until(cond: impl Fn() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < Duration::from_secs(5) {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        false
    }

    // ==================== Consola ====================

    #[test]
    fn test_info_goes_to_stdout() {
        let f = fixture();
        let logger = Logger::spawn(&f.log, sinks(&f));

        f.log.info("Test info message");

        assert!(wait_until(|| f.out.text().contains("[INFO] Test info message")));
        assert!(f.err.text().is_empty());
        logger.join();
    }

    #[test]
    fn test_error_and_warning_go_to_stderr() {
        let f = fixture();
        let logger = Logger::spawn(&f.log, sinks(&f));

        f.log.error("Test error message");
        f.log.warning("Test warning message");

        assert!(wait_until(|| {
            let err = f.err.text();
            err.contains("[ERROR] Test error message")
                && err.contains("[WARNING] Test warning message")
        }));
        logger.join();
    }

    #[test]
    fn test_request_to_console_is_json() {
        let f = fixture();
        let logger = Logger::spawn(&f.log, sinks(&f));

        let task = LogTask::new(
            LogLevel::Request,
            LogSink::ConsoleOut,
            "GET /api/test 200 127.0.0.1",
        );
        let expected = format!(
            r#"{{"timestamp":"{}","method":"GET","route":"/api/test","origin":"127.0.0.1","status":200}}"#,
            task.created_at().format(crate::logging::task::TIMESTAMP_FORMAT)
        );
        f.log.enqueue(task);

        assert!(wait_until(|| f.out.text().contains(&expected)));
        logger.join();
    }

    #[test]
    fn test_messages_keep_order() {
        let f = fixture();
        let logger = Logger::spawn(&f.log, sinks(&f));

        for i in 0..10 {
            f.log.info(format!("Run method test {}", i));
        }

        assert!(wait_until(|| f.out.text().contains("Run method test 9")));
        let out = f.out.text();
        let positions: Vec<_> = (0..10)
            .map(|i| out.find(&format!("Run method test {}\n", i)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        logger.join();
    }

    // ==================== Archivo ====================

    #[test]
    fn test_file_sink_creates_new_log() {
        let f = fixture();
        let logger = Logger::spawn(&f.log, sinks(&f));

        f.log.request("GET", "/api/test", 200, "127.0.0.1");

        assert!(wait_until(|| f.path.exists()));
        let content = fs::read_to_string(&f.path).unwrap();
        let parsed: Vec<RequestRecord> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].route, "/api/test");
        assert_eq!(parsed[0].status, 200);
        logger.join();
    }

    #[test]
    fn test_file_sink_text_entries_are_strings() {
        let f = fixture();
        let logger = Logger::spawn(&f.log, sinks(&f));

        f.log.enqueue(LogTask::new(LogLevel::Warning, LogSink::File, "disco lleno"));

        assert!(wait_until(|| f.path.exists()));
        let parsed: Vec<String> =
            serde_json::from_str(&fs::read_to_string(&f.path).unwrap()).unwrap();
        assert_eq!(parsed, vec!["[WARNING] disco lleno".to_string()]);
        logger.join();
    }

    #[test]
    fn test_five_concurrent_producers_single_valid_array() {
        let f = fixture();
        let logger = Logger::spawn(&f.log, sinks(&f));

        let producers: Vec<_> = (0..5)
            .map(|i| {
                let log = f.log.clone();
                thread::spawn(move || log.request("GET", &format!("/p{}", i), 200, "127.0.0.1"))
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }

        let count = || {
            fs::read_to_string(&f.path)
                .ok()
                .and_then(|c| serde_json::from_str::<Vec<RequestRecord>>(&c).ok())
                .map(|v| v.len())
                .unwrap_or(0)
        };
        assert!(wait_until(|| count() == 5));

        let parsed: Vec<RequestRecord> =
            serde_json::from_str(&fs::read_to_string(&f.path).unwrap()).unwrap();
        let mut routes: Vec<_> = parsed.iter().map(|r| r.route.clone()).collect();
        routes.sort();
        assert_eq!(routes, vec!["/p0", "/p1", "/p2", "/p3", "/p4"]);
        logger.join();
    }

    #[test]
    fn test_malformed_file_reported_and_loop_continues() {
        let f = fixture();
        fs::create_dir_all(f.path.parent().unwrap()).unwrap();
        fs::write(&f.path, "corrupto").unwrap();
        let logger = Logger::spawn(&f.log, sinks(&f));

        f.log.request("GET", "/", 200, "127.0.0.1");
        f.log.info("sigo vivo");

        assert!(wait_until(|| f.out.text().contains("[INFO] sigo vivo")));
        assert!(f.err.text().contains("Malformed log file"));
        logger.join();
    }

    // ==================== Shutdown ====================

    #[test]
    fn test_shutdown_stops_consumer() {
        let f = fixture();
        let logger = Logger::spawn(&f.log, sinks(&f));
        assert!(logger.is_running());

        logger.shutdown();
        assert!(wait_until(|| !logger.is_running()));
        logger.join();
    }

    #[test]
    fn test_failed_spawn_leaves_logger_stopped() {
        let failed = io::Error::new(io::ErrorKind::OutOfMemory, "sin threads");
        let logger = Logger {
            shutdown: Arc::new(AtomicBool::new(false)),
            handle: Logger::started(Err(failed)),
        };

        assert!(!logger.is_running());
        logger.join();
    }
}
