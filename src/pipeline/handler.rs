//! # Pipeline de Request
//! src/pipeline/handler.rs
//!
//! Atiende un request completo:
//!
//! ```text
//!                    ┌──► fetch de contenido (cache + monitor) ──┐
//! raw ─► ruta ──────┼──► validación del request ────────────────┼──► join ─► decidir ─► escribir
//!                    └──► construcción de headers ───────────────┘                         │
//!                                                                                         ▼
//!                                                                              log del request
//! ```
//!
//! Los tres sub-tasks corren en threads propios y no comparten estado
//! mutable. Solo importa que terminen todos antes de decidir la respuesta.

use super::fetch::FileService;
use super::headers::build_headers;
use super::validate::validate_request;
use crate::config::Config;
use crate::http::request::{method_token, request_line};
use crate::http::{parse_route, Response, StatusCode};
use crate::logging::LogHandle;
use crate::pool::current_interrupt;
use crate::sync::Interrupt;
use std::io::Write;
use std::sync::Arc;
use std::thread::{self, ScopedJoinHandle};
use std::time::Duration;

/// Orquestador de un request
#[derive(Clone)]
pub struct RequestPipeline {
    files: FileService,
    page_404: String,
    subtask_delay: Duration,
    log: LogHandle,
}

impl RequestPipeline {
    pub fn new(config: &Config, files: FileService, log: LogHandle) -> Self {
        Self {
            files,
            page_404: config.page_404.clone(),
            subtask_delay: config.subtask_delay(),
            log,
        }
    }

    /// Procesa `raw` y escribe la respuesta en `out`
    ///
    /// Retorna el status enviado, o `None` si el request no tenía ruta y
    /// se descartó sin responder.
    pub fn handle<W: Write>(&self, raw: &str, client: &str, out: &mut W) -> Option<StatusCode> {
        self.log
            .info(format!("Request received: {}", request_line(raw)));

        let Some(route) = parse_route(raw) else {
            self.log.error("Invalid request received.");
            return None;
        };

        // El worker que nos corre puede ser interrumpido; los sub-tasks
        // duermen sobre su misma señal
        let interrupt = current_interrupt();

        let (content, valid, headers) = thread::scope(|scope| {
            let content = scope.spawn(|| self.files.fetch(&route));
            let valid = scope.spawn(|| {
                self.pause(interrupt.as_deref());
                validate_request(raw)
            });
            let headers = scope.spawn(|| {
                self.pause(interrupt.as_deref());
                build_headers()
            });

            (
                self.join_subtask("content fetch", content, || Arc::from(Vec::new())),
                self.join_subtask("request validation", valid, || false),
                self.join_subtask("header construction", headers, Vec::new),
            )
        });

        let response = if !valid {
            self.log.error("Invalid request");
            Response::new(StatusCode::BadRequest).with_headers(headers)
        } else if content.is_empty() {
            let page = self.files.fetch(&self.page_404);
            Response::new(StatusCode::NotFound)
                .with_headers(headers)
                .with_body_bytes(page.to_vec())
        } else {
            Response::new(StatusCode::Ok)
                .with_headers(headers)
                .with_body_bytes(content.to_vec())
        };

        let status = response.status();
        match out
            .write_all(&response.to_bytes())
            .and_then(|()| out.flush())
        {
            Ok(()) => self.log.info(format!("Response sent: {} {}", status, route)),
            Err(e) => self
                .log
                .error(format!("Error writing response to {}: {}", client, e)),
        }

        let method = method_token(raw).unwrap_or("-");
        self.log.request(method, &route, status.as_u16(), client);

        Some(status)
    }

    /// Demora artificial de los sub-tasks
    fn pause(&self, interrupt: Option<&Interrupt>) {
        if self.subtask_delay.is_zero() {
            return;
        }
        match interrupt {
            Some(interrupt) => {
                if interrupt.sleep(self.subtask_delay).is_err() {
                    self.log.warning("Sub-task delay interrupted");
                }
            }
            None => thread::sleep(self.subtask_delay),
        }
    }

    /// Espera un sub-task; si hizo panic, usa `fallback`
    fn join_subtask<T>(
        &self,
        name: &str,
        handle: ScopedJoinHandle<'_, T>,
        fallback: impl FnOnce() -> T,
    ) -> T {
        handle.join().unwrap_or_else(|_| {
            self.log.error(format!("Sub-task {} failed", name));
            fallback()
        })
    }
}
