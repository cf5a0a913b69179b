//! # Línea de Request
//! src/http/request.rs
//!
//! El pipeline no necesita un parser HTTP completo: solo extrae el método
//! y la ruta de la primera línea.
//!
//! ```text
//! GET /docs/index.html?v=2 HTTP/1.0\r\n
//! ─┬─ ─────────┬──────────
//!  │           └─ ruta (con query, se limpia al resolver el archivo)
//!  └─ método
//! ```

/// Métodos que el servidor reconoce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    GET,
}

impl Method {
    /// Reconoce un token de método (sensible a mayúsculas, como HTTP)
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "GET" => Some(Method::GET),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primera línea del request, sin el `\r\n`
pub fn request_line(raw: &str) -> &str {
    raw.lines().next().unwrap_or("")
}

/// Primer token de la request line
pub fn method_token(raw: &str) -> Option<&str> {
    request_line(raw).split_whitespace().next()
}

/// Segundo token de la request line, o `None` si no hay
///
/// # Ejemplo
/// ```
/// use file_server::http::request::parse_route;
///
/// assert_eq!(parse_route("GET /index.html HTTP/1.0\r\n\r\n").as_deref(), Some("/index.html"));
/// assert_eq!(parse_route("GET").as_deref(), None);
/// ```
pub fn parse_route(raw: &str) -> Option<String> {
    request_line(raw)
        .split_whitespace()
        .nth(1)
        .map(str::to_string)
}

/// Quita el query string (`?...`) y el fragmento (`#...`)
pub fn strip_query(route: &str) -> &str {
    route
        .split(['?', '#'])
        .next()
        .unwrap_or(route)
}
