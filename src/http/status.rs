//! # Códigos de Estado HTTP
//! src/http/status.rs
//!
//! El servidor de archivos solo produce tres clases de respuesta:
//!
//! - **200**: el archivo se encontró y se envía
//! - **400**: el request no pasó la validación
//! - **404**: no hay contenido para la ruta (se envía la página 404)

/// Códigos que puede devolver el pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// 200 OK
    Ok = 200,

    /// 400 Bad Request - método no reconocido o request incompleto
    BadRequest = 400,

    /// 404 Not Found - archivo inexistente o ilegible
    NotFound = 404,
}

impl StatusCode {
    /// Valor numérico (el que va al log de requests)
    ///
    /// # Ejemplo
    /// ```
    /// use file_server::http::StatusCode;
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StatusCode::Ok)
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.as_u16())
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
