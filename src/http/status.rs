//! # Códigos de Estado HTTP
//! src/http/status.rs
//!
//! Códigos de estado HTTP/1.0 que puede emitir el servidor.
//! Según el RFC 1945, HTTP/1.0 define códigos en 5 categorías:
//!
//! - **2xx**: Éxito (200, 204)
//! - **3xx**: Redirección (solo 304 para GET condicional)
//! - **4xx**: Error del cliente (400, 403, 404, 405, 408, 411)
//! - **5xx**: Error del servidor (500, 501, 503, 505)
//!
//! Las frases de razón son cadenas fijas: nunca se derivan del request.

/// Representa los códigos de estado HTTP que soporta nuestro servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// 200 OK - La petición fue exitosa
    Ok = 200,

    /// 204 No Content - El script CGI no produjo salida
    NoContent = 204,

    /// 304 Not Modified - GET condicional sobre un recurso sin cambios
    NotModified = 304,

    /// 400 Bad Request - Request malformado o recurso que es un directorio
    BadRequest = 400,

    /// 403 Forbidden - Sin permisos de lectura o ejecución
    Forbidden = 403,

    /// 404 Not Found - Recurso no encontrado
    NotFound = 404,

    /// 405 Method Not Allowed - POST sobre algo que no es `.cgi`
    MethodNotAllowed = 405,

    /// 408 Request Timeout - El cliente no envió nada a tiempo
    RequestTimeout = 408,

    /// 411 Length Required - POST sin Content-Length válido
    LengthRequired = 411,

    /// 500 Internal Server Error - Error interno del servidor
    InternalServerError = 500,

    /// 501 Not Implemented - Método conocido pero no soportado
    NotImplemented = 501,

    /// 503 Service Unavailable - Pool de workers saturado
    ServiceUnavailable = 503,

    /// 505 HTTP Version Not Supported - Versión mayor a 1.0
    HttpVersionNotSupported = 505,
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use http1_server::http::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Retorna el texto de razón (reason phrase) asociado al código
    ///
    /// # Ejemplo
    /// ```
    /// use http1_server::http::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::NoContent => "No Content",
            StatusCode::NotModified => "Not Modified",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::RequestTimeout => "Request Timeout",
            StatusCode::LengthRequired => "Length Required",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
            StatusCode::ServiceUnavailable => "Service Unavailable",
            StatusCode::HttpVersionNotSupported => "HTTP Version Not Supported",
        }
    }

    /// Verifica si el código indica éxito (2xx)
    pub fn is_success(&self) -> bool {
        matches!(self, StatusCode::Ok | StatusCode::NoContent)
    }

    /// Verifica si el código indica error del cliente (4xx)
    pub fn is_client_error(&self) -> bool {
        let code = self.as_u16();
        (400..500).contains(&code)
    }

    /// Verifica si el código indica error del servidor (5xx)
    pub fn is_server_error(&self) -> bool {
        let code = self.as_u16();
        (500..600).contains(&code)
    }

    /// Status line completa, sin el CRLF final
    ///
    /// ```
    /// use http1_server::http::StatusCode;
    /// assert_eq!(StatusCode::NotFound.status_line(), "HTTP/1.0 404 Not Found");
    /// ```
    pub fn status_line(&self) -> String {
        format!("HTTP/1.0 {}", self)
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
