//! # Módulo HTTP
//!
//! Implementa el protocolo HTTP/1.0 desde cero, sin librerías de alto
//! nivel. Incluye:
//!
//! - Validación y parsing de requests HTTP/1.0
//! - Construcción y escritura de responses HTTP
//! - Headers estándar (Content-Type, Last-Modified, Expires, ...)
//! - Códigos de estado
//! - Decodificación de payloads urlencoded
//!
//! ## Especificación HTTP/1.0
//!
//! El protocolo HTTP/1.0 (RFC 1945) es más simple que HTTP/1.1:
//! - No requiere el header `Host`
//! - No tiene chunked transfer encoding
//! - Una conexión atiende exactamente un request
//!
//! ### Formato de Request
//!
//! ```text
//! GET /index.html HTTP/1.0\r\n
//! If-Modified-Since: Sun, 06 Nov 1994 08:49:37 GMT\r\n
//! \r\n
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.0 304 Not Modified\r\n
//! Expires: Sat, 12 Nov 1994 02:49:37 GMT\r\n
//! \r\n
//! ```

pub mod headers;    // Bloque de headers estándar y fechas HTTP
pub mod request;    // Parsing de HTTP requests
pub mod response;   // Construcción de HTTP responses
pub mod status;     // Códigos de estado HTTP
pub mod urlencoded; // Payloads application/x-www-form-urlencoded

// Re-exportamos los tipos principales para facilitar su uso
// Esto permite usar `http::Request` en vez de `http::request::Request`
pub use request::{Method, Request};
pub use response::Response;
pub use status::StatusCode;
