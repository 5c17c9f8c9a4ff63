//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! API para construir respuestas HTTP/1.0 y escribirlas directamente sobre
//! el socket con un `BufWriter`, sin concatenar la respuesta en un `String`.
//!
//! ## Formato de una respuesta HTTP/1.0
//!
//! ```text
//! HTTP/1.0 200 OK\r\n
//! Content-Type: text/html\r\n
//! Content-Length: 13\r\n
//! ...\r\n
//! \r\n
//! <body>\r\n
//! ```
//!
//! ## Ejemplo de uso
//!
//! ```
//! use http1_server::http::{Response, StatusCode};
//!
//! let response = Response::new(StatusCode::Ok)
//!     .with_header("Content-Type", "text/html")
//!     .with_body(b"<p>hola</p>".to_vec());
//!
//! let bytes = response.into_bytes().unwrap();
//! assert!(bytes.starts_with(b"HTTP/1.0 200 OK\r\n"));
//! ```

use super::headers::{self, StandardHeaders};
use super::StatusCode;
use std::fs::File;
use std::io::{self, BufWriter, Write};

/// Cuerpo de una respuesta
#[derive(Debug)]
pub enum Body {
    /// Sin cuerpo (HEAD, errores, 204)
    Empty,

    /// Cuerpo ya en memoria
    Bytes(Vec<u8>),

    /// Archivo que se copia al socket al escribir la respuesta
    File(File),
}

/// Representa una respuesta HTTP/1.0 completa
#[derive(Debug)]
pub struct Response {
    status: StatusCode,

    /// Headers en el orden en que se escriben
    headers: Vec<(String, String)>,

    body: Body,

    /// CRLF extra después del body
    trailing_crlf: bool,
}

impl Response {
    /// Crea una respuesta sin headers ni body
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Body::Empty,
            trailing_crlf: false,
        }
    }

    /// Respuesta de solo status line
    ///
    /// Es la forma de todas las respuestas de error: status line y línea
    /// vacía, sin headers.
    ///
    /// ```
    /// use http1_server::http::{Response, StatusCode};
    ///
    /// let bytes = Response::status_only(StatusCode::NotFound).into_bytes().unwrap();
    /// assert_eq!(bytes, b"HTTP/1.0 404 Not Found\r\n\r\n");
    /// ```
    pub fn status_only(status: StatusCode) -> Self {
        Self::new(status)
    }

    /// 304 Not Modified con su header `Expires`
    pub fn not_modified() -> Self {
        Self::new(StatusCode::NotModified).with_header("Expires", &headers::expires_from_now())
    }

    /// Agrega un header (se permiten duplicados; se respeta el orden)
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Agrega un header a una respuesta existente (versión mutable)
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    /// Agrega el bloque estándar (Content-Type ... Expires)
    pub fn with_standard_headers(mut self, standard: &StandardHeaders) -> Self {
        for (name, value) in standard.to_pairs() {
            self.headers.push((name.to_string(), value));
        }
        self
    }

    /// Establece el cuerpo desde bytes
    ///
    /// No toca `Content-Length`: ese valor lo decide el bloque estándar.
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Body::Bytes(body);
        self
    }

    /// Establece un archivo como cuerpo; se copia al escribir
    pub fn with_file_body(mut self, file: File) -> Self {
        self.body = Body::File(file);
        self
    }

    /// Termina el cuerpo con un CRLF adicional
    pub fn with_trailing_crlf(mut self) -> Self {
        self.trailing_crlf = true;
        self
    }

    /// Escribe la respuesta completa en `out`
    ///
    /// Genera:
    /// - Status line: `HTTP/1.0 200 OK\r\n`
    /// - Headers: `Header-Name: Value\r\n`
    /// - Línea vacía: `\r\n`
    /// - Body (y el CRLF final si corresponde)
    pub fn write_to<W: Write>(self, out: W) -> io::Result<()> {
        let mut writer = BufWriter::new(out);

        write!(writer, "{}\r\n", self.status.status_line())?;
        for (name, value) in &self.headers {
            write!(writer, "{}: {}\r\n", name, value)?;
        }
        writer.write_all(b"\r\n")?;

        match self.body {
            Body::Empty => {}
            Body::Bytes(bytes) => writer.write_all(&bytes)?,
            Body::File(mut file) => {
                io::copy(&mut file, &mut writer)?;
            }
        }

        if self.trailing_crlf {
            writer.write_all(b"\r\n")?;
        }

        writer.flush()
    }

    /// Convierte la respuesta a bytes (útil en tests y logs)
    pub fn into_bytes(self) -> io::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(buffer)
    }

    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Obtiene una referencia a los headers
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Primer header con ese nombre
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Obtiene una referencia al body
    pub fn body(&self) -> &Body {
        &self.body
    }
}
