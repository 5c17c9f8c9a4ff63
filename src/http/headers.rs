//! # Headers estándar de respuesta
//! src/http/headers.rs
//!
//! Toda respuesta 200/204 lleva el mismo bloque de headers, siempre en este
//! orden:
//!
//! ```text
//! Content-Type: text/html\r\n
//! Content-Length: 1234\r\n
//! Last-Modified: Sun, 06 Nov 1994 08:49:37 GMT\r\n
//! Content-Encoding: identity\r\n
//! Allow: GET, POST, HEAD\r\n
//! Expires: Sat, 12 Nov 1994 02:49:37 GMT\r\n
//! ```

use std::time::{Duration, SystemTime};

/// Desplazamiento de `Expires` respecto del momento de la respuesta
pub const EXPIRES_OFFSET: Duration = Duration::from_secs(525_600);

/// Valor fijo de `Allow`
pub const ALLOW: &str = "GET, POST, HEAD";

/// Valor fijo de `Content-Encoding`
pub const CONTENT_ENCODING: &str = "identity";

/// Content-Type de toda respuesta a POST
pub const CGI_CONTENT_TYPE: &str = "text/html";

/// Formatea un instante como fecha HTTP (`Sun, 06 Nov 1994 08:49:37 GMT`)
pub fn format_http_date(time: SystemTime) -> String {
    httpdate::fmt_http_date(time)
}

/// Parsea una fecha HTTP (RFC 1123, RFC 850 o asctime)
pub fn parse_http_date(value: &str) -> Option<SystemTime> {
    httpdate::parse_http_date(value.trim()).ok()
}

/// Valor de `Expires` para una respuesta generada ahora
pub fn expires_from_now() -> String {
    format_http_date(SystemTime::now() + EXPIRES_OFFSET)
}

/// MIME type según la extensión del archivo
///
/// El subtipo es la propia extensión; extensiones desconocidas (o ausentes)
/// caen en `application/octet-stream`.
///
/// ```
/// use http1_server::http::headers::mime_type;
///
/// assert_eq!(mime_type(Some("html")), "text/html");
/// assert_eq!(mime_type(Some("gif")), "image/gif");
/// assert_eq!(mime_type(Some("rs")), "application/octet-stream");
/// ```
pub fn mime_type(extension: Option<&str>) -> String {
    let (kind, subtype) = match extension {
        Some(ext @ ("txt" | "html")) => ("text", ext),
        Some(ext @ ("png" | "jpeg" | "gif")) => ("image", ext),
        Some(ext @ ("pdf" | "x-gzip" | "zip" | "octet-stream")) => ("application", ext),
        _ => ("application", "octet-stream"),
    };
    format!("{}/{}", kind, subtype)
}

/// Bloque de headers estándar de una respuesta
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardHeaders {
    pub content_type: String,
    pub content_length: u64,
    pub last_modified: SystemTime,
}

impl StandardHeaders {
    /// Headers para servir un archivo (GET/HEAD)
    pub fn for_file(extension: Option<&str>, length: u64, last_modified: SystemTime) -> Self {
        Self {
            content_type: mime_type(extension),
            content_length: length,
            last_modified,
        }
    }

    /// Headers para la salida de un script CGI (POST)
    ///
    /// El tipo es siempre `text/html` y el largo es el de la salida, no el
    /// del script.
    pub fn for_cgi(output_length: u64, last_modified: SystemTime) -> Self {
        Self {
            content_type: CGI_CONTENT_TYPE.to_string(),
            content_length: output_length,
            last_modified,
        }
    }

    /// Pares (nombre, valor) en el orden en que se escriben
    ///
    /// `Expires` se calcula en el momento de la llamada.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Content-Type", self.content_type.clone()),
            ("Content-Length", self.content_length.to_string()),
            ("Last-Modified", format_http_date(self.last_modified)),
            ("Content-Encoding", CONTENT_ENCODING.to_string()),
            ("Allow", ALLOW.to_string()),
            ("Expires", expires_from_now()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_types() {
        assert_eq!(mime_type(Some("txt")), "text/txt");
        assert_eq!(mime_type(Some("html")), "text/html");
        assert_eq!(mime_type(Some("png")), "image/png");
        assert_eq!(mime_type(Some("jpeg")), "image/jpeg");
        assert_eq!(mime_type(Some("pdf")), "application/pdf");
        assert_eq!(mime_type(Some("x-gzip")), "application/x-gzip");
        assert_eq!(mime_type(Some("zip")), "application/zip");
    }

    #[test]
    fn test_unknown_mime_defaults_to_octet_stream() {
        assert_eq!(mime_type(Some("jpg")), "application/octet-stream");
        assert_eq!(mime_type(Some("HTML")), "application/octet-stream");
        assert_eq!(mime_type(None), "application/octet-stream");
    }

    #[test]
    fn test_http_date_format() {
        let time = SystemTime::UNIX_EPOCH + Duration::from_secs(784_111_777);
        assert_eq!(format_http_date(time), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn test_parse_http_date_forms() {
        let expected = SystemTime::UNIX_EPOCH + Duration::from_secs(784_111_777);
        assert_eq!(parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT"), Some(expected));
        assert_eq!(parse_http_date("Sunday, 06-Nov-94 08:49:37 GMT"), Some(expected));
        assert_eq!(parse_http_date("Sun Nov  6 08:49:37 1994"), Some(expected));
        assert_eq!(parse_http_date("yesterday"), None);
    }

    #[test]
    fn test_header_order() {
        let headers = StandardHeaders::for_file(Some("png"), 42, SystemTime::UNIX_EPOCH);
        let names: Vec<&str> = headers.to_pairs().iter().map(|(n, _)| *n).collect();

        assert_eq!(
            names,
            vec!["Content-Type", "Content-Length", "Last-Modified", "Content-Encoding", "Allow", "Expires"]
        );
    }

    #[test]
    fn test_cgi_headers() {
        let headers = StandardHeaders::for_cgi(5, SystemTime::UNIX_EPOCH);
        let pairs = headers.to_pairs();

        assert_eq!(pairs[0].1, "text/html");
        assert_eq!(pairs[1].1, "5");
        assert_eq!(pairs[2].1, "Thu, 01 Jan 1970 00:00:00 GMT");
        assert_eq!(pairs[3].1, "identity");
        assert_eq!(pairs[4].1, "GET, POST, HEAD");
    }

    #[test]
    fn test_expires_is_in_the_future() {
        let expires = parse_http_date(&expires_from_now()).unwrap();
        assert!(expires > SystemTime::now());
    }
}
