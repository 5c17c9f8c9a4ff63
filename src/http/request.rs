//! # Parsing de Requests HTTP/1.0
//! src/http/request.rs
//!
//! Parser HTTP/1.0 escrito a mano en dos fases:
//!
//! 1. [`correct_format`]: valida la gramática de la request line.
//! 2. [`Request::parse`]: solo si el formato es válido, extrae método,
//!    target, versión, headers y body.
//!
//! ## Formato de un Request HTTP/1.0
//!
//! ```text
//! POST /cgi_bin/upcase.cgi HTTP/1.0\r\n
//! Content-Type: application/x-www-form-urlencoded\r\n
//! Content-Length: 9\r\n
//! \r\n
//! x=hola%21\r\n
//! ```
//!
//! El body es **una sola línea**: la que sigue a la primera línea vacía.
//! Payloads multilínea o binarios no están soportados.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Métodos HTTP/1.0 reconocidos por la gramática
///
/// Solo GET, HEAD y POST se atienden; el resto produce 501.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    GET,
    HEAD,
    POST,
    PUT,
    DELETE,
    LINK,
    UNLINK,
}

impl Method {
    /// Parsea un método desde su token exacto (sensible a mayúsculas)
    pub fn from_token(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            "HEAD" => Some(Method::HEAD),
            "POST" => Some(Method::POST),
            "PUT" => Some(Method::PUT),
            "DELETE" => Some(Method::DELETE),
            "LINK" => Some(Method::LINK),
            "UNLINK" => Some(Method::UNLINK),
            _ => None,
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::LINK => "LINK",
            Method::UNLINK => "UNLINK",
        }
    }

    /// Indica si el servidor implementa este método
    pub fn is_implemented(&self) -> bool {
        matches!(self, Method::GET | Method::HEAD | Method::POST)
    }
}

/// Versión HTTP declarada en la request line (ej: `HTTP/1.0`)
#[derive(Debug, Clone, PartialEq)]
pub struct Version {
    raw: String,
    number: f32,
}

impl Version {
    /// Parsea el token de versión: exactamente `HTTP/<número>`
    fn from_token(token: &str) -> Option<Self> {
        let parts: Vec<&str> = token.split('/').collect();
        if parts.len() != 2 || parts[0] != "HTTP" {
            return None;
        }
        let number = parts[1].parse::<f32>().ok()?;
        Some(Version {
            raw: token.to_string(),
            number,
        })
    }

    /// Token original (ej: "HTTP/1.0")
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Número de versión como flotante (ej: 1.0)
    pub fn number(&self) -> f32 {
        self.number
    }

    /// El servidor solo habla versiones <= 1.0
    pub fn is_supported(&self) -> bool {
        self.number <= 1.0
    }
}

/// Representa un request HTTP/1.0 parseado
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,

    /// Target tal como vino (ej: "/index.html")
    target: String,

    version: Version,

    /// Headers en orden de llegada; el nombre conserva mayúsculas
    headers: Vec<(String, String)>,

    /// Línea que sigue a la primera línea vacía, si existe
    body: Option<String>,
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Request vacío
    #[error("empty request")]
    EmptyRequest,

    /// Bytes que no son UTF-8
    #[error("request is not valid UTF-8")]
    InvalidEncoding,

    /// La request line no respeta la gramática
    #[error("malformed request line: {0:?}")]
    InvalidRequestLine(String),
}

/// Valida la gramática de la request line
///
/// Reglas:
/// - el texto no puede estar vacío;
/// - la primera línea (hasta el primer CRLF) no puede estar vacía ni tener
///   espacios al inicio o al final;
/// - separada por espacios simples, debe tener exactamente 3 tokens;
/// - el método es uno de GET, POST, HEAD, DELETE, PUT, LINK, UNLINK;
/// - el target empieza con `/`;
/// - la versión es `HTTP/<flotante>`.
///
/// # Ejemplo
/// ```
/// use http1_server::http::request::correct_format;
///
/// assert!(correct_format("GET /index.html HTTP/1.0\r\n\r\n"));
/// assert!(correct_format("UNLINK /a HTTP/0.9"));
/// assert!(!correct_format("get /index.html HTTP/1.0"));
/// assert!(!correct_format("GET  /index.html HTTP/1.0"));
/// ```
pub fn correct_format(raw: &str) -> bool {
    request_line_tokens(raw).is_some()
}

/// Tokens (método, target, versión) de una request line válida
fn request_line_tokens(raw: &str) -> Option<(Method, &str, Version)> {
    if raw.is_empty() {
        return None;
    }

    let line = raw.split("\r\n").next()?;
    if line.is_empty() || line.starts_with(' ') || line.ends_with(' ') {
        return None;
    }

    let tokens: Vec<&str> = line.split(' ').collect();
    if tokens.len() != 3 {
        return None;
    }

    let method = Method::from_token(tokens[0])?;
    let target = tokens[1];
    if !target.starts_with('/') {
        return None;
    }
    let version = Version::from_token(tokens[2])?;

    Some((method, target, version))
}

/// Regex de una línea de header: `token ":" valor`
fn header_line_regex() -> &'static Regex {
    static HEADER_LINE: OnceLock<Regex> = OnceLock::new();
    HEADER_LINE.get_or_init(|| {
        Regex::new(r"^([!#$%&'*+.^_`|~0-9A-Za-z-]+):[ \t]*(.*?)[ \t]*$")
            .expect("header regex is valid")
    })
}

impl Request {
    /// Parsea un request HTTP/1.0 desde bytes
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use http1_server::http::Request;
    ///
    /// let raw = b"GET /index.html HTTP/1.0\r\nUser-Agent: curl\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.target(), "/index.html");
    /// assert_eq!(request.header("User-Agent"), Some("curl"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        let text = std::str::from_utf8(buffer).map_err(|_| ParseError::InvalidEncoding)?;
        Self::parse_str(text)
    }

    /// Igual que [`Request::parse`] pero sobre texto ya decodificado
    pub fn parse_str(text: &str) -> Result<Self, ParseError> {
        if text.is_empty() {
            return Err(ParseError::EmptyRequest);
        }

        let (method, target, version) = request_line_tokens(text).ok_or_else(|| {
            let first = text.split("\r\n").next().unwrap_or_default();
            ParseError::InvalidRequestLine(first.to_string())
        })?;

        let lines = Self::significant_lines(text);
        let blank = lines.iter().skip(1).position(|l| l.is_empty()).map(|i| i + 1);

        let header_end = blank.unwrap_or(lines.len());
        let headers = Self::parse_headers(&lines[1..header_end]);
        let body = blank.and_then(|i| lines.get(i + 1)).map(|l| l.to_string());

        Ok(Request {
            method,
            target: target.to_string(),
            version,
            headers,
            body,
        })
    }

    /// Líneas separadas por CRLF, sin los segmentos vacíos del final
    ///
    /// Así `"...\r\n\r\n"` no deja una línea vacía colgando y un request
    /// que termina justo después de los headers no tiene body.
    fn significant_lines(text: &str) -> Vec<&str> {
        let mut lines: Vec<&str> = text.split("\r\n").collect();
        while lines.len() > 1 && lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        lines
    }

    /// Extrae los headers; líneas que no parecen `Nombre: valor` se ignoran
    fn parse_headers(lines: &[&str]) -> Vec<(String, String)> {
        let re = header_line_regex();
        lines
            .iter()
            .filter_map(|line| re.captures(line))
            .map(|caps| (caps[1].to_string(), caps[2].to_string()))
            .collect()
    }

    // === Métodos públicos para acceder a los campos ===

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Obtiene todos los headers en orden de llegada
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Obtiene el primer header con ese nombre exacto
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// `If-Modified-Since`, si viene
    pub fn if_modified_since(&self) -> Option<&str> {
        self.header("If-Modified-Since")
    }

    /// `Content-Type`, si viene
    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
    }

    /// `Content-Length` como entero no negativo
    ///
    /// Retorna `None` si falta o no es un número válido.
    pub fn content_length(&self) -> Option<u64> {
        self.header("Content-Length")?.parse().ok()
    }

    /// `From`, si viene
    pub fn from_header(&self) -> Option<&str> {
        self.header("From")
    }

    /// `User-Agent`, si viene
    pub fn user_agent(&self) -> Option<&str> {
        self.header("User-Agent")
    }

    /// Body del request (una sola línea)
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}
