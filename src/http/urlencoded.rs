//! # Decodificación de payloads `application/x-www-form-urlencoded`
//! src/http/urlencoded.rs
//!
//! Convierte cada escape `%XX` en su byte. Un escape incompleto o con
//! dígitos no hexadecimales es un error: el request falla en lugar de
//! entregarle al script un payload corrupto.
//!
//! El `+` literal se conserva tal cual; solo `%20` produce un espacio.

use thiserror::Error;

/// Error al decodificar un escape porcentual
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// `%` sin dos caracteres detrás
    #[error("truncated percent escape at byte {0}")]
    Truncated(usize),

    /// `%` seguido de algo que no son dos dígitos hexadecimales
    #[error("invalid percent escape {escape:?} at byte {position}")]
    InvalidEscape { position: usize, escape: String },
}

/// Decodifica un payload urlencoded a bytes
///
/// # Ejemplo
/// ```
/// use http1_server::http::urlencoded::decode;
///
/// assert_eq!(decode("a%20b%21").unwrap(), b"a b!");
/// assert!(decode("100%").is_err());
/// ```
pub fn decode(input: &str) -> Result<Vec<u8>, DecodeError> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'%' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }

        if i + 2 >= bytes.len() {
            return Err(DecodeError::Truncated(i));
        }

        match (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
            (Some(high), Some(low)) => out.push(high << 4 | low),
            _ => {
                return Err(DecodeError::InvalidEscape {
                    position: i,
                    escape: String::from_utf8_lossy(&bytes[i..i + 3]).into_owned(),
                })
            }
        }
        i += 3;
    }

    Ok(out)
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
