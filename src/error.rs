//! # Errores del servidor
//! src/error.rs
//!
//! Dos familias de errores:
//!
//! - [`ServerError`]: fallas de arranque (bind, configuración). Abortan el
//!   proceso con un mensaje legible.
//! - [`HandlerError`]: fallas durante un request. Nunca salen de la
//!   conexión: se convierten en exactamente un código de estado.

use crate::http::urlencoded::DecodeError;
use crate::http::StatusCode;
use std::io;
use thiserror::Error;

/// Errores fatales al iniciar el servidor
#[derive(Debug, Error)]
pub enum ServerError {
    /// El puerto ya está tomado por otro proceso
    #[error("That port is already in use. Try a different port.")]
    AddressInUse { address: String },

    /// Cualquier otra falla al crear el socket de escucha
    #[error("Something went wrong when trying to listen on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    /// Configuración inválida
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ServerError {
    /// Clasifica un error de `TcpListener::bind`
    pub fn from_bind(address: &str, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::AddrInUse {
            ServerError::AddressInUse {
                address: address.to_string(),
            }
        } else {
            ServerError::Bind {
                address: address.to_string(),
                source,
            }
        }
    }
}

/// Errores no clasificados durante el manejo de un request
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Falla de I/O (archivo, socket, proceso hijo)
    #[error("I/O failure: {0}")]
    Io(#[from] io::Error),

    /// Payload urlencoded con un escape inválido
    #[error("malformed request body: {0}")]
    Decode(#[from] DecodeError),
}

impl HandlerError {
    /// Código de estado que corresponde a este error
    ///
    /// "Permission denied" → 403, escape inválido → 400, el resto → 500.
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::Io(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                StatusCode::Forbidden
            }
            HandlerError::Io(_) => StatusCode::InternalServerError,
            HandlerError::Decode(_) => StatusCode::BadRequest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_is_forbidden() {
        let err = HandlerError::from(io::Error::from(io::ErrorKind::PermissionDenied));
        assert_eq!(err.status(), StatusCode::Forbidden);
    }

    #[test]
    fn test_other_io_is_internal_error() {
        let err = HandlerError::from(io::Error::from(io::ErrorKind::BrokenPipe));
        assert_eq!(err.status(), StatusCode::InternalServerError);

        let err = HandlerError::from(io::Error::from(io::ErrorKind::Interrupted));
        assert_eq!(err.status(), StatusCode::InternalServerError);
    }

    #[test]
    fn test_decode_is_bad_request() {
        let err = HandlerError::from(DecodeError::Truncated(0));
        assert_eq!(err.status(), StatusCode::BadRequest);
    }

    #[test]
    fn test_bind_classification() {
        let in_use = ServerError::from_bind("0.0.0.0:80", io::Error::from(io::ErrorKind::AddrInUse));
        assert!(matches!(in_use, ServerError::AddressInUse { .. }));
        assert_eq!(in_use.to_string(), "That port is already in use. Try a different port.");

        let other = ServerError::from_bind("0.0.0.0:80", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(other, ServerError::Bind { .. }));
    }
}
