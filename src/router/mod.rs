//! # Despacho de requests
//! src/router/mod.rs
//!
//! El router decide qué handler atiende un request ya validado.
//!
//! ## Arquitectura
//!
//! ```text
//! Request ─► versión > 1.0 ───────────► 505
//!         ─► GET / HEAD ─► static_file
//!         ─► POST ───────► cgi
//!         ─► PUT, DELETE, LINK, UNLINK ► 501
//! ```
//!
//! Cualquier `HandlerError` se traduce aquí a su código de estado, así que
//! `route` siempre produce exactamente una respuesta.

use crate::handlers::{cgi, static_file};
use crate::http::{Method, Request, Response, StatusCode};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Router que despacha por método contra un document root
#[derive(Debug, Clone)]
pub struct Router {
    /// Directorio desde el que se resuelven los targets
    root: PathBuf,
}

impl Router {
    /// Crea un router sobre un document root
    ///
    /// # Ejemplo
    /// ```
    /// use http1_server::router::Router;
    ///
    /// let router = Router::new(".");
    /// assert_eq!(router.root(), std::path::Path::new("."));
    /// ```
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ejecuta el handler apropiado para un request
    ///
    /// `server_addr` es la dirección local del socket (la que ve el
    /// cliente); se le pasa a los scripts CGI.
    pub fn route(&self, request: &Request, server_addr: SocketAddr) -> Response {
        if !request.version().is_supported() {
            return Response::status_only(StatusCode::HttpVersionNotSupported);
        }

        let result = match request.method() {
            Method::GET | Method::HEAD => static_file::serve(request, &self.root),
            Method::POST => cgi::invoke(request, &self.root, server_addr),
            Method::PUT | Method::DELETE | Method::LINK | Method::UNLINK => {
                return Response::status_only(StatusCode::NotImplemented);
            }
        };

        result.unwrap_or_else(|e| {
            let status = e.status();
            warn!(target_path = request.target(), error = %e, status = status.as_u16(), "request failed");
            Response::status_only(status)
        })
    }
}

impl Default for Router {
    /// Router sobre el directorio de trabajo actual
    fn default() -> Self {
        Self::new(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn addr() -> SocketAddr {
        "127.0.0.1:8080".parse().unwrap()
    }

    fn route(router: &Router, raw: &str) -> Response {
        let request = Request::parse(raw.as_bytes()).unwrap();
        router.route(&request, addr())
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("router_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_router_creation() {
        let router = Router::default();
        assert_eq!(router.root(), Path::new("."));
    }

    #[test]
    fn test_newer_version_is_rejected_before_lookup() {
        let router = Router::new("/definitely/not/a/real/root");

        let response = route(&router, "GET /missing.txt HTTP/1.1\r\n\r\n");
        assert_eq!(response.status(), StatusCode::HttpVersionNotSupported);

        let response = route(&router, "POST /missing.cgi HTTP/2.0\r\n\r\n");
        assert_eq!(response.status(), StatusCode::HttpVersionNotSupported);
    }

    #[test]
    fn test_unimplemented_methods() {
        let router = Router::default();
        for method in ["PUT", "DELETE", "LINK", "UNLINK"] {
            let response = route(&router, &format!("{} /index.html HTTP/1.0\r\n\r\n", method));
            assert_eq!(response.status(), StatusCode::NotImplemented, "{}", method);
        }
    }

    #[test]
    fn test_get_and_head_go_to_static_files() {
        let root = scratch_dir("static");
        fs::write(root.join("index.html"), "<p>hi</p>").unwrap();
        let router = Router::new(&root);

        assert_eq!(route(&router, "GET /index.html HTTP/1.0\r\n\r\n").status(), StatusCode::Ok);
        assert_eq!(route(&router, "HEAD /index.html HTTP/1.0\r\n\r\n").status(), StatusCode::Ok);
        assert_eq!(route(&router, "GET /nope HTTP/0.9\r\n\r\n").status(), StatusCode::NotFound);

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_post_goes_to_cgi() {
        let root = scratch_dir("cgi");
        fs::write(root.join("index.html"), "<p>hi</p>").unwrap();
        let router = Router::new(&root);

        let raw = "POST /index.html HTTP/1.0\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: 0\r\n\r\n";
        assert_eq!(route(&router, raw).status(), StatusCode::MethodNotAllowed);

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_handler_errors_become_status_codes() {
        let root = scratch_dir("errors");
        fs::write(root.join("a.cgi"), "#!/bin/sh\nexit 0\n").unwrap();
        let router = Router::new(&root);

        let raw = "POST /a.cgi HTTP/1.0\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: 2\r\n\r\n%q\r\n";
        assert_eq!(route(&router, raw).status(), StatusCode::BadRequest);

        let _ = fs::remove_dir_all(&root);
    }
}
