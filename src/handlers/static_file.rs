//! # Archivos estáticos (GET / HEAD)
//! src/handlers/static_file.rs
//!
//! Flujo:
//!
//! ```text
//! resolve ─┬─ no existe ─────────────────────────── 404
//!          ├─ directorio ────────────────────────── 400
//!          └─ archivo ─┬─ GET + If-Modified-Since ─ 304 (si no cambió)
//!                      ├─ sin permiso de lectura ── 403
//!                      └─ 200 + headers [+ body si es GET]
//! ```
//!
//! HEAD nunca es condicional y nunca lleva body.

use crate::error::HandlerError;
use crate::handlers::resource::Resource;
use crate::http::headers::parse_http_date;
use crate::http::{Method, Request, Response, StatusCode};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Atiende un GET o HEAD contra el document root
pub fn serve(request: &Request, root: &Path) -> Result<Response, HandlerError> {
    let resource = match Resource::resolve(root, request.target()) {
        Ok(resource) => resource,
        Err(status) => return Ok(Response::status_only(status)),
    };

    if request.method() == Method::GET && is_not_modified(request, &resource) {
        return Ok(Response::not_modified());
    }

    // PermissionDenied se convierte en 403 vía HandlerError::status
    let mut file = File::open(resource.path())?;

    let response = Response::new(StatusCode::Ok).with_standard_headers(&resource.file_headers());

    if request.method() == Method::HEAD {
        return Ok(response);
    }

    if resource.is_text() {
        let mut raw = Vec::new();
        file.read_to_end(&mut raw)?;
        Ok(response.with_body(compress_whitespace(&raw)).with_trailing_crlf())
    } else {
        Ok(response.with_file_body(file).with_trailing_crlf())
    }
}

/// ¿El recurso no cambió desde la fecha que manda el cliente?
///
/// Una fecha que no se puede parsear se ignora y el GET es normal.
fn is_not_modified(request: &Request, resource: &Resource) -> bool {
    let Some(raw) = request.if_modified_since() else {
        return false;
    };

    match parse_http_date(raw) {
        Some(since) => resource.last_modified() <= since,
        None => {
            debug!(value = raw, "ignoring unparseable If-Modified-Since");
            false
        }
    }
}

/// Contenido de texto como sus palabras concatenadas, sin separadores
fn compress_whitespace(raw: &[u8]) -> Vec<u8> {
    String::from_utf8_lossy(raw)
        .split_whitespace()
        .collect::<String>()
        .into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::headers::format_http_date;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("static_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn request(raw: &str) -> Request {
        Request::parse(raw.as_bytes()).unwrap()
    }

    fn text(response: Response) -> String {
        String::from_utf8_lossy(&response.into_bytes().unwrap()).into_owned()
    }

    #[test]
    fn test_get_text_file() {
        let root = scratch_dir("get_text");
        fs::write(root.join("hello.txt"), "hello world\nsecond  line\n").unwrap();

        let response = serve(&request("GET /hello.txt HTTP/1.0\r\n\r\n"), &root).unwrap();
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.header("Content-Type"), Some("text/txt"));
        assert_eq!(response.header("Content-Length"), Some("25"));

        let body = text(response);
        assert!(body.ends_with("\r\n\r\nhelloworldsecondline\r\n"));

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_get_binary_file() {
        let root = scratch_dir("get_binary");
        let data = vec![0x89, b'P', b'N', b'G', 0x00, 0xFF];
        fs::write(root.join("img.png"), &data).unwrap();

        let response = serve(&request("GET /img.png HTTP/1.0\r\n\r\n"), &root).unwrap();
        assert_eq!(response.header("Content-Type"), Some("image/png"));
        assert_eq!(response.header("Content-Length"), Some("6"));

        let bytes = response.into_bytes().unwrap();
        let mut expected = data.clone();
        expected.extend_from_slice(b"\r\n");
        assert!(bytes.ends_with(&expected));

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_head_has_headers_but_no_body() {
        let root = scratch_dir("head");
        fs::write(root.join("page.html"), "<html></html>").unwrap();

        let response = serve(&request("HEAD /page.html HTTP/1.0\r\n\r\n"), &root).unwrap();
        assert_eq!(response.header("Content-Length"), Some("13"));

        let raw = text(response);
        let (_, after_headers) = raw.split_once("\r\n\r\n").unwrap();
        assert!(after_headers.is_empty());

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_missing_and_directory() {
        let root = scratch_dir("missing");
        fs::create_dir_all(root.join("dir")).unwrap();

        let missing = serve(&request("GET /none.txt HTTP/1.0\r\n\r\n"), &root).unwrap();
        assert_eq!(missing.status(), StatusCode::NotFound);

        let dir = serve(&request("HEAD /dir HTTP/1.0\r\n\r\n"), &root).unwrap();
        assert_eq!(dir.status(), StatusCode::BadRequest);

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_conditional_get() {
        let root = scratch_dir("conditional");
        fs::write(root.join("a.txt"), "a").unwrap();

        let future = format_http_date(SystemTime::now() + Duration::from_secs(3600));
        let raw = format!("GET /a.txt HTTP/1.0\r\nIf-Modified-Since: {}\r\n\r\n", future);
        let response = serve(&request(&raw), &root).unwrap();
        assert_eq!(response.status(), StatusCode::NotModified);
        assert!(response.header("Expires").is_some());

        let past = "Thu, 01 Jan 1970 00:00:00 GMT";
        let raw = format!("GET /a.txt HTTP/1.0\r\nIf-Modified-Since: {}\r\n\r\n", past);
        assert_eq!(serve(&request(&raw), &root).unwrap().status(), StatusCode::Ok);

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_conditional_get_with_exact_last_modified() {
        let root = scratch_dir("conditional_exact");
        fs::write(root.join("a.txt"), "a").unwrap();

        let first = serve(&request("GET /a.txt HTTP/1.0\r\n\r\n"), &root).unwrap();
        let last_modified = first.header("Last-Modified").unwrap().to_string();

        let raw = format!("GET /a.txt HTTP/1.0\r\nIf-Modified-Since: {}\r\n\r\n", last_modified);
        assert_eq!(serve(&request(&raw), &root).unwrap().status(), StatusCode::NotModified);

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_head_is_never_conditional() {
        let root = scratch_dir("head_conditional");
        fs::write(root.join("a.txt"), "a").unwrap();

        let future = format_http_date(SystemTime::now() + Duration::from_secs(3600));
        let raw = format!("HEAD /a.txt HTTP/1.0\r\nIf-Modified-Since: {}\r\n\r\n", future);
        assert_eq!(serve(&request(&raw), &root).unwrap().status(), StatusCode::Ok);

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_unparseable_if_modified_since_is_ignored() {
        let root = scratch_dir("bad_date");
        fs::write(root.join("a.txt"), "a").unwrap();

        let raw = "GET /a.txt HTTP/1.0\r\nIf-Modified-Since: someday\r\n\r\n";
        assert_eq!(serve(&request(raw), &root).unwrap().status(), StatusCode::Ok);

        let _ = fs::remove_dir_all(&root);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_forbidden() {
        use std::os::unix::fs::PermissionsExt;

        let root = scratch_dir("unreadable");
        let path = root.join("secret.txt");
        fs::write(&path, "secret").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();

        // Como root los permisos no aplican; no hay nada que probar
        if File::open(&path).is_ok() {
            let _ = fs::remove_dir_all(&root);
            return;
        }

        let result = serve(&request("GET /secret.txt HTTP/1.0\r\n\r\n"), &root);
        assert_eq!(result.unwrap_err().status(), StatusCode::Forbidden);

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_compress_whitespace() {
        assert_eq!(compress_whitespace(b"  a b\r\n\tc  "), b"abc");
        assert!(compress_whitespace(b" \n ").is_empty());
    }
}
