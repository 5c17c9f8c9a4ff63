//! # Ejecución de scripts CGI (POST)
//! src/handlers/cgi.rs
//!
//! Un POST ejecuta el recurso como proceso hijo:
//!
//! ```text
//!   request ──► validaciones (404/400/411/500/405)
//!           ──► decodificar body (%XX) ──► stdin del hijo
//!           ──► esperar a que termine ──► stdout = body de la respuesta
//! ```
//!
//! El hijo recibe un entorno limpio con las variables de [`CgiEnvironment`]
//! (más `PATH`, para que el intérprete del shebang pueda encontrar sus
//! comandos).
//!
//! La espera no tiene timeout: un script colgado retiene su worker.

use crate::error::HandlerError;
use crate::handlers::resource::Resource;
use crate::http::{urlencoded, Request, Response, StatusCode};
use std::fs;
use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Único Content-Type aceptado en un POST
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Variables de entorno que recibe el script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CgiEnvironment {
    /// Largo del payload ya decodificado (o el Content-Length si no hay body)
    pub content_length: u64,

    /// Target del request (ej: "/cgi_bin/basic.cgi")
    pub script_name: String,

    /// Dirección local a la que se conectó el cliente
    pub server_name: String,

    pub server_port: u16,

    /// Valor del header `From`
    pub http_from: Option<String>,

    /// Valor del header `User-Agent`
    pub http_user_agent: Option<String>,
}

impl CgiEnvironment {
    /// Pares (variable, valor) para el proceso hijo
    pub fn vars(&self) -> Vec<(&'static str, String)> {
        let mut vars = vec![
            ("CONTENT_LENGTH", self.content_length.to_string()),
            ("SCRIPT_NAME", self.script_name.clone()),
            ("SERVER_NAME", self.server_name.clone()),
            ("SERVER_PORT", self.server_port.to_string()),
        ];
        if let Some(from) = &self.http_from {
            vars.push(("HTTP_FROM", from.clone()));
        }
        if let Some(agent) = &self.http_user_agent {
            vars.push(("HTTP_USER_AGENT", agent.clone()));
        }
        vars
    }
}

/// Atiende un POST ejecutando el recurso como script CGI
///
/// `server_addr` es la dirección local del socket del cliente.
pub fn invoke(
    request: &Request,
    root: &Path,
    server_addr: SocketAddr,
) -> Result<Response, HandlerError> {
    let resource = match Resource::resolve(root, request.target()) {
        Ok(resource) => resource,
        Err(status) => return Ok(Response::status_only(status)),
    };

    let Some(mut content_length) = request.content_length() else {
        return Ok(Response::status_only(StatusCode::LengthRequired));
    };

    if request.content_type() != Some(FORM_CONTENT_TYPE) {
        return Ok(Response::status_only(StatusCode::InternalServerError));
    }

    if !resource.is_cgi() {
        return Ok(Response::status_only(StatusCode::MethodNotAllowed));
    }

    let payload = request.body().map(urlencoded::decode).transpose()?;
    if let Some(payload) = &payload {
        content_length = payload.len() as u64;
    }

    let env = CgiEnvironment {
        content_length,
        script_name: request.target().to_string(),
        server_name: server_addr.ip().to_string(),
        server_port: server_addr.port(),
        http_from: request.from_header().map(str::to_string),
        http_user_agent: request.user_agent().map(str::to_string),
    };

    let output = run_script(resource.path(), env, payload.as_deref())?;

    let status = if output.is_empty() {
        StatusCode::NoContent
    } else {
        StatusCode::Ok
    };

    let response = Response::new(status)
        .with_standard_headers(&resource.cgi_headers(output.len() as u64));

    if output.is_empty() {
        Ok(response)
    } else {
        Ok(response.with_body(output).with_trailing_crlf())
    }
}

/// Ejecuta el script, le pasa el payload por stdin y retorna su stdout
///
/// Un script sin permiso de ejecución falla en `spawn` con
/// `PermissionDenied`, que termina como 403.
pub fn run_script(
    script: &Path,
    env: CgiEnvironment,
    payload: Option<&[u8]>,
) -> io::Result<Vec<u8>> {
    let program = fs::canonicalize(script)?;

    let mut command = Command::new(&program);
    command
        .env_clear()
        .envs(env.vars())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());
    if let Some(path) = std::env::var_os("PATH") {
        command.env("PATH", path);
    }

    let mut child = command.spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        if let Some(payload) = payload {
            match stdin.write_all(payload).and_then(|_| stdin.flush()) {
                Ok(()) => {}
                // El script terminó sin leer su entrada: no es un error
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                    debug!(script = %program.display(), "script closed stdin early");
                }
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(e);
                }
            }
        }
        // stdin se cierra aquí
    }

    let output = child.wait_with_output()?;
    if !output.status.success() {
        warn!(script = %program.display(), status = %output.status, "CGI script exited unsuccessfully");
    }

    Ok(output.stdout)
}
