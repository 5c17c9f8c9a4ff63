//! # Worker de Conexión
//! src/server/connection.rs
//!
//! Un `ConnectionWorker` atiende una conexión de principio a fin:
//!
//! 1. Espera el primer byte con un deadline medido desde el `accept`
//!    (408 si no llega nada, 400 si el cliente cierra sin enviar).
//! 2. Sigue leyendo hasta EOF, mensaje completo, una pausa corta sin datos
//!    o el límite de tamaño.
//! 3. Parsea, despacha y escribe exactamente una respuesta.
//! 4. Flush, pausa de drenaje, cierre de lectura, cierre de escritura.

use crate::http::{Request, Response, StatusCode};
use crate::router::Router;
use crate::server::pool::Task;
use std::io::{self, Read};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Tiempo mínimo que se le pasa a `set_read_timeout` (cero no es válido)
const MIN_READ_TIMEOUT: Duration = Duration::from_millis(1);

const READ_CHUNK: usize = 8192;

/// Límites de tiempo y tamaño de una conexión
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Deadline para el primer byte, desde el `accept`
    pub request_timeout: Duration,

    /// Pausa máxima entre bytes una vez que el request empezó a llegar
    pub read_gap: Duration,

    /// Espera entre escribir la respuesta y cerrar el socket
    pub drain: Duration,

    /// Tamaño máximo del request en bytes
    pub max_request_bytes: usize,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_millis(3000),
            read_gap: Duration::from_millis(100),
            drain: Duration::from_millis(250),
            max_request_bytes: 64 * 1024,
        }
    }
}

/// Resultado de leer el request crudo
#[derive(Debug)]
enum Incoming {
    /// Bytes recibidos (al menos uno)
    Data(Vec<u8>),

    /// No llegó nada antes del deadline
    TimedOut,

    /// El cliente cerró sin enviar nada
    Empty,

    /// Error de socket antes del primer byte
    Failed(io::Error),
}

/// Atiende conexiones aceptadas
#[derive(Debug, Clone)]
pub struct ConnectionWorker {
    router: Router,
    settings: ConnectionSettings,
}

impl ConnectionWorker {
    pub fn new(router: Router, settings: ConnectionSettings) -> Self {
        Self { router, settings }
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Procesa una conexión completa y la cierra
    ///
    /// `accepted_at` es el instante del `accept`; el tiempo que la conexión
    /// pasó esperando un worker cuenta contra el deadline del request.
    pub fn handle(&self, mut stream: TcpStream, accepted_at: Instant) {
        let peer = peer_of(stream.peer_addr());

        let mut method = "-".to_string();
        let mut target = "-".to_string();

        let response = match self.read_request(&mut stream, accepted_at) {
            Incoming::Data(raw) => match Request::parse(&raw) {
                Ok(request) => {
                    method = request.method().as_str().to_string();
                    target = request.target().to_string();
                    self.dispatch(&request, &stream)
                }
                Err(e) => {
                    debug!(peer = %peer, error = %e, "rejecting malformed request");
                    Response::status_only(StatusCode::BadRequest)
                }
            },
            Incoming::TimedOut => Response::status_only(StatusCode::RequestTimeout),
            Incoming::Empty => Response::status_only(StatusCode::BadRequest),
            Incoming::Failed(e) => {
                warn!(peer = %peer, error = %e, "failed to read request");
                Response::status_only(StatusCode::InternalServerError)
            }
        };

        let status = response.status();
        if let Err(e) = response.write_to(&stream) {
            debug!(peer = %peer, error = %e, "failed to write response");
        }

        info!(
            peer = %peer,
            method = %method,
            target_path = %target,
            status = status.as_u16(),
            latency_ms = accepted_at.elapsed().as_secs_f64() * 1000.0,
            "request handled"
        );

        self.close(stream);
    }

    fn dispatch(&self, request: &Request, stream: &TcpStream) -> Response {
        match stream.local_addr() {
            Ok(server_addr) => self.router.route(request, server_addr),
            Err(e) => {
                warn!(error = %e, "local address unavailable");
                Response::status_only(StatusCode::InternalServerError)
            }
        }
    }

    /// Lee el request crudo respetando el deadline y los límites
    fn read_request(&self, stream: &mut TcpStream, accepted_at: Instant) -> Incoming {
        let mut chunk = [0u8; READ_CHUNK];

        let remaining = self
            .settings
            .request_timeout
            .saturating_sub(accepted_at.elapsed())
            .max(MIN_READ_TIMEOUT);
        if let Err(e) = stream.set_read_timeout(Some(remaining)) {
            return Incoming::Failed(e);
        }

        let first = loop {
            match stream.read(&mut chunk) {
                Ok(0) => return Incoming::Empty,
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if is_timeout(&e) => return Incoming::TimedOut,
                Err(e) => return Incoming::Failed(e),
            }
        };

        let limit = self.settings.max_request_bytes;
        let mut buffer = Vec::with_capacity(first);
        buffer.extend_from_slice(&chunk[..first.min(limit)]);

        if let Err(e) = stream.set_read_timeout(Some(self.settings.read_gap.max(MIN_READ_TIMEOUT))) {
            debug!(error = %e, "could not set read gap timeout");
            return Incoming::Data(buffer);
        }

        while buffer.len() < limit && !is_complete(&buffer) {
            match stream.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => {
                    let take = n.min(limit - buffer.len());
                    buffer.extend_from_slice(&chunk[..take]);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    if !is_timeout(&e) {
                        debug!(error = %e, "read interrupted by socket error");
                    }
                    break;
                }
            }
        }

        Incoming::Data(buffer)
    }

    /// Drenaje y cierre ordenado: lectura primero, escritura después
    fn close(&self, stream: TcpStream) {
        thread::sleep(self.settings.drain);
        let _ = stream.shutdown(Shutdown::Read);
        let _ = stream.shutdown(Shutdown::Write);
    }
}

/// `WouldBlock` en Unix y `TimedOut` en Windows señalan un read timeout
fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

/// ¿El buffer ya contiene un mensaje completo?
///
/// Completo = terminador de headers visto y, si hay un `Content-Length`
/// numérico, esa cantidad de bytes después del terminador.
fn is_complete(buffer: &[u8]) -> bool {
    let Some(end) = find_subsequence(buffer, b"\r\n\r\n") else {
        return false;
    };
    let body_start = end + 4;

    let head = String::from_utf8_lossy(&buffer[..end]);
    let declared = head
        .split("\r\n")
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("Content-Length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok());

    match declared {
        Some(length) => buffer.len() - body_start >= length,
        None => true,
    }
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Conexión aceptada a la espera de un worker
pub struct PendingConnection {
    stream: TcpStream,
    accepted_at: Instant,
    worker: Arc<ConnectionWorker>,
}

impl PendingConnection {
    pub fn new(stream: TcpStream, worker: Arc<ConnectionWorker>) -> Self {
        Self {
            stream,
            accepted_at: Instant::now(),
            worker,
        }
    }

    /// Responde 503 y cierra sin leer el request
    pub fn reject(self) {
        let peer = peer_of(self.stream.peer_addr());

        if let Err(e) = Response::status_only(StatusCode::ServiceUnavailable).write_to(&self.stream) {
            debug!(peer = %peer, error = %e, "failed to write 503");
        }
        let _ = self.stream.shutdown(Shutdown::Write);

        info!(peer = %peer, status = 503, "connection rejected, pool saturated");
    }
}

impl Task for PendingConnection {
    fn run(self: Box<Self>) {
        let PendingConnection {
            stream,
            accepted_at,
            worker,
        } = *self;
        worker.handle(stream, accepted_at);
    }
}

fn peer_of(addr: io::Result<SocketAddr>) -> String {
    addr.map(|a| a.to_string()).unwrap_or_else(|_| "unknown".to_string())
}
