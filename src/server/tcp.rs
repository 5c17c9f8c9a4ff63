//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Loop de aceptación del servidor. Cada conexión aceptada se entrega al
//! pool de workers; si el pool está saturado se responde 503 desde el mismo
//! thread de aceptación y la conexión se cierra sin leerla.

use crate::config::Config;
use crate::error::ServerError;
use crate::router::Router;
use crate::server::connection::{ConnectionWorker, PendingConnection};
use crate::server::pool::WorkerPool;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use tracing::{info, warn};

/// Servidor HTTP/1.0 con pool acotado de workers
pub struct Server {
    listener: TcpListener,
    worker: Arc<ConnectionWorker>,
    pool: WorkerPool,
}

impl Server {
    /// Abre el socket de escucha
    ///
    /// # Errores
    ///
    /// - `ServerError::AddressInUse` si el puerto ya está tomado
    /// - `ServerError::Bind` para cualquier otra falla de bind
    pub fn bind(config: &Config) -> Result<Self, ServerError> {
        let address = config.address();
        let listener =
            TcpListener::bind(&address).map_err(|e| ServerError::from_bind(&address, e))?;

        let router = Router::new(config.root.clone());
        let worker = ConnectionWorker::new(router, config.connection_settings());

        Ok(Self {
            listener,
            worker: Arc::new(worker),
            pool: WorkerPool::new(config.pool_config()),
        })
    }

    /// Dirección real del socket (útil con puerto 0)
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Acepta conexiones hasta que el listener deje de producirlas
    pub fn run(&self) {
        if let Ok(addr) = self.local_addr() {
            info!(address = %addr, max_workers = self.pool.config().max, "listening");
        }

        for stream in self.listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    warn!(error = %e, "failed to accept connection");
                    continue;
                }
            };

            let pending = PendingConnection::new(stream, Arc::clone(&self.worker));

            if let Err(rejected) = self.pool.try_execute(pending) {
                rejected.reject();
            }
        }
    }
}
