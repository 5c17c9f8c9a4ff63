//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del servidor HTTP/1.0 desde argumentos CLI y variables de
//! entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./http1_server 8080 \
//!   --root ./public \
//!   --max-workers 50 \
//!   --request-timeout-ms 3000
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 HTTP_HOST=127.0.0.1 DOCUMENT_ROOT=./public ./http1_server
//! ```

use crate::server::connection::ConnectionSettings;
use crate::server::pool::PoolConfig;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Configuración del servidor HTTP/1.0
#[derive(Debug, Clone, Parser)]
#[command(name = "http1_server")]
#[command(about = "Servidor HTTP/1.0 con archivos estáticos y CGI")]
#[command(version)]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "HTTP_HOST")]
    pub host: String,

    /// Directorio desde el que se sirven archivos y scripts
    #[arg(long, default_value = ".", env = "DOCUMENT_ROOT")]
    pub root: PathBuf,

    // === Workers ===

    /// Threads residentes del pool
    #[arg(long = "core-workers", default_value = "5", env = "CORE_WORKERS")]
    pub core_workers: usize,

    /// Máximo de conexiones atendidas a la vez; el resto recibe 503
    #[arg(long = "max-workers", default_value = "50", env = "MAX_WORKERS")]
    pub max_workers: usize,

    /// Tiempo que un thread extra espera trabajo antes de terminar
    #[arg(long = "worker-keep-alive-ms", default_value = "60000", env = "WORKER_KEEP_ALIVE_MS")]
    pub worker_keep_alive_ms: u64,

    // === Timeouts ===

    /// Deadline para recibir el request, desde el accept (408 al vencer)
    #[arg(long = "request-timeout-ms", default_value = "3000", env = "REQUEST_TIMEOUT_MS")]
    pub request_timeout_ms: u64,

    /// Pausa máxima entre bytes una vez que el request empezó a llegar
    #[arg(long = "read-gap-ms", default_value = "100", env = "READ_GAP_MS")]
    pub read_gap_ms: u64,

    /// Espera entre escribir la respuesta y cerrar la conexión
    #[arg(long = "drain-ms", default_value = "250", env = "DRAIN_MS")]
    pub drain_ms: u64,

    // === Límites ===

    /// Tamaño máximo de un request en bytes
    #[arg(long = "max-request-bytes", default_value = "65536", env = "MAX_REQUEST_BYTES")]
    pub max_request_bytes: usize,
}

impl Config {
    /// Dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use http1_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.max_workers == 0 {
            return Err("Max workers must be >= 1".to_string());
        }
        if self.core_workers > self.max_workers {
            return Err("Core workers must be <= max workers".to_string());
        }

        if self.request_timeout_ms == 0 {
            return Err("Request timeout must be > 0".to_string());
        }
        if self.read_gap_ms == 0 {
            return Err("Read gap must be > 0".to_string());
        }

        if self.max_request_bytes == 0 {
            return Err("Max request bytes must be >= 1".to_string());
        }

        Ok(())
    }

    /// Tamaños del pool de workers
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            core: self.core_workers,
            max: self.max_workers,
            keep_alive: Duration::from_millis(self.worker_keep_alive_ms),
        }
    }

    /// Límites por conexión
    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            read_gap: Duration::from_millis(self.read_gap_ms),
            drain: Duration::from_millis(self.drain_ms),
            max_request_bytes: self.max_request_bytes,
        }
    }

    /// Registra un resumen de la configuración
    pub fn log_summary(&self) {
        info!(
            address = %self.address(),
            root = %self.root.display(),
            core_workers = self.core_workers,
            max_workers = self.max_workers,
            worker_keep_alive_ms = self.worker_keep_alive_ms,
            "server configuration"
        );
        info!(
            request_timeout_ms = self.request_timeout_ms,
            read_gap_ms = self.read_gap_ms,
            drain_ms = self.drain_ms,
            max_request_bytes = self.max_request_bytes,
            "connection limits"
        );
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            root: PathBuf::from("."),
            core_workers: 5,
            max_workers: 50,
            worker_keep_alive_ms: 60_000,
            request_timeout_ms: 3_000,
            read_gap_ms: 100,
            drain_ms: 250,
            max_request_bytes: 65_536,
        }
    }
}
