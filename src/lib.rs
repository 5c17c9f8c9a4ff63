//! # HTTP/1.0 Server
//! src/lib.rs
//!
//! Servidor HTTP/1.0 implementado desde cero: archivos estáticos con GET y
//! HEAD (incluyendo GET condicional), scripts CGI con POST, y un pool
//! acotado de workers que responde 503 cuando se satura.
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `http`: Parsing y construcción de mensajes HTTP/1.0
//! - `server`: Aceptación, pool de workers y ciclo de vida de conexiones
//! - `router`: Despacho por método
//! - `handlers`: Archivos estáticos y CGI
//! - `config`: Argumentos CLI y variables de entorno
//! - `error`: Errores de arranque y de atención de requests
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use http1_server::config::Config;
//! use http1_server::server::Server;
//!
//! let config = Config::default();
//! let server = Server::bind(&config).expect("bind");
//! server.run();
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod router;
pub mod server;
