//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Este módulo implementa el servidor TCP que:
//! 1. Escucha en un puerto
//! 2. Acepta conexiones y decide si hay capacidad para atenderlas
//! 3. Lee y parsea un request por conexión
//! 4. Genera y envía la respuesta, y cierra la conexión
//!
//! - `tcp`: loop de aceptación
//! - `pool`: pool acotado de workers con admisión
//! - `connection`: ciclo de vida de una conexión

pub mod connection;
pub mod pool;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use tcp::Server;
