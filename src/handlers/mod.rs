//! # Handlers
//! src/handlers/mod.rs
//!
//! - `resource`: resolución de targets contra el document root
//! - `static_file`: GET y HEAD sobre archivos
//! - `cgi`: POST hacia scripts `.cgi`

pub mod cgi;
pub mod resource;
pub mod static_file;
