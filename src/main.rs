//! # HTTP/1.0 Server - Entry Point
//! src/main.rs
//!
//! Punto de entrada del servidor HTTP/1.0.

use clap::Parser;
use http1_server::config::Config;
use http1_server::error::ServerError;
use http1_server::server::Server;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("http1_server=info")),
        )
        .init();

    let config = Config::parse();

    if let Err(e) = config.validate() {
        exit_with(ServerError::Config(e));
    }

    config.log_summary();

    let server = match Server::bind(&config) {
        Ok(server) => server,
        Err(e) => exit_with(e),
    };

    // Bloquea el thread principal
    server.run();
}

fn exit_with(e: ServerError) -> ! {
    error!(error = %e, "could not start server");
    eprintln!("{}", e);
    std::process::exit(1);
}
