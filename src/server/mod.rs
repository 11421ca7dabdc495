//! Thin JSON-lines TCP front end for ingestion and queries.

mod config;
mod connection;
mod protocol;
mod server;

pub use config::ServerConfig;
pub use connection::ConnectionHandler;
pub use protocol::{Request, Response};
pub use server::StatsServer;
