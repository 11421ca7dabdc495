use super::config::ServerConfig;
use super::connection::ConnectionHandler;
use crate::window::{Clock, StatsEngine};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

/// TCP front end over a shared [`StatsEngine`]. One task per connection.
pub struct StatsServer<C: Clock> {
    listener: TcpListener,
    engine: StatsEngine<C>,
    max_line_bytes: usize,
}

impl<C: Clock> StatsServer<C> {
    pub async fn bind(config: &ServerConfig, engine: StatsEngine<C>) -> std::io::Result<Self> {
        let listener = TcpListener::bind(&config.bind_addr).await?;
        info!("Stats server listening on {}", listener.local_addr()?);
        Ok(StatsServer {
            listener,
            engine,
            max_line_bytes: config.max_line_bytes,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the task is dropped.
    pub async fn run(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    if let Err(e) = stream.set_nodelay(true) {
                        error!("Failed to set TCP_NODELAY for {}: {}", addr, e);
                    }
                    let handler = ConnectionHandler::new(
                        stream,
                        self.engine.clone(),
                        addr.to_string(),
                        self.max_line_bytes,
                    );
                    tokio::spawn(handler.run());
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }
}
