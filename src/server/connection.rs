use super::protocol::{Request, Response};
use crate::window::{Clock, StatsEngine};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LinesCodec, LinesCodecError};
use tracing::{debug, info, warn};

pub struct ConnectionHandler<C: Clock> {
    framed: Framed<TcpStream, LinesCodec>,
    engine: StatsEngine<C>,
    client_addr: String,
}

impl<C: Clock> ConnectionHandler<C> {
    pub fn new(
        stream: TcpStream,
        engine: StatsEngine<C>,
        client_addr: String,
        max_line_bytes: usize,
    ) -> Self {
        ConnectionHandler {
            framed: Framed::new(stream, LinesCodec::new_with_max_length(max_line_bytes)),
            engine,
            client_addr,
        }
    }

    pub async fn run(mut self) {
        info!("Client connected: {}", self.client_addr);

        while let Some(frame) = self.framed.next().await {
            let line = match frame {
                Ok(line) => line,
                Err(LinesCodecError::MaxLineLengthExceeded) => {
                    warn!("Request line too long from {}", self.client_addr);
                    let resp = Response::Error {
                        reason: "request line too long".to_string(),
                    };
                    let _ = self.framed.send(resp.to_line()).await;
                    break;
                }
                Err(LinesCodecError::Io(e)) => {
                    warn!("Error reading from client {}: {}", self.client_addr, e);
                    break;
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            let response = match Request::parse(&line) {
                Ok(request) => request.execute(&self.engine),
                Err(resp) => {
                    debug!("Malformed request from {}: {}", self.client_addr, line);
                    resp
                }
            };

            if let Err(e) = self.framed.send(response.to_line()).await {
                warn!("Failed to write response to {}: {}", self.client_addr, e);
                break;
            }
        }

        info!("Client disconnected: {}", self.client_addr);
    }
}
