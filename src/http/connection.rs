use bytes::BytesMut;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

use crate::config::Config;
use crate::content::pipeline;
use crate::http::parser::{ParseError, parse_http_request};
use crate::http::request::{Method, Request};
use crate::http::response::{Response, StatusCode};
use crate::http::writer::ResponseWriter;
use crate::logging::access::{AccessLog, LogEntry};

const READ_CHUNK: usize = 4096;

/// One accepted client socket, owned exclusively by its handler task for
/// its whole lifetime: one request, one response, then closed.
pub struct Connection {
    stream: TcpStream,
    client_ip: String,
    buffer: BytesMut,
    state: ConnectionState,
    config: Arc<Config>,
    log: AccessLog,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter),
    Closed,
}

impl Connection {
    pub fn new(stream: TcpStream, peer: SocketAddr, config: Arc<Config>, log: AccessLog) -> Self {
        Self {
            stream,
            client_ip: peer.ip().to_string(),
            buffer: BytesMut::with_capacity(READ_CHUNK),
            state: ConnectionState::Reading,
            config,
            log,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match &mut self.state {
                ConnectionState::Reading => {
                    match self.read_request().await? {
                        Some(req) => {
                            self.state = ConnectionState::Processing(req);
                        }
                        None => {
                            self.state = ConnectionState::Closed;
                        }
                    }
                }

                ConnectionState::Processing(req) => {
                    let response =
                        Self::dispatch(req, &self.config, &self.log, &self.client_ip).await;

                    let writer = ResponseWriter::new(&response);
                    self.state = ConnectionState::Writing(writer);
                }

                ConnectionState::Writing(writer) => {
                    writer.write_to_stream(&mut self.stream).await?;

                    // No keep-alive: one request per connection.
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    pub async fn read_request(&mut self) -> anyhow::Result<Option<Request>> {
        loop {
            // Try parsing whatever we already have
            match parse_http_request(&self.buffer, self.config.max_body_bytes) {
                Ok((request, consumed)) => {
                    let _ = self.buffer.split_to(consumed);
                    return Ok(Some(request));
                }

                Err(ParseError::Incomplete) => {
                    // Need more data → fall through to read
                }

                Err(ParseError::BodyTooLarge) => {
                    // Declared Content-Length above the configured cap:
                    // answer 413 and close before reading the body.
                    self.log.record(
                        LogEntry::new(&self.client_ip, "-", "-")
                            .with_error("declared Content-Length above limit".to_string()),
                    );
                    let _ = self
                        .write_response(&Response::empty(StatusCode::PayloadTooLarge))
                        .await;
                    return Ok(None);
                }

                Err(e) => {
                    // Malformed request → close without a response
                    self.log.record(
                        LogEntry::new(&self.client_ip, "-", "-")
                            .with_error(format!("{:?}", e)),
                    );
                    return Err(anyhow::anyhow!("HTTP parse error: {:?}", e));
                }
            }

            // Read more data
            let mut temp = [0u8; READ_CHUNK];
            let n = self.stream.read(&mut temp).await?;

            if n == 0 {
                // Client closed connection
                return Ok(None);
            }

            self.buffer.extend_from_slice(&temp[..n]);
        }
    }

    async fn dispatch(
        req: &Request,
        config: &Config,
        log: &AccessLog,
        client_ip: &str,
    ) -> Response {
        match req.method {
            Method::GET => pipeline::handle_get(req, config, log, client_ip).await,
            Method::POST => pipeline::handle_post(req, log, client_ip),
        }
    }

    async fn write_response(&mut self, response: &Response) -> anyhow::Result<()> {
        ResponseWriter::new(response)
            .write_to_stream(&mut self.stream)
            .await
    }
}
