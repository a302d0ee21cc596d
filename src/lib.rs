//! Portico - Minimal Static File Server
//!
//! An HTTP/1.1 file server built directly on TCP sockets: hand-parsed
//! requests, gzip and zip downloads, and a queue-fed access log.

pub mod config;
pub mod content;
pub mod http;
pub mod logging;
pub mod server;
