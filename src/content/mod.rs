//! Static content serving.
//!
//! This module decides, per GET request, whether to serve a file as-is,
//! gzip it, force a gzip download, or archive the whole document root, and
//! provides the compression/archiving primitives it delegates to.

pub mod archive;
pub mod pipeline;
