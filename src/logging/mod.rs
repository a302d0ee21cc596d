//! Access-log plumbing.
//!
//! A queue-fed single-writer log of served requests, separate from the
//! `tracing` diagnostics.

pub mod access;

pub use access::{AccessLog, LogDetail, LogEntry};
