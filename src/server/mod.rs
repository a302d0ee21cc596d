//! Connection supervision.
//!
//! The accept loop hands each socket to its own task; a failing connection
//! is logged and never takes down the listener or other connections.

pub mod listener;
