//! Library portion of the OTC HTTP server.
//!
//! The router lives here rather than in `main.rs` so integration tests can
//! serve it on an ephemeral port without going through the binary.

pub mod http;
