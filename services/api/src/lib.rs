//! services/api/src/lib.rs
//!
//! Library crate for the API service. The binaries in `src/bin` wire these
//! modules together into the running server and the OpenAPI generator.

pub mod adapters;
pub mod chat;
pub mod config;
pub mod error;
pub mod ingest;
pub mod web;

#[cfg(test)]
pub(crate) mod test_support;
