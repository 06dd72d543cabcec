//! REST transport for the Spoolman service.
//!
//! This module provides the `SpoolmanTransport` seam and its reqwest-backed
//! implementation, `HttpTransport`, which GETs JSON documents from the
//! `/api/v1/` endpoints (`vendor`, `filament`, `spool` and their `/{id}`
//! variants).

pub mod client;
pub mod error;

pub use client::{HttpTransport, SpoolmanTransport};
pub use error::ApiError;
