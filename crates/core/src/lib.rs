//! Core relay logic for ShareFlow.
//!
//! This crate contains the request-handling core with ZERO web or HTTP-client
//! dependencies. Remote services are reached through the [`relay::FileStore`]
//! and [`relay::SheetLog`] traits, implemented by the google crate.
//!
//! # Modules
//!
//! - `relay` - Upload and message relaying to storage and the sheet log
//! - `timestamp` - Display formatting for log rows

pub mod relay;
pub mod timestamp;
