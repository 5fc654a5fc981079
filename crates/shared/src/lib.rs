//! Shared errors, configuration, and credential loading for ShareFlow.
//!
//! This crate provides common building blocks used across all other crates:
//! - Application-wide error type with HTTP status mapping
//! - Configuration management
//! - Service-account credential loading

pub mod config;
pub mod credentials;
pub mod error;

pub use config::AppConfig;
pub use credentials::{CredentialError, CredentialSource, ServiceAccountKey};
pub use error::AppError;
