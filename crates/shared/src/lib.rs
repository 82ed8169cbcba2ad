//! Shared types, errors, and configuration for Box Mock.
//!
//! This crate provides common types used across all other crates:
//! - Identity resolution from request credentials
//! - Application-wide error taxonomy
//! - Configuration management

pub mod config;
pub mod error;
pub mod identity;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use identity::{DEFAULT_IDENTITY, Identity};
