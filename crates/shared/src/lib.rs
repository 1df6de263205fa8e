//! Shared types, errors, and configuration for Kasbook.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Configuration management (including per-outlet closing settings)
//! - Collaborator interfaces: identity verification and activity logging

pub mod activity;
pub mod auth;
pub mod config;
pub mod error;
pub mod types;

pub use activity::{ActivityEvent, ActivityLog, TracingActivityLog};
pub use auth::{AuthContext, JwtVerifier, TokenVerifier};
pub use config::{AppConfig, ClosingConfig};
pub use error::{AppError, AppResult};
