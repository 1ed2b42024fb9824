//! Shared types for the blog service
//!
//! Common types used across the workspace: the unified error system,
//! the API response envelope, and client-facing request/response DTOs.

pub mod client;
pub mod error;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

// Error system re-exports (for convenient access)
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
