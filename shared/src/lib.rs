//! Shared types for the shelf admin backend
//!
//! Domain models (users, roles, menus, permissions), the unified error
//! system and small helpers used by every crate in the workspace.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use serde::{Deserialize, Serialize};
