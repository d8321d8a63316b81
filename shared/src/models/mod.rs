//! Data models
//!
//! Shared between the admin core and its consumers.
//! All IDs are `i64`; `0` marks a record that has not been stored yet.

pub mod menu;
pub mod permission;
pub mod role;
pub mod serde_helpers;
pub mod user;

// Re-exports
pub use menu::*;
pub use permission::*;
pub use role::*;
pub use user::*;

/// Separator between an ancestor name and a node name in admin labels
pub const LABEL_SEPARATOR: &str = "-->";

/// `"<parent>--><name>"` when a parent is known, else the bare name
pub fn hierarchy_label(parent: Option<&str>, name: &str) -> String {
    match parent {
        Some(parent) => format!("{}{}{}", parent, LABEL_SEPARATOR, name),
        None => name.to_string(),
    }
}
