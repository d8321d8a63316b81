//! User Model

use super::permission::{Permission, PermissionId, PermissionTarget};
use super::role::{Role, RoleId};
use super::serde_helpers;
use serde::{Deserialize, Serialize};

/// User ID type
pub type UserId = i64;

/// Prefix marking a password hash that can never verify
pub const UNUSABLE_PASSWORD_PREFIX: &str = "!";

/// User entity
///
/// `username` is unique and is the only login identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// 真实名字
    #[serde(default)]
    pub realname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub avatar: String,
    /// Active flag
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub status: bool,
    /// Admin flag; an active admin bypasses every permission check
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_admin: bool,
    /// Password hash (write-only)
    #[serde(skip_serializing, default)]
    pub password: String,
    #[serde(default)]
    pub roles: Vec<RoleId>,
    /// Direct permissions
    #[serde(default)]
    pub permissions: Vec<PermissionId>,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub last_login: Option<i64>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

fn default_true() -> bool {
    true
}

impl User {
    /// Whether the user is active and flagged admin
    pub fn is_superuser(&self) -> bool {
        self.status && self.is_admin
    }

    /// Whether a password has been set that can verify
    pub fn has_usable_password(&self) -> bool {
        !self.password.is_empty() && !self.password.starts_with(UNUSABLE_PASSWORD_PREFIX)
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.username)
    }
}

impl PermissionTarget for User {
    fn model_name(&self) -> &str {
        "user"
    }
}

/// Create user payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub password: Option<String>,
    pub realname: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub status: Option<bool>,
    /// Roles to attach; empty means the configured default role
    #[serde(default)]
    pub roles: Vec<RoleId>,
    #[serde(default)]
    pub permissions: Vec<PermissionId>,
    pub memo: Option<String>,
}

impl UserCreate {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Default::default()
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_roles(mut self, roles: Vec<RoleId>) -> Self {
        self.roles = roles;
        self
    }
}

/// Update user payload
///
/// Only present fields overwrite the stored record. `roles` and
/// `permissions` replace the stored sets wholesale when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<RoleId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<PermissionId>>,
}

/// User read view with roles and direct permissions expanded
#[derive(Debug, Clone, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub role_set: Vec<Role>,
    pub permission_set: Vec<Permission>,
}
