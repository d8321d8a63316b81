//! Role Model

use super::menu::MenuId;
use super::permission::{PermissionId, PermissionTarget};
use super::{hierarchy_label, serde_helpers};
use serde::{Deserialize, Serialize};

/// Role ID type
pub type RoleId = i64;

/// Role entity (RBAC 角色)
///
/// `name` and `code` are unique across all roles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    /// Parent role.
    ///
    /// Display only: permissions of a parent are NOT granted to holders of
    /// the child role. Only permissions attached directly to a role count.
    #[serde(default)]
    pub parent: Option<RoleId>,
    pub name: String,
    pub code: String,
    /// 排序值
    #[serde(default)]
    pub sequence: i32,
    /// Attached menu nodes
    #[serde(default)]
    pub menus: Vec<MenuId>,
    /// Attached model permissions
    #[serde(default)]
    pub permissions: Vec<PermissionId>,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl Role {
    /// Admin display label: `"<parent>--><name>"`, or the bare name
    pub fn display_label(&self, parent: Option<&Role>) -> String {
        hierarchy_label(parent.map(|p| p.name.as_str()), &self.name)
    }
}

impl PermissionTarget for Role {
    fn model_name(&self) -> &str {
        "role"
    }
}

/// Create role payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleCreate {
    pub parent: Option<RoleId>,
    pub name: String,
    pub code: String,
    pub sequence: Option<i32>,
    #[serde(default)]
    pub menus: Vec<MenuId>,
    #[serde(default)]
    pub permissions: Vec<PermissionId>,
    pub memo: Option<String>,
}

impl RoleCreate {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            ..Default::default()
        }
    }
}

/// Update role payload
///
/// Absent fields keep their stored value; `menus` / `permissions` replace
/// the stored sets wholesale when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleUpdate {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::double_option"
    )]
    pub parent: Option<Option<RoleId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menus: Option<Vec<MenuId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<PermissionId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}
