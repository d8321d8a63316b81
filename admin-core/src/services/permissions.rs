//! Permission Registry - 模型权限注册
//!
//! 权限本身由外部定义 (`<app_label>.<action>_<model>`)，这里负责登记、
//! 按模型分组以及查询持有者。

use super::fetch_permission;
use crate::db::RecordStore;
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use serde::Serialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Permission, PermissionCreate, PermissionId, Role, User};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Roles and users holding a permission directly
#[derive(Debug, Clone, Serialize)]
pub struct PermissionHolders {
    pub permission: Permission,
    pub roles: Vec<Role>,
    pub users: Vec<User>,
}

/// 权限注册服务
#[derive(Clone)]
pub struct PermissionRegistry {
    store: Arc<dyn RecordStore>,
}

impl PermissionRegistry {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Register a permission; its identifier must be unique
    pub fn register(&self, data: PermissionCreate) -> AppResult<Permission> {
        validate_required_text(&data.app_label, "app_label", MAX_NAME_LEN)?;
        validate_required_text(&data.action, "action", MAX_NAME_LEN)?;
        validate_required_text(&data.model, "model", MAX_NAME_LEN)?;
        if data.app_label.contains('.') {
            return Err(AppError::validation("app_label must not contain '.'"));
        }

        let permission = self.store.insert_permission(data.into_permission())?;
        info!(permission_id = permission.id, identifier = %permission.identifier(), "Permission registered");
        Ok(permission)
    }

    pub fn get(&self, id: PermissionId) -> AppResult<Permission> {
        fetch_permission(self.store.as_ref(), id)
    }

    pub fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<Permission>> {
        Ok(self.store.find_permission_by_identifier(identifier)?)
    }

    pub fn list(&self) -> AppResult<Vec<Permission>> {
        Ok(self.store.list_permissions()?)
    }

    /// Permissions grouped by the model they target
    pub fn grouped_by_model(&self) -> AppResult<BTreeMap<String, Vec<Permission>>> {
        let mut groups: BTreeMap<String, Vec<Permission>> = BTreeMap::new();
        for perm in self.store.list_permissions()? {
            groups.entry(perm.model.clone()).or_default().push(perm);
        }
        Ok(groups)
    }

    /// Roles and users that hold `identifier` directly
    pub fn holders(&self, identifier: &str) -> AppResult<PermissionHolders> {
        let permission = self
            .store
            .find_permission_by_identifier(identifier)?
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::PermissionNotFound,
                    format!("Permission '{}' not found", identifier),
                )
            })?;

        let mut roles: Vec<Role> = self
            .store
            .list_roles()?
            .into_iter()
            .filter(|r| r.permissions.contains(&permission.id))
            .collect();
        roles.sort_by_key(|r| (r.sequence, r.id));

        let mut users: Vec<User> = self
            .store
            .list_users()?
            .into_iter()
            .filter(|u| u.permissions.contains(&permission.id))
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));

        Ok(PermissionHolders {
            permission,
            roles,
            users,
        })
    }
}
