//! 服务层 - RBAC 管理服务
//!
//! # 服务列表
//!
//! - [`UserDirectory`] - 用户创建、更新、认证，加载 [`CurrentUser`](crate::auth::CurrentUser)
//! - [`RoleTree`] - 角色层级与角色的菜单 / 权限关联
//! - [`MenuTree`] - 菜单层级与显示标签
//! - [`PermissionRegistry`] - 模型权限注册与查询
//!
//! 所有服务共享同一个 `Arc<dyn RecordStore>`。

pub mod directory;
pub mod menus;
pub mod permissions;
pub mod roles;

pub use directory::UserDirectory;
pub use menus::{MenuTree, MenuTreeNode};
pub use permissions::{PermissionHolders, PermissionRegistry};
pub use roles::RoleTree;

use crate::db::RecordStore;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    MenuId, MenuNode, Permission, PermissionId, Role, RoleId, User, UserId,
};

// ── Lookups that turn a missing record into its entity error ────────

pub(crate) fn fetch_user(store: &dyn RecordStore, id: UserId) -> AppResult<User> {
    store.find_user(id)?.ok_or_else(|| {
        tracing::debug!(user_id = id, "User not found");
        AppError::with_message(ErrorCode::UserNotFound, format!("User {} not found", id))
    })
}

pub(crate) fn fetch_role(store: &dyn RecordStore, id: RoleId) -> AppResult<Role> {
    store.find_role(id)?.ok_or_else(|| {
        tracing::debug!(role_id = id, "Role not found");
        AppError::with_message(ErrorCode::RoleNotFound, format!("Role {} not found", id))
    })
}

pub(crate) fn fetch_menu(store: &dyn RecordStore, id: MenuId) -> AppResult<MenuNode> {
    store.find_menu(id)?.ok_or_else(|| {
        tracing::debug!(menu_id = id, "Menu not found");
        AppError::with_message(ErrorCode::MenuNotFound, format!("Menu {} not found", id))
    })
}

pub(crate) fn fetch_permission(store: &dyn RecordStore, id: PermissionId) -> AppResult<Permission> {
    store.find_permission(id)?.ok_or_else(|| {
        tracing::debug!(permission_id = id, "Permission not found");
        AppError::with_message(
            ErrorCode::PermissionNotFound,
            format!("Permission {} not found", id),
        )
    })
}

/// Resolve permission ids, skipping any that vanished
pub(crate) fn collect_permissions(
    store: &dyn RecordStore,
    ids: &[PermissionId],
) -> AppResult<Vec<Permission>> {
    let mut perms = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(perm) = store.find_permission(*id)? {
            perms.push(perm);
        }
    }
    Ok(perms)
}
