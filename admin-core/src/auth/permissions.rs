//! 权限判定
//!
//! 以 `Option<&CurrentUser>` 为入口的判定函数。`None` 表示未认证的调用方，
//! 所有检查返回 `false`，所有集合为空。判定函数从不返回错误。
//!
//! # 权限来源
//!
//! | 来源 | 说明 |
//! |------|------|
//! | `User` | 用户直接授予的权限 |
//! | `Group` | 用户直接挂载的角色上的权限 (不沿父角色向上) |
//! | `All` | 两者的并集，按标识去重 |
//!
//! 标识格式为 `<app_label>.<action>_<model>`，例如 `systems.view_menu`。
//!
//! 需要以错误中断调用的场景使用 [`require_perm`] / [`require_superuser`]。

use super::CurrentUser;
use crate::security_log;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::PermissionTarget;
use std::collections::BTreeSet;

/// 权限来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionSource {
    /// 直接权限
    User,
    /// 角色权限
    Group,
    /// 全部
    #[default]
    All,
}

/// 按来源获取权限标识集合
///
/// 传入 `obj` 时只保留作用于该对象模型的权限。
pub fn get_permissions(
    user: Option<&CurrentUser>,
    source: PermissionSource,
    obj: Option<&dyn PermissionTarget>,
) -> BTreeSet<String> {
    let Some(user) = user else {
        return BTreeSet::new();
    };
    match source {
        PermissionSource::User => user.get_user_permissions(obj),
        PermissionSource::Group => user.get_group_permissions(obj),
        PermissionSource::All => user.get_all_permissions(obj),
    }
}

pub fn get_user_permissions(
    user: Option<&CurrentUser>,
    obj: Option<&dyn PermissionTarget>,
) -> BTreeSet<String> {
    get_permissions(user, PermissionSource::User, obj)
}

pub fn get_group_permissions(
    user: Option<&CurrentUser>,
    obj: Option<&dyn PermissionTarget>,
) -> BTreeSet<String> {
    get_permissions(user, PermissionSource::Group, obj)
}

pub fn get_all_permissions(
    user: Option<&CurrentUser>,
    obj: Option<&dyn PermissionTarget>,
) -> BTreeSet<String> {
    get_permissions(user, PermissionSource::All, obj)
}

/// 检查是否拥有指定权限
pub fn has_perm(user: Option<&CurrentUser>, perm: &str, obj: Option<&dyn PermissionTarget>) -> bool {
    user.is_some_and(|u| u.has_perm(perm, obj))
}

/// 检查是否拥有所有指定权限
///
/// 未认证用户即使传入空列表也返回 `false`。
pub fn has_perms(
    user: Option<&CurrentUser>,
    perms: &[&str],
    obj: Option<&dyn PermissionTarget>,
) -> bool {
    user.is_some_and(|u| u.has_perms(perms, obj))
}

/// 检查是否拥有某个应用下的任一权限
pub fn has_module_perms(user: Option<&CurrentUser>, app_label: &str) -> bool {
    user.is_some_and(|u| u.has_module_perms(app_label))
}

/// 要求指定权限
///
/// # 错误
///
/// | 情况 | 错误码 |
/// |------|--------|
/// | 未认证 (`None`) | `NotAuthenticated` |
/// | 缺少权限 | `PermissionDenied` |
pub fn require_perm(
    user: Option<&CurrentUser>,
    perm: &str,
    obj: Option<&dyn PermissionTarget>,
) -> AppResult<()> {
    let user = user.ok_or_else(AppError::not_authenticated)?;
    if !user.has_perm(perm, obj) {
        security_log!(
            "warn",
            "permission_denied",
            user_id = user.id,
            username = user.username.as_str(),
            required_permission = perm
        );
        return Err(AppError::permission_denied(format!(
            "Permission denied: {}",
            perm
        )));
    }
    Ok(())
}

/// 要求超级管理员 (激活且为管理员)
pub fn require_superuser(user: Option<&CurrentUser>) -> AppResult<()> {
    let user = user.ok_or_else(AppError::not_authenticated)?;
    if !user.is_superuser() {
        security_log!(
            "warn",
            "admin_required",
            user_id = user.id,
            username = user.username.as_str()
        );
        return Err(AppError::new(ErrorCode::AdminRequired));
    }
    Ok(())
}
