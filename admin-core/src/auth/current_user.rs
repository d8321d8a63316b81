//! 当前用户上下文
//!
//! 权限判定所需的全部信息：状态、管理员标记、直接权限、角色权限。

use shared::models::{Permission, PermissionTarget, User, UserId, split_identifier};
use std::collections::BTreeSet;

/// 当前用户上下文
///
/// 由用户目录加载 (`UserDirectory::current_user`)，权限判定只读取本结构，
/// 不再访问存储。
///
/// # 规则
///
/// 1. 激活且为管理员 (`status && is_admin`) 的用户拥有所有权限
/// 2. 其余用户的权限 = 直接权限 ∪ 所属角色的权限
/// 3. 角色的父角色不参与权限计算
///
/// # 示例
///
/// ```ignore
/// let user = directory.current_user(user_id)?;
/// if user.has_perm("systems.add_menu", None) {
///     // 有权限
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// 用户 ID
    pub id: UserId,
    /// 用户名
    pub username: String,
    /// 激活状态
    pub status: bool,
    /// 管理员标记
    pub is_admin: bool,
    /// 直接授予的权限
    pub user_permissions: Vec<Permission>,
    /// 所属角色授予的权限 (仅直接挂载的角色)
    pub group_permissions: Vec<Permission>,
}

impl CurrentUser {
    pub fn new(
        user: &User,
        user_permissions: Vec<Permission>,
        group_permissions: Vec<Permission>,
    ) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            status: user.status,
            is_admin: user.is_admin,
            user_permissions,
            group_permissions,
        }
    }

    /// 是否超级管理员 (激活且为管理员)
    pub fn is_superuser(&self) -> bool {
        self.status && self.is_admin
    }

    /// 直接权限标识集合，可按目标模型过滤
    pub fn get_user_permissions(&self, obj: Option<&dyn PermissionTarget>) -> BTreeSet<String> {
        identifiers(&self.user_permissions, obj)
    }

    /// 角色权限标识集合，可按目标模型过滤
    pub fn get_group_permissions(&self, obj: Option<&dyn PermissionTarget>) -> BTreeSet<String> {
        identifiers(&self.group_permissions, obj)
    }

    /// 直接权限与角色权限的并集
    pub fn get_all_permissions(&self, obj: Option<&dyn PermissionTarget>) -> BTreeSet<String> {
        let mut all = self.get_user_permissions(obj);
        all.extend(self.get_group_permissions(obj));
        all
    }

    /// 检查是否拥有指定权限
    pub fn has_perm(&self, perm: &str, obj: Option<&dyn PermissionTarget>) -> bool {
        if self.is_superuser() {
            return true;
        }
        self.get_all_permissions(obj).contains(perm)
    }

    /// 检查是否拥有所有指定权限
    ///
    /// 空列表返回 `true`。
    pub fn has_perms(&self, perms: &[&str], obj: Option<&dyn PermissionTarget>) -> bool {
        if self.is_superuser() {
            return true;
        }
        let all = self.get_all_permissions(obj);
        perms.iter().all(|p| all.contains(*p))
    }

    /// 检查是否拥有某个应用下的任一权限
    pub fn has_module_perms(&self, app_label: &str) -> bool {
        if self.is_superuser() {
            return true;
        }
        self.get_all_permissions(None)
            .iter()
            .filter_map(|p| split_identifier(p))
            .any(|(label, _)| label == app_label)
    }
}

fn identifiers(perms: &[Permission], obj: Option<&dyn PermissionTarget>) -> BTreeSet<String> {
    perms
        .iter()
        .filter(|p| obj.is_none_or(|target| p.applies_to(target)))
        .map(Permission::identifier)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::MenuNode;

    fn perm(app: &str, action: &str, model: &str) -> Permission {
        Permission::new(app, action, model, format!("Can {} {}", action, model))
    }

    fn current(status: bool, is_admin: bool) -> CurrentUser {
        CurrentUser {
            id: 1,
            username: "alice".into(),
            status,
            is_admin,
            user_permissions: vec![perm("systems", "view", "menu")],
            group_permissions: vec![perm("systems", "add", "menu"), perm("library", "add", "book")],
        }
    }

    fn books_menu() -> MenuNode {
        serde_json::from_str(r#"{"id":1,"name":"Books","code":"books","url":"/books"}"#).unwrap()
    }

    #[test]
    fn test_sets_by_source() {
        let user = current(true, false);
        assert_eq!(
            user.get_user_permissions(None),
            BTreeSet::from(["systems.view_menu".to_string()])
        );
        assert_eq!(user.get_group_permissions(None).len(), 2);
        assert_eq!(user.get_all_permissions(None).len(), 3);
    }

    #[test]
    fn test_all_deduplicates() {
        let mut user = current(true, false);
        user.group_permissions.push(perm("systems", "view", "menu"));
        assert_eq!(user.get_all_permissions(None).len(), 3);
    }

    #[test]
    fn test_object_filter_matches_model() {
        let user = current(true, false);
        let menu = books_menu();
        let on_menu = user.get_all_permissions(Some(&menu));
        assert!(on_menu.contains("systems.view_menu"));
        assert!(on_menu.contains("systems.add_menu"));
        assert!(!on_menu.contains("library.add_book"));

        assert!(!user.has_perm("library.add_book", Some(&menu)));
        assert!(user.has_perm("library.add_book", None));
    }

    #[test]
    fn test_superuser_bypass() {
        let admin = current(true, true);
        assert!(admin.has_perm("anything.at_all", None));
        assert!(admin.has_perms(&["a.b", "c.d"], None));
        assert!(admin.has_module_perms("nothing"));
    }

    #[test]
    fn test_inactive_admin_is_not_superuser() {
        let user = current(false, true);
        assert!(!user.is_superuser());
        assert!(!user.has_perm("anything.at_all", None));
        assert!(user.has_perm("systems.view_menu", None));
    }

    #[test]
    fn test_module_perms() {
        let user = current(true, false);
        assert!(user.has_module_perms("systems"));
        assert!(user.has_module_perms("library"));
        assert!(!user.has_module_perms("sys"));
        assert!(!user.has_module_perms("auth"));
    }

    #[test]
    fn test_has_perms_empty_list() {
        assert!(current(true, false).has_perms(&[], None));
    }
}
