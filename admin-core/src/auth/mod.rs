//! 认证授权模块
//!
//! 提供密码哈希与权限判定：
//! - [`password`] - Argon2 密码哈希
//! - [`CurrentUser`] - 权限判定所需的当前用户上下文
//! - [`permissions`] - 权限判定函数 (直接权限 / 角色权限 / 全部) 与 `require_*` 强制检查

pub mod current_user;
pub mod password;
pub mod permissions;

pub use current_user::CurrentUser;
pub use password::{hash_password, make_unusable_password, verify_dummy_password, verify_password};
pub use permissions::{
    PermissionSource, get_all_permissions, get_group_permissions, get_permissions,
    get_user_permissions, has_module_perms, has_perm, has_perms, require_perm, require_superuser,
};
