//! Shelf Admin - 图书馆管理后台 RBAC 核心
//!
//! # 架构概述
//!
//! 用户、角色、菜单与权限的管理，以及权限判定：
//!
//! - **用户目录** (`services::directory`): 用户创建、更新、认证
//! - **角色树 / 菜单树** (`services::roles`, `services::menus`): 层级结构与关联
//! - **权限判定** (`auth`): 直接权限 + 角色权限 + 超级管理员
//! - **存储** (`db`): `RecordStore` 抽象与内存实现
//!
//! # 模块结构
//!
//! ```text
//! admin-core/src/
//! ├── core/          # 配置、AdminState
//! ├── auth/          # 密码、CurrentUser、权限判定
//! ├── db/            # 存储抽象与内存存储
//! ├── services/      # 用户目录、角色树、菜单树、权限注册
//! └── utils/         # 日志、输入校验
//! ```

pub mod auth;
pub mod core;
pub mod db;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, PermissionSource};
pub use core::{AdminState, Config};
pub use db::{MemoryStore, RecordStore, RepoError, UserGrants};
pub use services::{MenuTree, PermissionRegistry, RoleTree, UserDirectory};
pub use utils::{AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
