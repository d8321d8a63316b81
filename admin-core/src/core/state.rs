use std::sync::Arc;

use shared::error::AppResult;

use crate::core::Config;
use crate::db::RecordStore;
use crate::services::{MenuTree, PermissionRegistry, RoleTree, UserDirectory};
use crate::utils::logger::init_logger_with_file;

/// 管理后台状态 - 持有所有服务
///
/// 所有服务共享同一个存储。Clone 为浅拷贝。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | store | 记录存储 |
/// | directory | 用户目录 |
/// | roles | 角色树 |
/// | menus | 菜单树 |
/// | permissions | 权限注册 |
#[derive(Clone)]
pub struct AdminState {
    pub config: Config,
    pub store: Arc<dyn RecordStore>,
    pub directory: UserDirectory,
    pub roles: RoleTree,
    pub menus: MenuTree,
    pub permissions: PermissionRegistry,
}

impl AdminState {
    /// 用给定配置组装服务 (不初始化日志)
    ///
    /// 默认角色不存在时会被创建。
    pub fn new(store: Arc<dyn RecordStore>, config: Config) -> AppResult<Self> {
        let directory = UserDirectory::new(store.clone(), config.clone());
        directory.ensure_default_role()?;
        Ok(Self {
            roles: RoleTree::new(store.clone()),
            menus: MenuTree::new(store.clone()),
            permissions: PermissionRegistry::new(store.clone()),
            directory,
            config,
            store,
        })
    }

    /// 初始化管理后台
    ///
    /// 按顺序：
    /// 1. 读取 `.env` 与环境变量 (`Config::load`)
    /// 2. 初始化日志 (生产环境强制 JSON)
    /// 3. 组装服务并确保默认角色存在
    pub fn initialize(store: Arc<dyn RecordStore>) -> AppResult<Self> {
        let config = Config::load()?;
        init_logger_with_file(
            Some(config.log_level.as_str()),
            Some(config.log_json || config.is_production()),
            config.log_dir.as_deref(),
        );
        tracing::info!(
            environment = %config.environment,
            default_role = config.default_role_id,
            "Admin core initialized"
        );
        Self::new(store, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[test]
    fn test_new_seeds_default_role() {
        let state = AdminState::new(Arc::new(MemoryStore::new()), Config::default()).unwrap();
        assert_eq!(state.roles.get_role(1).unwrap().code, "base");

        let alice = state.directory.create_user("alice", Some("pw")).unwrap();
        assert_eq!(state.roles.role_users(1).unwrap()[0].id, alice.id);
    }

    #[test]
    fn test_initialize_from_environment() {
        let state = AdminState::initialize(Arc::new(MemoryStore::new())).unwrap();
        let id = state.config.default_role_id;
        assert!(state.roles.get_role(id).is_ok());
    }

    #[test]
    fn test_new_is_idempotent_over_a_shared_store() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        AdminState::new(store.clone(), Config::default()).unwrap();
        let state = AdminState::new(store, Config::default()).unwrap();
        assert_eq!(state.roles.list_roles().unwrap().len(), 1);
    }
}
