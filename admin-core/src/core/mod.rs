//! 核心模块 - 配置与状态
//!
//! - [`Config`] - 运行配置 (默认角色、新用户默认值、日志)
//! - [`AdminState`] - 持有所有服务的管理后台状态

pub mod config;
pub mod state;

pub use config::Config;
pub use state::AdminState;
