use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::RoleId;

/// 新用户默认头像
const DEFAULT_AVATAR_URL: &str = "http://m.imeitou.com/uploads/allimg/2017110610/b3c433vwhsk.jpg";

/// 运行配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | DEFAULT_ROLE_ID | 1 | 新用户未指定角色时挂载的默认角色 |
/// | DEFAULT_ROLE_NAME | base | 默认角色名称 |
/// | DEFAULT_ROLE_CODE | base | 默认角色编码 |
/// | DEFAULT_REALNAME | 图书馆管理员 | 新用户默认真实名字 |
/// | DEFAULT_AVATAR | 内置头像 URL | 新用户默认头像 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (未设置) | 日志目录 (按天滚动) |
/// | LOG_JSON | false | 是否输出 JSON 日志 |
/// | ENVIRONMENT | development | 运行环境 |
///
/// `DEFAULT_ROLE_ID` 必须是正整数，`LOG_JSON` 必须是 `true` / `false`，
/// 否则加载失败并返回 `ConfigError`。新用户的默认邮箱始终为空。
///
/// # 示例
///
/// ```ignore
/// DEFAULT_ROLE_ID=3 LOG_LEVEL=debug cargo run
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// 默认角色 ID
    pub default_role_id: RoleId,
    /// 默认角色名称 (用于初始化)
    pub default_role_name: String,
    /// 默认角色编码 (用于初始化)
    pub default_role_code: String,
    /// 新用户默认真实名字
    pub default_realname: String,
    /// 新用户默认头像
    pub default_avatar: String,
    /// 日志级别
    pub log_level: String,
    /// 日志目录
    pub log_dir: Option<String>,
    /// 是否输出 JSON 日志
    pub log_json: bool,
    /// 运行环境: development | staging | production
    pub environment: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 先读取 `.env` 文件，再从环境变量加载
    pub fn load() -> AppResult<Self> {
        dotenv::dotenv().ok();
        Self::from_env()
    }

    /// 从任意键值来源加载配置
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            default_role_id: match lookup("DEFAULT_ROLE_ID") {
                Some(raw) => parse_role_id(&raw)?,
                None => defaults.default_role_id,
            },
            default_role_name: lookup("DEFAULT_ROLE_NAME").unwrap_or(defaults.default_role_name),
            default_role_code: lookup("DEFAULT_ROLE_CODE").unwrap_or(defaults.default_role_code),
            default_realname: lookup("DEFAULT_REALNAME").unwrap_or(defaults.default_realname),
            default_avatar: lookup("DEFAULT_AVATAR").unwrap_or(defaults.default_avatar),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_dir: lookup("LOG_DIR").filter(|d| !d.is_empty()),
            log_json: match lookup("LOG_JSON") {
                Some(raw) => raw.trim().parse().map_err(|_| {
                    invalid("LOG_JSON", format!("expected true or false, got '{}'", raw))
                })?,
                None => defaults.log_json,
            },
            environment: lookup("ENVIRONMENT").unwrap_or(defaults.environment),
        })
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// 内置默认值，不读取环境变量
impl Default for Config {
    fn default() -> Self {
        Self {
            default_role_id: 1,
            default_role_name: "base".into(),
            default_role_code: "base".into(),
            default_realname: "图书馆管理员".into(),
            default_avatar: DEFAULT_AVATAR_URL.into(),
            log_level: "info".into(),
            log_dir: None,
            log_json: false,
            environment: "development".into(),
        }
    }
}

fn parse_role_id(raw: &str) -> AppResult<RoleId> {
    match raw.trim().parse::<RoleId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(invalid(
            "DEFAULT_ROLE_ID",
            format!("expected a positive integer, got '{}'", raw),
        )),
    }
}

fn invalid(key: &str, reason: String) -> AppError {
    AppError::with_message(ErrorCode::ConfigError, format!("{}: {}", key, reason))
        .with_detail("key", key)
}
