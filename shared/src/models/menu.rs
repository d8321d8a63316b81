//! Menu Model
//!
//! 菜单树节点：模块 / 菜单 / 操作。父节点删除时子节点脱离 (parent 置空)，不级联删除。

use super::permission::PermissionTarget;
use super::{hierarchy_label, serde_helpers};
use serde::{Deserialize, Serialize};

/// Menu ID type
pub type MenuId = i64;

/// 菜单类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuType {
    /// 模块
    Module,
    /// 菜单
    #[default]
    Menu,
    /// 操作
    Operation,
}

impl MenuType {
    /// Display label used by the admin UI
    pub fn label(&self) -> &'static str {
        match self {
            Self::Module => "模块",
            Self::Menu => "菜单",
            Self::Operation => "操作",
        }
    }
}

/// 操作类型
///
/// Wire codes are `none|add|del|update|view`; `delete` is accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operate {
    /// 无
    #[default]
    None,
    /// 新增
    Add,
    /// 删除
    #[serde(rename = "del", alias = "delete")]
    Delete,
    /// 编辑
    Update,
    /// 查看
    View,
}

impl Operate {
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "无",
            Self::Add => "新增",
            Self::Delete => "删除",
            Self::Update => "编辑",
            Self::View => "查看",
        }
    }
}

/// Menu node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuNode {
    pub id: MenuId,
    /// Parent node, `None` for roots and for detached children
    #[serde(default)]
    pub parent: Option<MenuId>,
    pub name: String,
    pub code: String,
    pub url: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub hidden: bool,
    /// 排序值
    #[serde(default)]
    pub sequence: i32,
    #[serde(rename = "type", default)]
    pub menu_type: MenuType,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub status: bool,
    #[serde(default)]
    pub operate: Operate,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

fn default_true() -> bool {
    true
}

impl MenuNode {
    /// Admin display label: `"<parent>--><name>"`, or the bare name for roots
    ///
    /// `parent` must be the node referenced by `self.parent`.
    pub fn display_label(&self, parent: Option<&MenuNode>) -> String {
        hierarchy_label(parent.map(|p| p.name.as_str()), &self.name)
    }
}

impl PermissionTarget for MenuNode {
    fn model_name(&self) -> &str {
        "menu"
    }
}

/// Create menu payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuCreate {
    pub parent: Option<MenuId>,
    pub name: String,
    pub code: String,
    pub url: String,
    pub icon: Option<String>,
    pub hidden: Option<bool>,
    pub sequence: Option<i32>,
    #[serde(rename = "type")]
    pub menu_type: Option<MenuType>,
    pub status: Option<bool>,
    pub operate: Option<Operate>,
    pub memo: Option<String>,
}

impl MenuCreate {
    pub fn new(name: impl Into<String>, code: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn under(mut self, parent: MenuId) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// Update menu payload
///
/// Absent fields keep their stored value. `parent: null` detaches the node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuUpdate {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::double_option"
    )]
    pub parent: Option<Option<MenuId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<i32>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub menu_type: Option<MenuType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operate: Option<Operate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}
