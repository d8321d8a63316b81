//! Menu Tree - 菜单树
//!
//! 菜单节点的增删改查、子节点查询、显示标签与嵌套树。
//! 删除节点时子节点脱离 (parent 置空)，并从所有角色的菜单集合中移除。

use super::fetch_menu;
use crate::db::RecordStore;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN, validate_optional_text, validate_required_text,
    validate_text,
};
use serde::Serialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{MenuCreate, MenuId, MenuNode, MenuUpdate};
use shared::util::now_millis;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Nested menu node for admin display
#[derive(Debug, Clone, Serialize)]
pub struct MenuTreeNode {
    #[serde(flatten)]
    pub menu: MenuNode,
    pub label: String,
    pub children: Vec<MenuTreeNode>,
}

/// 菜单树服务
#[derive(Clone)]
pub struct MenuTree {
    store: Arc<dyn RecordStore>,
}

impl MenuTree {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn create_menu(&self, data: MenuCreate) -> AppResult<MenuNode> {
        validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
        validate_required_text(&data.code, "code", MAX_NAME_LEN)?;
        validate_text(&data.url, "url", MAX_URL_LEN)?;
        validate_optional_text(&data.icon, "icon", MAX_NAME_LEN)?;
        validate_optional_text(&data.memo, "memo", MAX_NOTE_LEN)?;

        let now = now_millis();
        let menu = self.store.insert_menu(MenuNode {
            id: 0,
            parent: data.parent,
            name: data.name,
            code: data.code,
            url: data.url,
            icon: data.icon.unwrap_or_default(),
            hidden: data.hidden.unwrap_or(false),
            sequence: data.sequence.unwrap_or(0),
            menu_type: data.menu_type.unwrap_or_default(),
            status: data.status.unwrap_or(true),
            operate: data.operate.unwrap_or_default(),
            memo: data.memo,
            created_at: now,
            updated_at: now,
        })?;
        info!(menu_id = menu.id, name = %menu.name, parent = ?menu.parent, "Menu created");
        Ok(menu)
    }

    /// Merge the supplied fields into the stored menu
    pub fn update_menu(&self, id: MenuId, data: MenuUpdate) -> AppResult<MenuNode> {
        let mut menu = fetch_menu(self.store.as_ref(), id)?;

        if let Some(parent) = data.parent {
            menu.parent = parent;
        }
        if let Some(name) = data.name {
            validate_required_text(&name, "name", MAX_NAME_LEN)?;
            menu.name = name;
        }
        if let Some(code) = data.code {
            validate_required_text(&code, "code", MAX_NAME_LEN)?;
            menu.code = code;
        }
        if let Some(url) = data.url {
            validate_text(&url, "url", MAX_URL_LEN)?;
            menu.url = url;
        }
        if let Some(icon) = data.icon {
            validate_text(&icon, "icon", MAX_NAME_LEN)?;
            menu.icon = icon;
        }
        if let Some(hidden) = data.hidden {
            menu.hidden = hidden;
        }
        if let Some(sequence) = data.sequence {
            menu.sequence = sequence;
        }
        if let Some(menu_type) = data.menu_type {
            menu.menu_type = menu_type;
        }
        if let Some(status) = data.status {
            menu.status = status;
        }
        if let Some(operate) = data.operate {
            menu.operate = operate;
        }
        if let Some(memo) = data.memo {
            validate_text(&memo, "memo", MAX_NOTE_LEN)?;
            menu.memo = Some(memo);
        }
        menu.updated_at = now_millis();

        let menu = self.store.update_menu(menu)?;
        info!(menu_id = menu.id, name = %menu.name, "Menu updated");
        Ok(menu)
    }

    /// Delete a menu; children are detached, never deleted
    pub fn delete_menu(&self, id: MenuId) -> AppResult<()> {
        if !self.store.delete_menu(id)? {
            return Err(AppError::with_message(
                ErrorCode::MenuNotFound,
                format!("Menu {} not found", id),
            ));
        }
        info!(menu_id = id, "Menu deleted");
        Ok(())
    }

    pub fn get_menu(&self, id: MenuId) -> AppResult<MenuNode> {
        fetch_menu(self.store.as_ref(), id)
    }

    /// All menus in id order
    pub fn list_menus(&self) -> AppResult<Vec<MenuNode>> {
        let mut menus = self.store.list_menus()?;
        menus.sort_by_key(|m| m.id);
        Ok(menus)
    }

    /// Direct children, ordered by sequence, then id
    pub fn children(&self, id: MenuId) -> AppResult<Vec<MenuNode>> {
        fetch_menu(self.store.as_ref(), id)?;
        let mut children: Vec<MenuNode> = self
            .store
            .list_menus()?
            .into_iter()
            .filter(|m| m.parent == Some(id))
            .collect();
        children.sort_by_key(|m| (m.sequence, m.id));
        Ok(children)
    }

    /// `"<parent>--><name>"`, or the bare name for a root node
    pub fn menu_label(&self, id: MenuId) -> AppResult<String> {
        let menu = fetch_menu(self.store.as_ref(), id)?;
        let parent = match menu.parent {
            Some(parent_id) => self.store.find_menu(parent_id)?,
            None => None,
        };
        Ok(menu.display_label(parent.as_ref()))
    }

    /// Whole forest, siblings ordered by sequence, then id
    pub fn menu_tree(&self) -> AppResult<Vec<MenuTreeNode>> {
        let menus = self.store.list_menus()?;
        let names: HashMap<MenuId, String> =
            menus.iter().map(|m| (m.id, m.name.clone())).collect();

        let mut by_parent: HashMap<Option<MenuId>, Vec<MenuNode>> = HashMap::new();
        for menu in menus {
            by_parent.entry(menu.parent).or_default().push(menu);
        }
        for siblings in by_parent.values_mut() {
            siblings.sort_by_key(|m| (m.sequence, m.id));
        }

        Ok(build_level(None, &mut by_parent, &names))
    }
}

fn build_level(
    parent: Option<MenuId>,
    by_parent: &mut HashMap<Option<MenuId>, Vec<MenuNode>>,
    names: &HashMap<MenuId, String>,
) -> Vec<MenuTreeNode> {
    let siblings = by_parent.remove(&parent).unwrap_or_default();
    siblings
        .into_iter()
        .map(|menu| {
            let parent_name = menu.parent.and_then(|p| names.get(&p)).map(String::as_str);
            let label = shared::models::hierarchy_label(parent_name, &menu.name);
            let children = build_level(Some(menu.id), by_parent, names);
            MenuTreeNode {
                menu,
                label,
                children,
            }
        })
        .collect()
}
