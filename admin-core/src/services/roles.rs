//! Role Tree - 角色树
//!
//! 角色的父角色只用于展示 (`"<父>--><名>"`)，不传递权限。

use super::{collect_permissions, fetch_role};
use crate::db::RecordStore;
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text, validate_text};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{MenuNode, Permission, Role, RoleCreate, RoleId, RoleUpdate, User};
use shared::util::now_millis;
use std::sync::Arc;
use tracing::info;

/// 角色树服务
#[derive(Clone)]
pub struct RoleTree {
    store: Arc<dyn RecordStore>,
}

impl RoleTree {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn create_role(&self, data: RoleCreate) -> AppResult<Role> {
        validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
        validate_required_text(&data.code, "code", MAX_NAME_LEN)?;
        validate_optional_text(&data.memo, "memo", MAX_NOTE_LEN)?;

        let now = now_millis();
        let role = self.store.insert_role(Role {
            id: 0,
            parent: data.parent,
            name: data.name,
            code: data.code,
            sequence: data.sequence.unwrap_or(0),
            menus: data.menus,
            permissions: data.permissions,
            memo: data.memo,
            created_at: now,
            updated_at: now,
        })?;
        info!(role_id = role.id, name = %role.name, code = %role.code, "Role created");
        Ok(role)
    }

    /// Merge the supplied fields into the stored role
    ///
    /// `menus` and `permissions` replace the stored sets when present.
    pub fn update_role(&self, id: RoleId, data: RoleUpdate) -> AppResult<Role> {
        let mut role = fetch_role(self.store.as_ref(), id)?;

        if let Some(parent) = data.parent {
            role.parent = parent;
        }
        if let Some(name) = data.name {
            validate_required_text(&name, "name", MAX_NAME_LEN)?;
            role.name = name;
        }
        if let Some(code) = data.code {
            validate_required_text(&code, "code", MAX_NAME_LEN)?;
            role.code = code;
        }
        if let Some(sequence) = data.sequence {
            role.sequence = sequence;
        }
        if let Some(menus) = data.menus {
            role.menus = menus;
        }
        if let Some(permissions) = data.permissions {
            role.permissions = permissions;
        }
        if let Some(memo) = data.memo {
            validate_text(&memo, "memo", MAX_NOTE_LEN)?;
            role.memo = Some(memo);
        }
        role.updated_at = now_millis();

        let role = self.store.update_role(role)?;
        info!(role_id = role.id, name = %role.name, "Role updated");
        Ok(role)
    }

    /// Delete a role; child roles are detached and users unlinked
    pub fn delete_role(&self, id: RoleId) -> AppResult<()> {
        if !self.store.delete_role(id)? {
            return Err(AppError::with_message(
                ErrorCode::RoleNotFound,
                format!("Role {} not found", id),
            ));
        }
        info!(role_id = id, "Role deleted");
        Ok(())
    }

    pub fn get_role(&self, id: RoleId) -> AppResult<Role> {
        fetch_role(self.store.as_ref(), id)
    }

    /// All roles ordered by sequence, then id
    pub fn list_roles(&self) -> AppResult<Vec<Role>> {
        let mut roles = self.store.list_roles()?;
        roles.sort_by_key(|r| (r.sequence, r.id));
        Ok(roles)
    }

    /// Menus attached to a role, ordered by sequence, then id
    pub fn role_menus(&self, id: RoleId) -> AppResult<Vec<MenuNode>> {
        let role = fetch_role(self.store.as_ref(), id)?;
        let mut menus = Vec::with_capacity(role.menus.len());
        for menu_id in &role.menus {
            if let Some(menu) = self.store.find_menu(*menu_id)? {
                menus.push(menu);
            }
        }
        menus.sort_by_key(|m| (m.sequence, m.id));
        Ok(menus)
    }

    /// Permissions attached directly to a role
    pub fn role_permissions(&self, id: RoleId) -> AppResult<Vec<Permission>> {
        let role = fetch_role(self.store.as_ref(), id)?;
        collect_permissions(self.store.as_ref(), &role.permissions)
    }

    /// Users holding a role, ordered by username
    pub fn role_users(&self, id: RoleId) -> AppResult<Vec<User>> {
        fetch_role(self.store.as_ref(), id)?;
        let mut users: Vec<User> = self
            .store
            .list_users()?
            .into_iter()
            .filter(|u| u.roles.contains(&id))
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    /// `"<parent>--><name>"`, or the bare name for a root role
    pub fn role_label(&self, id: RoleId) -> AppResult<String> {
        let role = fetch_role(self.store.as_ref(), id)?;
        let parent = match role.parent {
            Some(parent_id) => self.store.find_role(parent_id)?,
            None => None,
        };
        Ok(role.display_label(parent.as_ref()))
    }
}
