//! In-memory record store
//!
//! Arena of id-keyed tables behind a single `RwLock`. Every write, including
//! its integrity checks and cascades, runs under one write-lock acquisition.

use super::{RecordStore, RepoError, RepoResult, UserGrants};
use parking_lot::RwLock;
use shared::error::ErrorCode;
use shared::models::{
    MenuId, MenuNode, Permission, PermissionId, Role, RoleId, User, UserId,
};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    roles: BTreeMap<RoleId, Role>,
    menus: BTreeMap<MenuId, MenuNode>,
    permissions: BTreeMap<PermissionId, Permission>,
    seq: Sequences,
}

/// Last id handed out per table; ids are never reused after a delete
#[derive(Debug, Default)]
struct Sequences {
    user: i64,
    role: i64,
    menu: i64,
    permission: i64,
}

/// Pick the id for an insert: keep a free explicit id, else allocate
fn allocate<T>(
    table: &BTreeMap<i64, T>,
    last: &mut i64,
    requested: i64,
    entity: &str,
) -> RepoResult<i64> {
    let id = if requested == 0 {
        last.checked_add(1).ok_or_else(|| {
            RepoError::Validation(format!("{} id sequence exhausted", entity))
        })?
    } else {
        requested
    };
    if table.contains_key(&id) {
        return Err(RepoError::Duplicate(format!("{} {} already exists", entity, id)));
    }
    *last = (*last).max(id);
    Ok(id)
}

/// Drop repeated ids, keeping first occurrence order
fn dedup_ids(ids: &mut Vec<i64>) {
    let mut seen = HashSet::new();
    ids.retain(|id| seen.insert(*id));
}

/// Whether making `parent` the parent of `id` closes a loop
fn creates_cycle(id: i64, parent: Option<i64>, parent_of: impl Fn(i64) -> Option<i64>, limit: usize) -> bool {
    let mut cursor = parent;
    let mut steps = 0;
    while let Some(current) = cursor {
        if current == id {
            return true;
        }
        steps += 1;
        if steps > limit {
            return true;
        }
        cursor = parent_of(current);
    }
    false
}

impl Tables {
    fn check_user(&self, user: &User) -> RepoResult<()> {
        if self
            .users
            .values()
            .any(|u| u.id != user.id && u.username == user.username)
        {
            return Err(RepoError::Business(
                ErrorCode::UsernameExists,
                format!("Username '{}' already exists", user.username),
            ));
        }
        self.check_roles_exist(&user.roles)?;
        self.check_permissions_exist(&user.permissions)
    }

    fn check_role(&self, role: &Role) -> RepoResult<()> {
        for other in self.roles.values().filter(|r| r.id != role.id) {
            if other.name == role.name {
                return Err(RepoError::Business(
                    ErrorCode::RoleNameExists,
                    format!("Role name '{}' already exists", role.name),
                ));
            }
            if other.code == role.code {
                return Err(RepoError::Business(
                    ErrorCode::RoleCodeExists,
                    format!("Role code '{}' already exists", role.code),
                ));
            }
        }
        if let Some(parent) = role.parent {
            self.check_roles_exist(&[parent])?;
            let parent_of = |id: RoleId| self.roles.get(&id).and_then(|r| r.parent);
            if creates_cycle(role.id, Some(parent), parent_of, self.roles.len()) {
                return Err(RepoError::Business(
                    ErrorCode::HierarchyCycle,
                    format!("Role {} cannot be placed under role {}", role.id, parent),
                ));
            }
        }
        self.check_menus_exist(&role.menus)?;
        self.check_permissions_exist(&role.permissions)
    }

    fn check_menu(&self, menu: &MenuNode) -> RepoResult<()> {
        if let Some(parent) = menu.parent {
            self.check_menus_exist(&[parent])?;
            let parent_of = |id: MenuId| self.menus.get(&id).and_then(|m| m.parent);
            if creates_cycle(menu.id, Some(parent), parent_of, self.menus.len()) {
                return Err(RepoError::Business(
                    ErrorCode::HierarchyCycle,
                    format!("Menu {} cannot be placed under menu {}", menu.id, parent),
                ));
            }
        }
        Ok(())
    }

    fn check_roles_exist(&self, ids: &[RoleId]) -> RepoResult<()> {
        match ids.iter().find(|id| !self.roles.contains_key(id)) {
            Some(id) => Err(RepoError::Business(
                ErrorCode::RoleNotFound,
                format!("Role {} not found", id),
            )),
            None => Ok(()),
        }
    }

    fn check_menus_exist(&self, ids: &[MenuId]) -> RepoResult<()> {
        match ids.iter().find(|id| !self.menus.contains_key(id)) {
            Some(id) => Err(RepoError::Business(
                ErrorCode::MenuNotFound,
                format!("Menu {} not found", id),
            )),
            None => Ok(()),
        }
    }

    fn user_not_found(id: UserId) -> RepoError {
        RepoError::Business(ErrorCode::UserNotFound, format!("User {} not found", id))
    }

    fn permissions_of<'a>(&self, ids: impl IntoIterator<Item = &'a PermissionId>) -> Vec<Permission> {
        ids.into_iter()
            .filter_map(|id| self.permissions.get(id).cloned())
            .collect()
    }

    fn check_permissions_exist(&self, ids: &[PermissionId]) -> RepoResult<()> {
        match ids.iter().find(|id| !self.permissions.contains_key(id)) {
            Some(id) => Err(RepoError::Business(
                ErrorCode::PermissionNotFound,
                format!("Permission {} not found", id),
            )),
            None => Ok(()),
        }
    }
}

/// In-memory [`RecordStore`]
///
/// Cheap to clone; clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn insert_user(&self, mut user: User) -> RepoResult<User> {
        let mut guard = self.tables.write();
        let tables = &mut *guard;
        dedup_ids(&mut user.roles);
        dedup_ids(&mut user.permissions);
        tables.check_user(&user)?;
        user.id = allocate(&tables.users, &mut tables.seq.user, user.id, "User")?;
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn modify_user(&self, id: UserId, apply: &mut dyn FnMut(&mut User)) -> RepoResult<User> {
        let mut tables = self.tables.write();
        let mut user = tables
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| Tables::user_not_found(id))?;
        apply(&mut user);
        user.id = id;
        dedup_ids(&mut user.roles);
        dedup_ids(&mut user.permissions);
        tables.check_user(&user)?;
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    fn set_last_login(&self, id: UserId, at: i64) -> RepoResult<User> {
        let mut tables = self.tables.write();
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| Tables::user_not_found(id))?;
        user.last_login = Some(at);
        Ok(user.clone())
    }

    fn delete_user(&self, id: UserId) -> RepoResult<bool> {
        Ok(self.tables.write().users.remove(&id).is_some())
    }

    fn find_user(&self, id: UserId) -> RepoResult<Option<User>> {
        Ok(self.tables.read().users.get(&id).cloned())
    }

    fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        Ok(self
            .tables
            .read()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        Ok(self.tables.read().users.values().cloned().collect())
    }

    fn load_grants(&self, id: UserId) -> RepoResult<Option<UserGrants>> {
        let tables = self.tables.read();
        let Some(user) = tables.users.get(&id) else {
            return Ok(None);
        };

        // Only directly attached roles count, parents are not climbed
        let mut seen = HashSet::new();
        let group_ids: Vec<PermissionId> = user
            .roles
            .iter()
            .filter_map(|role_id| tables.roles.get(role_id))
            .flat_map(|role| role.permissions.iter().copied())
            .filter(|p| seen.insert(*p))
            .collect();

        Ok(Some(UserGrants {
            user_permissions: tables.permissions_of(&user.permissions),
            group_permissions: tables.permissions_of(&group_ids),
            user: user.clone(),
        }))
    }

    fn insert_role(&self, mut role: Role) -> RepoResult<Role> {
        let mut guard = self.tables.write();
        let tables = &mut *guard;
        dedup_ids(&mut role.menus);
        dedup_ids(&mut role.permissions);
        tables.check_role(&role)?;
        role.id = allocate(&tables.roles, &mut tables.seq.role, role.id, "Role")?;
        tables.roles.insert(role.id, role.clone());
        Ok(role)
    }

    fn update_role(&self, mut role: Role) -> RepoResult<Role> {
        let mut tables = self.tables.write();
        if !tables.roles.contains_key(&role.id) {
            return Err(RepoError::Business(
                ErrorCode::RoleNotFound,
                format!("Role {} not found", role.id),
            ));
        }
        dedup_ids(&mut role.menus);
        dedup_ids(&mut role.permissions);
        tables.check_role(&role)?;
        tables.roles.insert(role.id, role.clone());
        Ok(role)
    }

    fn delete_role(&self, id: RoleId) -> RepoResult<bool> {
        let mut tables = self.tables.write();
        if tables.roles.remove(&id).is_none() {
            return Ok(false);
        }
        for child in tables.roles.values_mut().filter(|r| r.parent == Some(id)) {
            child.parent = None;
        }
        for user in tables.users.values_mut() {
            user.roles.retain(|r| *r != id);
        }
        Ok(true)
    }

    fn find_role(&self, id: RoleId) -> RepoResult<Option<Role>> {
        Ok(self.tables.read().roles.get(&id).cloned())
    }

    fn list_roles(&self) -> RepoResult<Vec<Role>> {
        Ok(self.tables.read().roles.values().cloned().collect())
    }

    fn insert_menu(&self, mut menu: MenuNode) -> RepoResult<MenuNode> {
        let mut guard = self.tables.write();
        let tables = &mut *guard;
        tables.check_menu(&menu)?;
        menu.id = allocate(&tables.menus, &mut tables.seq.menu, menu.id, "Menu")?;
        tables.menus.insert(menu.id, menu.clone());
        Ok(menu)
    }

    fn update_menu(&self, menu: MenuNode) -> RepoResult<MenuNode> {
        let mut tables = self.tables.write();
        if !tables.menus.contains_key(&menu.id) {
            return Err(RepoError::Business(
                ErrorCode::MenuNotFound,
                format!("Menu {} not found", menu.id),
            ));
        }
        tables.check_menu(&menu)?;
        tables.menus.insert(menu.id, menu.clone());
        Ok(menu)
    }

    fn delete_menu(&self, id: MenuId) -> RepoResult<bool> {
        let mut tables = self.tables.write();
        if tables.menus.remove(&id).is_none() {
            return Ok(false);
        }
        for child in tables.menus.values_mut().filter(|m| m.parent == Some(id)) {
            child.parent = None;
        }
        for role in tables.roles.values_mut() {
            role.menus.retain(|m| *m != id);
        }
        Ok(true)
    }

    fn find_menu(&self, id: MenuId) -> RepoResult<Option<MenuNode>> {
        Ok(self.tables.read().menus.get(&id).cloned())
    }

    fn list_menus(&self) -> RepoResult<Vec<MenuNode>> {
        Ok(self.tables.read().menus.values().cloned().collect())
    }

    fn insert_permission(&self, mut permission: Permission) -> RepoResult<Permission> {
        let mut guard = self.tables.write();
        let tables = &mut *guard;
        let identifier = permission.identifier();
        if tables
            .permissions
            .values()
            .any(|p| p.identifier() == identifier)
        {
            return Err(RepoError::Business(
                ErrorCode::PermissionExists,
                format!("Permission '{}' already exists", identifier),
            ));
        }
        permission.id = allocate(
            &tables.permissions,
            &mut tables.seq.permission,
            permission.id,
            "Permission",
        )?;
        tables.permissions.insert(permission.id, permission.clone());
        Ok(permission)
    }

    fn find_permission(&self, id: PermissionId) -> RepoResult<Option<Permission>> {
        Ok(self.tables.read().permissions.get(&id).cloned())
    }

    fn find_permission_by_identifier(&self, identifier: &str) -> RepoResult<Option<Permission>> {
        Ok(self
            .tables
            .read()
            .permissions
            .values()
            .find(|p| p.identifier() == identifier)
            .cloned())
    }

    fn list_permissions(&self) -> RepoResult<Vec<Permission>> {
        Ok(self.tables.read().permissions.values().cloned().collect())
    }
}
