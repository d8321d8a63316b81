//! Storage Module
//!
//! [`RecordStore`] is the contract the services consume; [`MemoryStore`]
//! is the bundled implementation.
//!
//! Stores own the integrity rules that must hold under concurrency:
//! - username, role name and role code uniqueness
//! - referenced role / menu / permission ids must exist
//! - parent assignments never form a cycle
//! - deleting a menu or role detaches its children and unlinks it from
//!   every link set, never deleting the referenced records
//! - every write is applied as one unit (no intermediate state is visible)
//! - read-merge-write of a user happens inside the store ([`RecordStore::modify_user`]),
//!   so concurrent writers never overwrite each other's fields

pub mod memory;

pub use memory::MemoryStore;

use shared::error::{AppError, ErrorCode};
use shared::models::{
    MenuId, MenuNode, Permission, PermissionId, Role, RoleId, User, UserId,
};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Failure carrying the precise domain error code
    #[error("{1}")]
    Business(ErrorCode, String),
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Business(code, msg) => AppError::with_message(code, msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// A user together with the permission rows it is granted, read as one snapshot
///
/// `group_permissions` come from directly attached roles only, deduplicated
/// in role order.
#[derive(Debug, Clone)]
pub struct UserGrants {
    pub user: User,
    pub user_permissions: Vec<Permission>,
    pub group_permissions: Vec<Permission>,
}

/// Record store consumed by the services
///
/// `insert_*` assigns a fresh id when the record's id is `0`; a non-zero id
/// is kept if it is free. `update_*` replaces the whole stored record,
/// including its link sets, in one step.
pub trait RecordStore: Send + Sync {
    // ── Users ───────────────────────────────────────────────────────
    fn insert_user(&self, user: User) -> RepoResult<User>;

    /// Apply `apply` to the stored user and write the result back
    ///
    /// The read, the edit, the integrity checks and the write share one
    /// critical section. A rejected edit leaves the stored record untouched.
    fn modify_user(&self, id: UserId, apply: &mut dyn FnMut(&mut User)) -> RepoResult<User>;

    /// Stamp `last_login` without touching any other field
    fn set_last_login(&self, id: UserId, at: i64) -> RepoResult<User>;

    fn delete_user(&self, id: UserId) -> RepoResult<bool>;
    fn find_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    fn list_users(&self) -> RepoResult<Vec<User>>;

    /// The user, its direct permissions and its roles' permissions in one read
    fn load_grants(&self, id: UserId) -> RepoResult<Option<UserGrants>>;

    // ── Roles ───────────────────────────────────────────────────────
    fn insert_role(&self, role: Role) -> RepoResult<Role>;
    fn update_role(&self, role: Role) -> RepoResult<Role>;
    fn delete_role(&self, id: RoleId) -> RepoResult<bool>;
    fn find_role(&self, id: RoleId) -> RepoResult<Option<Role>>;
    fn list_roles(&self) -> RepoResult<Vec<Role>>;

    // ── Menus ───────────────────────────────────────────────────────
    fn insert_menu(&self, menu: MenuNode) -> RepoResult<MenuNode>;
    fn update_menu(&self, menu: MenuNode) -> RepoResult<MenuNode>;
    fn delete_menu(&self, id: MenuId) -> RepoResult<bool>;
    fn find_menu(&self, id: MenuId) -> RepoResult<Option<MenuNode>>;
    fn list_menus(&self) -> RepoResult<Vec<MenuNode>>;

    // ── Permissions ─────────────────────────────────────────────────
    fn insert_permission(&self, permission: Permission) -> RepoResult<Permission>;
    fn find_permission(&self, id: PermissionId) -> RepoResult<Option<Permission>>;
    fn find_permission_by_identifier(&self, identifier: &str) -> RepoResult<Option<Permission>>;
    fn list_permissions(&self) -> RepoResult<Vec<Permission>>;
}
