//! User Directory - 用户目录
//!
//! 用户的创建、部分更新、删除与认证，以及加载权限判定用的 [`CurrentUser`]。
//! 未指定角色的新用户自动挂载配置中的默认角色。

use super::{collect_permissions, fetch_role, fetch_user};
use crate::auth::{
    CurrentUser, hash_password, make_unusable_password, verify_dummy_password, verify_password,
};
use crate::core::Config;
use crate::db::RecordStore;
use crate::security_log;
use crate::utils::validation::{
    MAX_AVATAR_LEN, MAX_NOTE_LEN, MAX_PASSWORD_LEN, MAX_USERNAME_LEN, validate_email,
    validate_optional_text, validate_required_text, validate_text,
};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Role, User, UserCreate, UserDetail, UserId, UserUpdate};
use shared::util::now_millis;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 用户目录
#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn RecordStore>,
    config: Config,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn RecordStore>, config: Config) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ── Creation ────────────────────────────────────────────────────

    /// Create a user with only a username and an optional password
    pub fn create_user(&self, username: &str, password: Option<&str>) -> AppResult<User> {
        let mut data = UserCreate::new(username);
        data.password = password.map(str::to_string);
        self.create(data)
    }

    /// Create an admin user; a superuser always gets a usable password
    pub fn create_superuser(&self, username: &str, password: &str) -> AppResult<User> {
        let data = UserCreate::new(username).with_password(password);
        let user = self.insert(data, true)?;
        security_log!("info", "superuser_created", user_id = user.id, username = user.username.as_str());
        Ok(user)
    }

    /// Create a user from a full payload
    ///
    /// An empty role list attaches the configured default role, which must exist.
    pub fn create(&self, data: UserCreate) -> AppResult<User> {
        self.insert(data, false)
    }

    fn insert(&self, data: UserCreate, is_admin: bool) -> AppResult<User> {
        let username = data.username.trim().to_string();
        validate_required_text(&username, "username", MAX_USERNAME_LEN)?;
        validate_optional_text(&data.realname, "realname", MAX_USERNAME_LEN)?;
        validate_optional_text(&data.avatar, "avatar", MAX_AVATAR_LEN)?;
        validate_optional_text(&data.memo, "memo", MAX_NOTE_LEN)?;
        if let Some(ref email) = data.email {
            validate_email(email)?;
        }

        let roles = if data.roles.is_empty() {
            let default_role = self.config.default_role_id;
            if self.store.find_role(default_role)?.is_none() {
                warn!(role_id = default_role, "Default role is missing");
                return Err(AppError::with_message(
                    ErrorCode::RoleNotFound,
                    format!("Default role {} not found", default_role),
                ));
            }
            vec![default_role]
        } else {
            data.roles
        };

        let password = match data.password {
            Some(ref raw) => new_password_hash(raw)?,
            None => make_unusable_password(),
        };

        let now = now_millis();
        let user = User {
            id: 0,
            username,
            realname: data
                .realname
                .unwrap_or_else(|| self.config.default_realname.clone()),
            email: data.email.unwrap_or_default(),
            avatar: data
                .avatar
                .unwrap_or_else(|| self.config.default_avatar.clone()),
            status: data.status.unwrap_or(true),
            is_admin,
            password,
            roles,
            permissions: data.permissions,
            memo: data.memo,
            last_login: None,
            created_at: now,
            updated_at: now,
        };

        let user = self.store.insert_user(user)?;
        info!(user_id = user.id, username = %user.username, roles = ?user.roles, "User created");
        Ok(user)
    }

    // ── Updates ─────────────────────────────────────────────────────

    /// Re-hash `new` into `user`'s credential
    ///
    /// On failure the prior credential is left in place.
    pub fn update_password(&self, user: &mut User, new: &str) -> AppResult<()> {
        user.password = new_password_hash(new)?;
        Ok(())
    }

    /// Merge the supplied fields into the stored user
    ///
    /// `roles` and `permissions` replace the stored sets wholesale. A
    /// password that cannot be hashed is skipped and the old one kept.
    /// Fields left out of `data` keep whatever the store holds at write
    /// time, including changes made by other callers since this call began.
    pub fn update_user(&self, id: UserId, data: UserUpdate) -> AppResult<User> {
        let UserUpdate {
            username,
            realname,
            email,
            avatar,
            status,
            memo,
            password,
            roles,
            permissions,
        } = data;

        let username = username.map(|u| u.trim().to_string());
        if let Some(ref username) = username {
            validate_required_text(username, "username", MAX_USERNAME_LEN)?;
        }
        if let Some(ref realname) = realname {
            validate_text(realname, "realname", MAX_USERNAME_LEN)?;
        }
        if let Some(ref email) = email {
            validate_email(email)?;
        }
        if let Some(ref avatar) = avatar {
            validate_text(avatar, "avatar", MAX_AVATAR_LEN)?;
        }
        if let Some(ref memo) = memo {
            validate_text(memo, "memo", MAX_NOTE_LEN)?;
        }

        // Hashed before the store is locked
        let password = password.and_then(|raw| match new_password_hash(&raw) {
            Ok(hash) => Some(hash),
            Err(e) => {
                warn!(user_id = id, error = %e, "Password not updated, keeping previous credential");
                None
            }
        });

        let now = now_millis();
        let user = self.store.modify_user(id, &mut |user| {
            if let Some(ref username) = username {
                user.username = username.clone();
            }
            if let Some(ref realname) = realname {
                user.realname = realname.clone();
            }
            if let Some(ref email) = email {
                user.email = email.clone();
            }
            if let Some(ref avatar) = avatar {
                user.avatar = avatar.clone();
            }
            if let Some(status) = status {
                user.status = status;
            }
            if let Some(ref memo) = memo {
                user.memo = Some(memo.clone());
            }
            if let Some(ref password) = password {
                user.password = password.clone();
            }
            if let Some(ref roles) = roles {
                user.roles = roles.clone();
            }
            if let Some(ref permissions) = permissions {
                user.permissions = permissions.clone();
            }
            user.updated_at = now;
        })?;
        info!(user_id = user.id, username = %user.username, "User updated");
        Ok(user)
    }

    /// Delete a user and its role / permission links
    pub fn delete_user(&self, id: UserId) -> AppResult<()> {
        if !self.store.delete_user(id)? {
            return Err(AppError::with_message(
                ErrorCode::UserNotFound,
                format!("User {} not found", id),
            ));
        }
        info!(user_id = id, "User deleted");
        Ok(())
    }

    // ── Reads ───────────────────────────────────────────────────────

    pub fn get_user(&self, id: UserId) -> AppResult<User> {
        fetch_user(self.store.as_ref(), id)
    }

    pub fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self.store.find_user_by_username(username)?)
    }

    /// All users ordered by username
    pub fn list_users(&self) -> AppResult<Vec<User>> {
        let mut users = self.store.list_users()?;
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    /// User with its roles and direct permissions expanded
    pub fn user_detail(&self, id: UserId) -> AppResult<UserDetail> {
        let user = fetch_user(self.store.as_ref(), id)?;
        let mut role_set = Vec::with_capacity(user.roles.len());
        for role_id in &user.roles {
            if let Some(role) = self.store.find_role(*role_id)? {
                role_set.push(role);
            }
        }
        let permission_set = collect_permissions(self.store.as_ref(), &user.permissions)?;
        Ok(UserDetail {
            user,
            role_set,
            permission_set,
        })
    }

    // ── Authentication ──────────────────────────────────────────────

    /// Check a username / password pair
    ///
    /// Unknown users and wrong passwords are indistinguishable to the caller.
    pub fn authenticate(&self, username: &str, password: &str) -> AppResult<User> {
        let Some(user) = self.store.find_user_by_username(username)? else {
            verify_dummy_password(password);
            security_log!("warn", "login_failed", username = username, reason = "unknown_user");
            return Err(AppError::invalid_credentials());
        };

        if !verify_password(password, &user.password) {
            security_log!("warn", "login_failed", username = username, reason = "bad_password");
            return Err(AppError::invalid_credentials());
        }

        if !user.status {
            security_log!("warn", "login_failed", username = username, reason = "account_disabled");
            return Err(AppError::new(ErrorCode::AccountDisabled));
        }

        let user = self.store.set_last_login(user.id, now_millis())?;
        info!(user_id = user.id, username = %user.username, "User authenticated");
        Ok(user)
    }

    /// Load the capability struct used by the permission checks
    ///
    /// The user and every permission row come from one store snapshot.
    pub fn current_user(&self, id: UserId) -> AppResult<CurrentUser> {
        let grants = self.store.load_grants(id)?.ok_or_else(|| {
            debug!(user_id = id, "User not found");
            AppError::with_message(ErrorCode::UserNotFound, format!("User {} not found", id))
        })?;
        Ok(CurrentUser::new(
            &grants.user,
            grants.user_permissions,
            grants.group_permissions,
        ))
    }

    // ── Bootstrap ───────────────────────────────────────────────────

    /// Create the configured default role if it is absent
    pub fn ensure_default_role(&self) -> AppResult<Role> {
        let id = self.config.default_role_id;
        if self.store.find_role(id)?.is_some() {
            return fetch_role(self.store.as_ref(), id);
        }
        let now = now_millis();
        let role = self.store.insert_role(Role {
            id,
            parent: None,
            name: self.config.default_role_name.clone(),
            code: self.config.default_role_code.clone(),
            sequence: 0,
            menus: vec![],
            permissions: vec![],
            memo: None,
            created_at: now,
            updated_at: now,
        })?;
        info!(role_id = role.id, name = %role.name, "Default role created");
        Ok(role)
    }
}

/// Length-check and hash a raw password
fn new_password_hash(raw: &str) -> AppResult<String> {
    validate_text(raw, "password", MAX_PASSWORD_LEN)?;
    hash_password(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures::{config, seeded_store};
    use shared::models::Permission;

    fn directory() -> UserDirectory {
        UserDirectory::new(seeded_store(), config())
    }

    #[test]
    fn test_create_user_attaches_default_role() {
        let dir = directory();
        let user = dir.create_user("alice", Some("pw")).unwrap();
        assert_eq!(user.roles, vec![1]);
        assert_eq!(user.realname, "图书馆管理员");
        assert!(user.status);
        assert!(!user.is_admin);
        assert!(user.has_usable_password());
        assert_ne!(user.password, "pw");
    }

    #[test]
    fn test_create_user_requires_username() {
        let dir = directory();
        let err = dir.create_user("", Some("pw")).unwrap_err();
        assert!(err.is_validation());
        let err = dir.create_user("   ", None).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_create_user_without_password_is_unusable() {
        let dir = directory();
        let user = dir.create_user("bob", None).unwrap();
        assert!(!user.has_usable_password());
        assert!(dir.authenticate("bob", "").is_err());
    }

    #[test]
    fn test_missing_default_role() {
        let dir = UserDirectory::new(Arc::new(crate::db::MemoryStore::new()), config());
        let err = dir.create_user("alice", None).unwrap_err();
        assert_eq!(err.code, ErrorCode::RoleNotFound);
        assert!(err.is_not_found());

        dir.ensure_default_role().unwrap();
        assert!(dir.create_user("alice", None).is_ok());
    }

    #[test]
    fn test_ensure_default_role_is_idempotent() {
        let dir = directory();
        let role = dir.ensure_default_role().unwrap();
        assert_eq!(role.id, 1);
        assert_eq!(role.code, "base");
    }

    #[test]
    fn test_unknown_role_is_not_found() {
        let dir = directory();
        let err = dir
            .create(UserCreate::new("carol").with_roles(vec![99]))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RoleNotFound);
    }

    #[test]
    fn test_duplicate_username() {
        let dir = directory();
        dir.create_user("alice", None).unwrap();
        let err = dir.create_user("alice", None).unwrap_err();
        assert_eq!(err.code, ErrorCode::UsernameExists);
        assert!(err.is_validation());
    }

    #[test]
    fn test_invalid_email_rejected() {
        let dir = directory();
        let mut data = UserCreate::new("dave");
        data.email = Some("nope".into());
        assert!(dir.create(data).unwrap_err().is_validation());
    }

    #[test]
    fn test_superuser() {
        let dir = directory();
        let admin = dir.create_superuser("root", "pw").unwrap();
        assert!(admin.is_admin);
        assert!(dir.current_user(admin.id).unwrap().has_perm("any.thing", None));
    }

    #[test]
    fn test_update_email_only() {
        let dir = directory();
        let user = dir.create_user("alice", Some("pw")).unwrap();
        let patch = UserUpdate {
            email: Some("alice@library.org".into()),
            ..Default::default()
        };
        let updated = dir.update_user(user.id, patch).unwrap();
        assert_eq!(updated.email, "alice@library.org");
        assert_eq!(updated.username, user.username);
        assert_eq!(updated.realname, user.realname);
        assert_eq!(updated.roles, user.roles);
        assert_eq!(updated.password, user.password);
    }

    #[test]
    fn test_update_replaces_role_set() {
        let dir = directory();
        let store = dir.store.clone();
        let mut extra = store.find_role(1).unwrap().unwrap();
        extra.id = 0;
        extra.name = "Librarian".into();
        extra.code = "librarian".into();
        let extra = store.insert_role(extra).unwrap();

        let user = dir.create_user("alice", None).unwrap();
        let patch = UserUpdate {
            roles: Some(vec![extra.id]),
            ..Default::default()
        };
        assert_eq!(dir.update_user(user.id, patch).unwrap().roles, vec![extra.id]);
    }

    #[test]
    fn test_update_password_failure_keeps_old_credential() {
        let dir = directory();
        let user = dir.create_user("alice", Some("old")).unwrap();
        let patch = UserUpdate {
            password: Some("x".repeat(MAX_PASSWORD_LEN + 1)),
            realname: Some("Alice".into()),
            ..Default::default()
        };
        let updated = dir.update_user(user.id, patch).unwrap();
        assert_eq!(updated.realname, "Alice");
        assert_eq!(updated.password, user.password);
        assert!(dir.authenticate("alice", "old").is_ok());
    }

    #[test]
    fn test_update_rejects_before_writing() {
        let dir = directory();
        let user = dir.create_user("alice", Some("pw")).unwrap();
        let patch = UserUpdate {
            realname: Some("Alice".into()),
            email: Some("not-an-email".into()),
            ..Default::default()
        };
        let err = dir.update_user(user.id, patch).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
        assert_eq!(dir.get_user(user.id).unwrap(), user);

        let patch = UserUpdate {
            memo: Some("x".into()),
            ..Default::default()
        };
        assert_eq!(dir.update_user(404, patch).unwrap_err().code, ErrorCode::UserNotFound);
    }

    #[test]
    fn test_unknown_user_login_is_invalid_credentials() {
        let dir = directory();
        dir.create_user("alice", Some("pw")).unwrap();
        let err = dir.authenticate("alicia", "pw").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCredentials);
        assert_eq!(err.message, AppError::invalid_credentials().message);
    }

    #[test]
    fn test_update_password_explicit() {
        let dir = directory();
        let mut user = dir.create_user("alice", Some("old")).unwrap();
        let before = user.password.clone();
        assert!(dir.update_password(&mut user, &"x".repeat(200)).is_err());
        assert_eq!(user.password, before);
        dir.update_password(&mut user, "new").unwrap();
        assert!(verify_password("new", &user.password));
    }

    #[test]
    fn test_authenticate_outcomes() {
        let dir = directory();
        let user = dir.create_user("alice", Some("pw")).unwrap();

        let ok = dir.authenticate("alice", "pw").unwrap();
        assert!(ok.last_login.is_some());

        let err = dir.authenticate("alice", "wrong").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCredentials);
        let err = dir.authenticate("nobody", "pw").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCredentials);

        dir.update_user(
            user.id,
            UserUpdate {
                status: Some(false),
                ..Default::default()
            },
        )
        .unwrap();
        let err = dir.authenticate("alice", "pw").unwrap_err();
        assert_eq!(err.code, ErrorCode::AccountDisabled);
    }

    #[test]
    fn test_detail_and_listing() {
        let dir = directory();
        let perm = dir
            .store
            .insert_permission(Permission::new("systems", "view", "menu", "Can view menu"))
            .unwrap();
        let mut data = UserCreate::new("zed");
        data.permissions = vec![perm.id];
        let zed = dir.create(data).unwrap();
        dir.create_user("amy", None).unwrap();

        let detail = dir.user_detail(zed.id).unwrap();
        assert_eq!(detail.role_set[0].code, "base");
        assert_eq!(detail.permission_set[0].identifier(), "systems.view_menu");
        let json = serde_json::to_value(&detail).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["username"], "zed");

        let names: Vec<String> = dir.list_users().unwrap().into_iter().map(|u| u.username).collect();
        assert_eq!(names, vec!["amy", "zed"]);
    }

    #[test]
    fn test_delete_user() {
        let dir = directory();
        let user = dir.create_user("alice", None).unwrap();
        dir.delete_user(user.id).unwrap();
        assert_eq!(dir.get_user(user.id).unwrap_err().code, ErrorCode::UserNotFound);
        assert!(dir.delete_user(user.id).is_err());
        assert!(dir.find_by_username("alice").unwrap().is_none());
    }
}
