//! End-to-end RBAC flows over the in-memory store

use admin_core::auth::{has_module_perms, has_perm, has_perms, require_perm, require_superuser};
use admin_core::{
    AdminState, Config, ErrorCode, MemoryStore, MenuTree, PermissionRegistry, RecordStore,
    RoleTree, UserDirectory,
};
use shared::models::{MenuCreate, PermissionCreate, RoleCreate, RoleUpdate, UserCreate, UserUpdate};
use std::sync::Arc;

struct Admin {
    store: Arc<dyn RecordStore>,
    directory: UserDirectory,
    roles: RoleTree,
    menus: MenuTree,
    registry: PermissionRegistry,
}

fn setup() -> Admin {
    let state = AdminState::new(Arc::new(MemoryStore::new()), Config::default()).unwrap();
    Admin {
        store: state.store,
        directory: state.directory,
        roles: state.roles,
        menus: state.menus,
        registry: state.permissions,
    }
}

#[test]
fn test_alice_scenario() {
    let admin = setup();
    let view = admin
        .registry
        .register(PermissionCreate::new("systems", "view", "menu"))
        .unwrap();
    let add = admin
        .registry
        .register(PermissionCreate::new("systems", "add", "menu"))
        .unwrap();
    admin
        .registry
        .register(PermissionCreate::new("systems", "delete", "menu"))
        .unwrap();

    let mut librarian = RoleCreate::new("Librarian", "librarian");
    librarian.permissions = vec![add.id];
    let librarian = admin.roles.create_role(librarian).unwrap();

    let mut data = UserCreate::new("alice")
        .with_password("pw")
        .with_roles(vec![librarian.id]);
    data.permissions = vec![view.id];
    let alice = admin.directory.create(data).unwrap();

    let current = admin.directory.current_user(alice.id).unwrap();
    let user = Some(&current);
    assert!(has_perm(user, "systems.view_menu", None));
    assert!(has_perm(user, "systems.add_menu", None));
    assert!(!has_perm(user, "systems.delete_menu", None));
    assert!(has_module_perms(user, "systems"));
    assert!(!has_perms(user, &["systems.view_menu", "systems.delete_menu"], None));
}

#[test]
fn test_superuser_bypasses_checks() {
    let admin = setup();
    let root = admin.directory.create_superuser("root", "pw").unwrap();
    let current = admin.directory.current_user(root.id).unwrap();
    assert!(has_perm(Some(&current), "library.burn_book", None));
    assert!(has_module_perms(Some(&current), "anything"));

    // Disabling the account removes the bypass
    admin
        .directory
        .update_user(
            root.id,
            UserUpdate {
                status: Some(false),
                ..Default::default()
            },
        )
        .unwrap();
    let current = admin.directory.current_user(root.id).unwrap();
    assert!(!has_perm(Some(&current), "library.burn_book", None));
}

#[test]
fn test_parent_role_permissions_are_not_inherited() {
    let admin = setup();
    let delete = admin
        .registry
        .register(PermissionCreate::new("systems", "delete", "menu"))
        .unwrap();

    let mut staff = RoleCreate::new("Staff", "staff");
    staff.permissions = vec![delete.id];
    let staff = admin.roles.create_role(staff).unwrap();
    let mut librarian = RoleCreate::new("Librarian", "librarian");
    librarian.parent = Some(staff.id);
    let librarian = admin.roles.create_role(librarian).unwrap();

    let bob = admin
        .directory
        .create(UserCreate::new("bob").with_roles(vec![librarian.id]))
        .unwrap();
    let current = admin.directory.current_user(bob.id).unwrap();
    assert!(!has_perm(Some(&current), "systems.delete_menu", None));
    assert_eq!(admin.roles.role_label(librarian.id).unwrap(), "Staff-->Librarian");
}

#[test]
fn test_create_user_validation_and_default_role() {
    let admin = setup();
    let err = admin.directory.create_user("", Some("pw")).unwrap_err();
    assert!(err.is_validation());

    let alice = admin.directory.create_user("alice", Some("pw")).unwrap();
    assert_eq!(alice.roles, vec![1]);
    assert_eq!(admin.roles.role_users(1).unwrap()[0].username, "alice");
}

#[test]
fn test_email_only_update_leaves_other_fields() {
    let admin = setup();
    let alice = admin.directory.create_user("alice", Some("pw")).unwrap();
    let updated = admin
        .directory
        .update_user(
            alice.id,
            UserUpdate {
                email: Some("alice@library.org".into()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.username, "alice");
    assert_eq!(updated.realname, alice.realname);
    assert_eq!(updated.roles, alice.roles);
    assert!(admin.directory.authenticate("alice", "pw").is_ok());
}

#[test]
fn test_deleting_parent_menu_keeps_children() {
    let admin = setup();
    let books = admin
        .menus
        .create_menu(MenuCreate::new("Books", "books", "/books"))
        .unwrap();
    let add = admin
        .menus
        .create_menu(MenuCreate::new("Add Book", "add_book", "/books/add").under(books.id))
        .unwrap();
    let list = admin
        .menus
        .create_menu(MenuCreate::new("List Books", "list_books", "/books/list").under(books.id))
        .unwrap();

    let mut librarian = RoleCreate::new("Librarian", "librarian");
    librarian.menus = vec![books.id, add.id];
    let librarian = admin.roles.create_role(librarian).unwrap();

    admin.menus.delete_menu(books.id).unwrap();

    for id in [add.id, list.id] {
        assert_eq!(admin.menus.get_menu(id).unwrap().parent, None);
    }
    let menus = admin.roles.role_menus(librarian.id).unwrap();
    assert_eq!(menus.len(), 1);
    assert_eq!(menus[0].id, add.id);
}

#[test]
fn test_role_delete_unlinks_users_only() {
    let admin = setup();
    let perm = admin
        .registry
        .register(PermissionCreate::new("systems", "view", "role"))
        .unwrap();
    let mut librarian = RoleCreate::new("Librarian", "librarian");
    librarian.permissions = vec![perm.id];
    let librarian = admin.roles.create_role(librarian).unwrap();
    let alice = admin
        .directory
        .create(UserCreate::new("alice").with_roles(vec![1, librarian.id]))
        .unwrap();

    admin.roles.delete_role(librarian.id).unwrap();

    assert_eq!(admin.directory.get_user(alice.id).unwrap().roles, vec![1]);
    assert!(admin.registry.get(perm.id).is_ok());
    let current = admin.directory.current_user(alice.id).unwrap();
    assert!(!has_perm(Some(&current), "systems.view_role", None));
}

#[test]
fn test_role_set_replacement_is_wholesale() {
    let admin = setup();
    let a = admin.roles.create_role(RoleCreate::new("A", "a")).unwrap();
    let b = admin.roles.create_role(RoleCreate::new("B", "b")).unwrap();
    let user = admin
        .directory
        .create(UserCreate::new("carol").with_roles(vec![a.id]))
        .unwrap();

    let updated = admin
        .directory
        .update_user(
            user.id,
            UserUpdate {
                roles: Some(vec![b.id, 1]),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.roles, vec![b.id, 1]);

    // A failing replacement leaves the stored set untouched
    let err = admin
        .directory
        .update_user(
            user.id,
            UserUpdate {
                roles: Some(vec![a.id, 404]),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::RoleNotFound);
    assert_eq!(admin.store.find_user(user.id).unwrap().unwrap().roles, vec![b.id, 1]);
}

#[test]
fn test_uniqueness_violations() {
    let admin = setup();
    admin.directory.create_user("alice", None).unwrap();
    let dave = admin.directory.create_user("dave", None).unwrap();
    let err = admin
        .directory
        .update_user(
            dave.id,
            UserUpdate {
                username: Some("alice".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::UsernameExists);

    let role = admin.roles.create_role(RoleCreate::new("Staff", "staff")).unwrap();
    let err = admin
        .roles
        .update_role(
            role.id,
            RoleUpdate {
                code: Some("base".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::RoleCodeExists);
}

#[test]
fn test_password_update_fallback() {
    let admin = setup();
    let alice = admin.directory.create_user("alice", Some("old")).unwrap();
    admin
        .directory
        .update_user(
            alice.id,
            UserUpdate {
                password: Some("p".repeat(1000)),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(admin.directory.authenticate("alice", "old").is_ok());

    admin
        .directory
        .update_user(
            alice.id,
            UserUpdate {
                password: Some("new".into()),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(admin.directory.authenticate("alice", "new").is_ok());
    assert_eq!(
        admin.directory.authenticate("alice", "old").unwrap_err().code,
        ErrorCode::InvalidCredentials
    );
}

#[test]
fn test_enforcement_through_loaded_user() {
    let admin = setup();
    admin
        .registry
        .register(PermissionCreate::new("systems", "view", "menu"))
        .unwrap();
    let root = admin.directory.create_superuser("root", "pw").unwrap();
    let bob = admin.directory.create_user("bob", Some("pw")).unwrap();

    let root = admin.directory.current_user(root.id).unwrap();
    let bob = admin.directory.current_user(bob.id).unwrap();
    assert!(require_superuser(Some(&root)).is_ok());
    assert!(require_perm(Some(&root), "systems.view_menu", None).is_ok());

    assert_eq!(
        require_superuser(Some(&bob)).unwrap_err().code,
        ErrorCode::AdminRequired
    );
    assert_eq!(
        require_perm(Some(&bob), "systems.view_menu", None).unwrap_err().code,
        ErrorCode::PermissionDenied
    );
    assert_eq!(
        require_perm(None, "systems.view_menu", None).unwrap_err().code,
        ErrorCode::NotAuthenticated
    );
}
