//! Permission Model
//!
//! Fine-grained model permissions. A permission is identified by
//! `<app_label>.<action>_<model>` (e.g. `systems.view_menu`) and targets a
//! single model type.

use serde::{Deserialize, Serialize};

/// Permission ID type
pub type PermissionId = i64;

/// Permission entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: PermissionId,
    /// Human readable label, e.g. "Can view menu"
    pub name: String,
    /// Namespace of the owning application, e.g. "systems"
    pub app_label: String,
    /// `<action>_<model>`, e.g. "view_menu"
    pub codename: String,
    /// Model the permission targets, e.g. "menu"
    pub model: String,
}

impl Permission {
    /// Build an unsaved permission for `action` on `model`
    pub fn new(
        app_label: impl Into<String>,
        action: &str,
        model: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let model = model.into();
        Self {
            id: 0,
            name: name.into(),
            app_label: app_label.into(),
            codename: format!("{}_{}", action, model),
            model,
        }
    }

    /// Full identifier, `<app_label>.<codename>`
    pub fn identifier(&self) -> String {
        format!("{}.{}", self.app_label, self.codename)
    }

    /// Whether this permission applies to objects of `target`'s model
    pub fn applies_to(&self, target: &dyn PermissionTarget) -> bool {
        self.model == target.model_name()
    }
}

/// Split a permission identifier into `(app_label, codename)`
///
/// Returns `None` when the identifier has no `.` separator.
pub fn split_identifier(identifier: &str) -> Option<(&str, &str)> {
    identifier.split_once('.')
}

/// Anything a permission can be checked against
///
/// Object-level checks match on model type only, never on the instance.
pub trait PermissionTarget {
    /// Model name used in permission codenames, e.g. "menu"
    fn model_name(&self) -> &str;
}

impl PermissionTarget for Permission {
    fn model_name(&self) -> &str {
        "permission"
    }
}

/// Register permission payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionCreate {
    pub app_label: String,
    /// Verb, e.g. "add", "change", "delete", "view"
    pub action: String,
    pub model: String,
    /// Defaults to "Can <action> <model>"
    pub name: Option<String>,
}

impl PermissionCreate {
    pub fn new(app_label: impl Into<String>, action: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            app_label: app_label.into(),
            action: action.into(),
            model: model.into(),
            name: None,
        }
    }

    /// Turn the payload into an unsaved [`Permission`]
    pub fn into_permission(self) -> Permission {
        let name = self
            .name
            .unwrap_or_else(|| format!("Can {} {}", self.action, self.model));
        Permission::new(self.app_label, &self.action, self.model, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Book;

    impl PermissionTarget for Book {
        fn model_name(&self) -> &str {
            "book"
        }
    }

    #[test]
    fn test_identifier_format() {
        let perm = Permission::new("systems", "view", "menu", "Can view menu");
        assert_eq!(perm.codename, "view_menu");
        assert_eq!(perm.identifier(), "systems.view_menu");
    }

    #[test]
    fn test_split_identifier() {
        assert_eq!(
            split_identifier("systems.add_menu"),
            Some(("systems", "add_menu"))
        );
        assert_eq!(split_identifier("no_app_label"), None);
    }

    #[test]
    fn test_applies_to_matches_model_only() {
        let perm = Permission::new("library", "add", "book", "Can add book");
        assert!(perm.applies_to(&Book));

        let other = Permission::new("systems", "add", "menu", "Can add menu");
        assert!(!other.applies_to(&Book));
    }

    #[test]
    fn test_create_payload_default_name() {
        let perm = PermissionCreate::new("systems", "delete", "role").into_permission();
        assert_eq!(perm.name, "Can delete role");
        assert_eq!(perm.identifier(), "systems.delete_role");
        assert_eq!(perm.model, "role");
    }
}
