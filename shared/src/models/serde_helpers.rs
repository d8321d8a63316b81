//! Common serde helpers for nullable payload fields

use serde::{Deserialize, Deserializer};

/// Deserialize bool that treats null as true
pub fn bool_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<bool>::deserialize(deserializer).map(|opt| opt.unwrap_or(true))
}

/// Deserialize bool that treats null as false
pub fn bool_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<bool>::deserialize(deserializer).map(|opt| opt.unwrap_or(false))
}

/// Three-state field for partial updates
///
/// - field absent → `None` (keep stored value)
/// - field `null` → `Some(None)` (clear stored value)
/// - field set → `Some(Some(v))`
///
/// Use together with `#[serde(default)]`.
pub mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }

    pub fn serialize<T, S>(value: &Option<Option<T>>, s: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(s),
            None => s.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, with = "super::double_option")]
        parent: Option<Option<i64>>,
        #[serde(default = "default_true", deserialize_with = "super::bool_true")]
        status: bool,
    }

    fn default_true() -> bool {
        true
    }

    #[test]
    fn test_double_option_states() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.parent, None);

        let cleared: Patch = serde_json::from_str(r#"{"parent":null}"#).unwrap();
        assert_eq!(cleared.parent, Some(None));

        let set: Patch = serde_json::from_str(r#"{"parent":4}"#).unwrap();
        assert_eq!(set.parent, Some(Some(4)));
    }

    #[test]
    fn test_bool_true_on_null() {
        let p: Patch = serde_json::from_str(r#"{"status":null}"#).unwrap();
        assert!(p.status);
        let p: Patch = serde_json::from_str(r#"{"status":false}"#).unwrap();
        assert!(!p.status);
    }
}
