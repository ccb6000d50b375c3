//! Field-by-field merging of configuration tiers.
//!
//! Higher tiers override lower ones key by key; arrays and scalars are
//! replaced whole.

use serde_json::Value;

/// Deep merge two JSON values, with `overlay` taking precedence over `base`.
///
/// A null in `overlay` means "not specified" and keeps the base value.
///
/// ```
/// use recordbook::config::deep_merge;
/// use serde_json::json;
///
/// let base = json!({"server": {"db_path": "a.db", "ui": {"port": 1}}});
/// let overlay = json!({"server": {"ui": {"port": 2}}});
/// assert_eq!(
///     deep_merge(base, overlay),
///     json!({"server": {"db_path": "a.db", "ui": {"port": 2}}})
/// );
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Merge values in order, later ones taking precedence.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_keys_merge() {
        let base = json!({"records": {"preview_rows": 5, "default_category": "honor"}});
        let overlay = json!({"records": {"preview_rows": 8}});
        assert_eq!(
            deep_merge(base, overlay),
            json!({"records": {"preview_rows": 8, "default_category": "honor"}})
        );
    }

    #[test]
    fn test_null_keeps_base() {
        let base = json!({"export": {"gzip_threshold": "1MB"}});
        let overlay = json!({"export": {"gzip_threshold": null}});
        assert_eq!(deep_merge(base.clone(), overlay), base);
        assert_eq!(deep_merge(base.clone(), Value::Null), base);
    }

    #[test]
    fn test_scalars_and_arrays_replace() {
        let base = json!({"a": [1, 2], "b": {"c": 1}});
        let overlay = json!({"a": [3], "b": 7});
        assert_eq!(deep_merge(base, overlay), json!({"a": [3], "b": 7}));
    }

    #[test]
    fn test_merge_all_applies_in_order() {
        let merged = deep_merge_all(vec![
            json!({"server": {"ui": {"port": 1}}}),
            json!({"server": {"ui": {"port": 2}}}),
            json!({"server": {"db_path": "x.db"}}),
        ]);
        assert_eq!(merged, json!({"server": {"ui": {"port": 2}, "db_path": "x.db"}}));
    }
}
