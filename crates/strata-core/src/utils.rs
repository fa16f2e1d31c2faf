//! Small record helpers shared across the pipeline

use std::collections::BTreeMap;

use serde_json::Value;

use crate::record::Record;

/// Rekey a record list into a map keyed by `field`.
///
/// Records lacking the field, or holding a null there, are dropped. When two
/// records share a key value, the later one wins.
///
/// ```
/// use serde_json::json;
/// use strata_core::record::record;
/// use strata_core::utils::change_keys;
///
/// let records = vec![
///     record(json!({ "id": 1, "foo": "bar" })),
///     record(json!({ "id": 2, "foo": "bar2" })),
/// ];
/// let keyed = change_keys(records, "id");
/// assert_eq!(keyed["1"].get("foo"), Some(&json!("bar")));
/// assert_eq!(keyed["2"].get("foo"), Some(&json!("bar2")));
/// ```
pub fn change_keys(records: Vec<Record>, field: &str) -> BTreeMap<String, Record> {
    let mut keyed = BTreeMap::new();
    for record in records {
        if let Some(key) = record.get(field).and_then(object_key) {
            keyed.insert(key, record);
        }
    }
    keyed
}

/// Object-key rendition of a JSON value: strings verbatim, null excluded,
/// anything else through its JSON text.
pub fn object_key(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::record::record;

    #[test]
    fn records_without_the_field_are_dropped() {
        let records = vec![
            record(json!({ "id": 1, "name": "kept" })),
            record(json!({ "code": "x" })),
            record(json!({ "id": null, "name": "null id" })),
        ];

        let keyed = change_keys(records, "id");
        assert_eq!(keyed.len(), 1);
        assert_eq!(keyed["1"].get("name"), Some(&json!("kept")));
    }

    #[test]
    fn duplicate_keys_keep_the_later_record() {
        let records = vec![
            record(json!({ "code": "a", "n": 1 })),
            record(json!({ "code": "a", "n": 2 })),
        ];

        let keyed = change_keys(records, "code");
        assert_eq!(keyed.len(), 1);
        assert_eq!(keyed["a"].get("n"), Some(&json!(2)));
    }

    #[test]
    fn non_string_keys_use_their_json_text() {
        let records = vec![
            record(json!({ "k": 0 })),
            record(json!({ "k": true })),
            record(json!({ "k": "plain" })),
        ];

        let keyed = change_keys(records, "k");
        assert!(keyed.contains_key("0"));
        assert!(keyed.contains_key("true"));
        assert!(keyed.contains_key("plain"));
    }

    #[test]
    fn null_never_becomes_a_key() {
        assert_eq!(object_key(&Value::Null), None);
        assert_eq!(object_key(&json!("s")), Some("s".to_string()));
        assert_eq!(object_key(&json!(12)), Some("12".to_string()));
    }
}
