//! Record and result shapes exchanged with storage connectors

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// A single persisted record: field names mapped to JSON values.
pub type Record = serde_json::Map<String, Value>;

/// Coerce a JSON value into a [`Record`], yielding an empty record for
/// anything that is not an object.
///
/// ```
/// use serde_json::json;
/// use strata_core::record::record;
///
/// let r = record(json!({ "id": 1 }));
/// assert_eq!(r.get("id"), Some(&json!(1)));
/// assert!(record(json!("not an object")).is_empty());
/// ```
pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}

/// Raw answer of a connector `get`.
///
/// Drivers may answer an id lookup with a single record and a filtered query
/// with a list; the processing pipeline restores whichever shape came in.
#[derive(Debug, Clone, PartialEq)]
pub enum Rows {
    One(Record),
    Many(Vec<Record>),
}

impl From<Record> for Rows {
    fn from(record: Record) -> Self {
        Self::One(record)
    }
}

impl From<Vec<Record>> for Rows {
    fn from(records: Vec<Record>) -> Self {
        Self::Many(records)
    }
}

/// Shaped result of a pipeline `get`.
///
/// Serializes untagged: `One` as a JSON object, `Many` as a JSON array and
/// `Keyed` as an object keyed by the requested field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GetResult {
    One(Record),
    Many(Vec<Record>),
    Keyed(BTreeMap<String, Record>),
}

impl GetResult {
    /// Number of records in the result, whatever its shape.
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(records) => records.len(),
            Self::Keyed(keyed) => keyed.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The record list, when the result is sequence shaped.
    pub fn into_many(self) -> Option<Vec<Record>> {
        match self {
            Self::Many(records) => Some(records),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn results_serialize_in_their_natural_shape() {
        let one = GetResult::One(record(json!({ "id": 1 })));
        assert_eq!(serde_json::to_value(&one).unwrap(), json!({ "id": 1 }));

        let many = GetResult::Many(vec![record(json!({ "id": 1 }))]);
        assert_eq!(serde_json::to_value(&many).unwrap(), json!([{ "id": 1 }]));

        let mut keyed = BTreeMap::new();
        keyed.insert("1".to_string(), record(json!({ "id": 1 })));
        let keyed = GetResult::Keyed(keyed);
        assert_eq!(
            serde_json::to_value(&keyed).unwrap(),
            json!({ "1": { "id": 1 } })
        );
    }

    #[test]
    fn len_counts_records_across_shapes() {
        assert_eq!(GetResult::One(record(json!({}))).len(), 1);
        assert_eq!(GetResult::Many(Vec::new()).len(), 0);
        assert!(GetResult::Many(Vec::new()).is_empty());
    }
}
