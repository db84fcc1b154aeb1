//! Record flattening for dot-notation key enumeration.

use crate::types::{Record, Value};

/// Expand nested records into a flat mapping of dot-joined paths to leaf values.
///
/// Arrays and scalars are leaves and are not traversed. A nested empty record has no leaves and
/// therefore contributes no entry. Key order follows a depth-first walk of `record`.
pub fn flatten(record: &Record) -> Record {
    let mut out = Record::new();
    flatten_into(record, &mut String::new(), &mut out);
    out
}

/// Dot-joined paths of every leaf in `record`, in [`flatten`] order.
pub fn flattened_keys(record: &Record) -> Vec<String> {
    flatten(record).into_iter().map(|(key, _)| key).collect()
}

fn flatten_into(record: &Record, prefix: &mut String, out: &mut Record) {
    for (key, value) in record {
        let restore = prefix.len();
        if !prefix.is_empty() {
            prefix.push('.');
        }
        prefix.push_str(key);

        match value {
            Value::Object(nested) => flatten_into(nested, prefix, out),
            leaf => {
                out.insert(prefix.clone(), leaf.clone());
            }
        }
        prefix.truncate(restore);
    }
}

#[cfg(test)]
mod tests {
    use super::{flatten, flattened_keys};
    use crate::types::Value;
    use serde_json::json;

    #[test]
    fn flattens_nested_records_depth_first() {
        let Value::Object(r) = json!({
            "id": 1,
            "user": {"name": "Ada", "address": {"city": "London", "zip": null}},
            "tags": ["x", {"deep": true}]
        }) else {
            unreachable!()
        };

        let flat = flatten(&r);
        assert_eq!(
            Value::Object(flat),
            json!({
                "id": 1,
                "user.name": "Ada",
                "user.address.city": "London",
                "user.address.zip": null,
                "tags": ["x", {"deep": true}]
            })
        );
    }

    #[test]
    fn empty_nested_record_has_no_leaves() {
        let Value::Object(r) = json!({"a": {}, "b": 2}) else {
            unreachable!()
        };
        assert_eq!(flattened_keys(&r), vec!["b".to_string()]);
    }

    #[test]
    fn flat_record_is_unchanged() {
        let Value::Object(r) = json!({"b": 1, "a": "x"}) else {
            unreachable!()
        };
        assert_eq!(flatten(&r), r);
        assert_eq!(flattened_keys(&r), vec!["b".to_string(), "a".to_string()]);
    }
}
