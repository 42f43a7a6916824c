//! Reconciliation of a local draft against freshly-fetched server state.
//!
//! One rule, used everywhere: server fields that are present override the
//! draft for matching keys; draft fields fill the gaps (offline edits, or
//! before the first round-trip completes).

use serde_json::Value;

/// Merge `remote` over `local`, remote-wins on overlapping keys.
///
/// For two JSON objects the merge is shallow: every key present in `remote`
/// replaces the local value wholesale. When `remote` is not an object it
/// replaces the draft entirely, unless it is `null`, in which case the draft
/// stands alone.
pub fn merge_remote_over_local(local: &Value, remote: &Value) -> Value {
    match (local, remote) {
        (Value::Object(local_map), Value::Object(remote_map)) => {
            let mut merged = local_map.clone();
            for (key, value) in remote_map {
                merged.insert(key.clone(), value.clone());
            }
            Value::Object(merged)
        }
        (local, Value::Null) => local.clone(),
        (_, remote) => remote.clone(),
    }
}
