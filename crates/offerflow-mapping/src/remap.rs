//! Remap engine: tree-to-tree transformation.
//!
//! Applies a name-based rule set to a JSON node, producing one constructed
//! object per input element. Source paths use dot/bracket syntax
//! (`geos[0].latitude`) and are translated to JSON pointer paths; when the
//! input is an array, each element's index is prefixed to the pointer so a
//! single rule set covers every element.

use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{MappingError, Result};
use crate::rule::{MappingRule, MappingRuleSet};

/// Translate a dot/bracket path to a JSON pointer path.
///
/// `geos[0].latitude` becomes `/geos/0/latitude`.
pub(crate) fn to_pointer(path: &str) -> String {
    let mut pointer = String::with_capacity(path.len() + 1);
    pointer.push('/');
    for ch in path.chars() {
        match ch {
            '.' | '[' => pointer.push('/'),
            ']' => {}
            other => pointer.push(other),
        }
    }
    pointer
}

/// Apply a name-based rule set to a JSON node, depth-bounded.
///
/// Returns one constructed object per input element, in input order. The
/// input is never mutated. A `max_depth` of zero truncates gracefully to an
/// empty result. Any `Type` rule in the set is a usage error.
pub fn remap(node: &Value, rules: &MappingRuleSet, max_depth: usize) -> Result<Vec<Value>> {
    if !rules.is_name_based() {
        return Err(MappingError::NameBasedOnly);
    }
    if max_depth == 0 {
        return Ok(Vec::new());
    }

    let element_count = match node {
        Value::Array(items) => items.len(),
        _ => 1,
    };

    let mut output = Vec::with_capacity(element_count);
    for index in 0..element_count {
        let prefix = if node.is_array() {
            format!("/{}", index)
        } else {
            String::new()
        };

        let mut constructed = Value::Object(Map::new());
        for rule in rules.iter() {
            let pointer = format!("{}{}", prefix, to_pointer(rule.source_key()));
            let Some(source_value) = node.pointer(&pointer) else {
                trace!(pointer = %pointer, "source path not present, skipping rule");
                continue;
            };

            let dest_value = match (rule, source_value) {
                (MappingRule::Array { subrules, .. }, Value::Array(_)) => {
                    Value::Array(remap(source_value, subrules, max_depth - 1)?)
                }
                _ => Value::String(value_text(source_value)),
            };
            insert_at(&mut constructed, rule.dest_key(), dest_value)?;
        }
        output.push(constructed);
    }

    Ok(output)
}

/// Like [`remap`], but serializes the constructed objects as a JSON array.
pub fn remap_serialized(node: &Value, rules: &MappingRuleSet, max_depth: usize) -> Result<String> {
    let output = remap(node, rules, max_depth)?;
    Ok(serde_json::to_string(&Value::Array(output))?)
}

/// Textual form of a scalar source value. Strings pass through unquoted;
/// everything else is rendered as JSON text.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Insert `value` at the dot/bracket destination path, creating intermediate
/// nested maps. Writing through an already-scalar segment is an error.
fn insert_at(target: &mut Value, dest_path: &str, value: Value) -> Result<()> {
    let pointer = to_pointer(dest_path);
    let mut segments = pointer.split('/').skip(1).peekable();
    let mut current = target;

    while let Some(segment) = segments.next() {
        let map = current.as_object_mut().ok_or(MappingError::NoLeafField)?;
        if segments.peek().is_none() {
            map.insert(segment.to_string(), value);
            return Ok(());
        }
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    Ok(())
}
