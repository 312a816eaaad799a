//! Mapping rules and rule sets.

use offerflow_core::RecordSchema;
use serde::{Deserialize, Serialize};

use crate::error::{MappingError, Result};

/// Rule keys starting with this prefix are reserved for internal use.
pub const RESERVED_KEY_PREFIX: &str = "__";

/// A declarative mapping instruction.
///
/// `Name` and `Array` rules map a source path to a destination path by
/// structure; `Type` rules map a semantic tag to a destination field. A rule
/// set never mixes the two kinds — the engines enforce this lazily with
/// their own checks (see [`MappingError`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MappingRule {
    /// Copy the value at `source_path` to `dest_path`.
    Name {
        /// Dot/bracket source path, e.g. `geos[0].latitude`.
        source_path: String,
        /// Dot-separated destination path.
        dest_path: String,
    },

    /// Remap each element of the array at `source_path` with `subrules`,
    /// inserting the nested result at `dest_path`.
    Array {
        source_path: String,
        dest_path: String,
        subrules: MappingRuleSet,
    },

    /// Map the source field tagged `source_tag` to `dest_field`.
    Type {
        /// Semantic tag identifying the source field.
        source_tag: String,
        /// Destination field name in the target record.
        dest_field: String,
    },
}

impl MappingRule {
    /// Source key of this rule (path or tag).
    pub fn source_key(&self) -> &str {
        match self {
            MappingRule::Name { source_path, .. } => source_path,
            MappingRule::Array { source_path, .. } => source_path,
            MappingRule::Type { source_tag, .. } => source_tag,
        }
    }

    /// Destination key of this rule (path or field).
    pub fn dest_key(&self) -> &str {
        match self {
            MappingRule::Name { dest_path, .. } => dest_path,
            MappingRule::Array { dest_path, .. } => dest_path,
            MappingRule::Type { dest_field, .. } => dest_field,
        }
    }

    fn validate_keys(&self) -> Result<()> {
        for key in [self.source_key(), self.dest_key()] {
            if key.is_empty() {
                return Err(MappingError::EmptyKey);
            }
            if key.starts_with(RESERVED_KEY_PREFIX) {
                return Err(MappingError::ReservedKey(key.to_string()));
            }
        }
        if let MappingRule::Array { subrules, .. } = self {
            for rule in subrules.iter() {
                rule.validate_keys()?;
            }
        }
        Ok(())
    }
}

/// Ordered, homogeneous list of mapping rules.
///
/// Serializes as a plain JSON array of rules. Deserialization runs the same
/// key validation as [`MappingRuleSet::new`], so a rule set arriving over
/// the wire cannot bypass the fail-fast checks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<MappingRule>", into = "Vec<MappingRule>")]
pub struct MappingRuleSet {
    rules: Vec<MappingRule>,
}

impl TryFrom<Vec<MappingRule>> for MappingRuleSet {
    type Error = MappingError;

    fn try_from(rules: Vec<MappingRule>) -> Result<Self> {
        Self::new(rules)
    }
}

impl From<MappingRuleSet> for Vec<MappingRule> {
    fn from(set: MappingRuleSet) -> Self {
        set.rules
    }
}

impl MappingRuleSet {
    /// Build a rule set, failing fast on empty or reserved-prefix keys.
    pub fn new(rules: Vec<MappingRule>) -> Result<Self> {
        for rule in &rules {
            rule.validate_keys()?;
        }
        Ok(Self { rules })
    }

    /// The empty rule set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rule set inferred from a schema's semantic-tag annotations: one
    /// `Type` rule per tagged field.
    pub fn from_schema_tags(schema: &RecordSchema) -> Self {
        let rules = schema
            .tagged_fields()
            .filter_map(|fd| {
                fd.semantic_tag.as_ref().map(|tag| MappingRule::Type {
                    source_tag: tag.clone(),
                    dest_field: fd.name.clone(),
                })
            })
            .collect();
        Self { rules }
    }

    /// Effective rule set: schema-inferred rules followed by explicit ones.
    pub fn merged(schema: &RecordSchema, explicit: &MappingRuleSet) -> Self {
        let mut rules = Self::from_schema_tags(schema).rules;
        rules.extend(explicit.rules.iter().cloned());
        Self { rules }
    }

    /// Whether every rule is a `Name` or `Array` rule.
    pub fn is_name_based(&self) -> bool {
        self.rules
            .iter()
            .all(|r| matches!(r, MappingRule::Name { .. } | MappingRule::Array { .. }))
    }

    /// Whether every rule is a `Type` rule.
    pub fn is_type_based(&self) -> bool {
        self.rules.iter().all(|r| matches!(r, MappingRule::Type { .. }))
    }

    /// Whether the set contains no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Iterate over the rules in order.
    pub fn iter(&self) -> std::slice::Iter<'_, MappingRule> {
        self.rules.iter()
    }

    /// First rule, if any. Used by the dispatcher to pick an engine.
    pub fn first(&self) -> Option<&MappingRule> {
        self.rules.first()
    }
}
