//! Offering data transformation for OfferFlow.
//!
//! This crate reshapes arbitrary nested JSON response trees into the record
//! shapes a consumer asked for. Two engines do the work:
//!
//! - the **remap engine** ([`remap`]) applies name-based rules recursively
//!   to a JSON node, producing one constructed object per input element;
//! - the **projection engine** ([`project`]) populates a schema-described
//!   record from a JSON object, coercing scalars to declared field types.
//!
//! [`RecordMapper`] dispatches between the two based on the effective rule
//! set (explicit rules merged with rules inferred from semantic tags).

pub mod deserialize;
pub mod error;
pub mod mapper;
pub mod project;
pub mod remap;
pub mod rule;

pub use deserialize::deserialize_record;
pub use error::MappingError;
pub use mapper::{RecordMapper, RecordOutcome, DEFAULT_MAX_MAPPING_DEPTH};
pub use project::{project_batch, project_record, type_lookup};
pub use remap::{remap, remap_serialized};
pub use rule::{MappingRule, MappingRuleSet, RESERVED_KEY_PREFIX};
