//! Core types for OfferFlow.
//!
//! This crate defines the foundational abstractions shared by the mapping
//! and access-stream crates: offering/subscription/session identifiers,
//! the record-schema registry, and configuration defaults.

pub mod config;
pub mod ids;
pub mod schema;

/// A marketplace record. Records are opaque JSON values to the engines;
/// providers push them, consumers drain them.
pub type Record = serde_json::Value;

pub use config::AccessConfig;
pub use ids::{session_key, OfferingId, SessionId, SubscriptionId};
pub use schema::{
    FieldDescriptor, FieldType, ProjectedRecord, RecordSchema, SchemaBuilder, SchemaError,
    SchemaRegistry,
};
