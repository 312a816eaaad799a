//! Per-record drain filtering.

use std::collections::HashMap;

use offerflow_core::{OfferingId, Record};
use serde_json::Value;

/// Predicate deciding whether a drained record is delivered to a session.
///
/// Invoked as `(offering, record, input_data, subscription_id, session_id)`.
/// Rejected records are discarded, not re-queued.
pub trait AccessFilter: Send + Sync {
    fn accept(
        &self,
        offering: &OfferingId,
        record: &Record,
        input_data: &HashMap<String, Value>,
        subscription_id: &str,
        session_id: &str,
    ) -> bool;
}

impl<F> AccessFilter for F
where
    F: Fn(&OfferingId, &Record, &HashMap<String, Value>, &str, &str) -> bool + Send + Sync,
{
    fn accept(
        &self,
        offering: &OfferingId,
        record: &Record,
        input_data: &HashMap<String, Value>,
        subscription_id: &str,
        session_id: &str,
    ) -> bool {
        self(offering, record, input_data, subscription_id, session_id)
    }
}
