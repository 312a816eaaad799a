//! Access-stream session management.
//!
//! One [`OfferingStream`] per offering: a master buffer fed by the provider
//! and a table of session buffers, each an independent copy-then-append view
//! of the feed. Session expiry is evaluated lazily on writes and accesses;
//! there is no background timer.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use offerflow_core::{session_key, AccessConfig, OfferingId, Record, SessionId, SubscriptionId};
use serde_json::Value;
use tracing::debug;

use crate::filter::AccessFilter;
use crate::queue::RecordQueue;
use crate::session::SessionBuffer;

/// Continuous-access state for one offering.
#[derive(Debug)]
pub struct OfferingStream {
    offering: OfferingId,
    master: RecordQueue,
    sessions: DashMap<String, Arc<SessionBuffer>>,
    session_timeout: Duration,
}

impl OfferingStream {
    fn new(offering: OfferingId, session_timeout: Duration) -> Self {
        Self {
            offering,
            master: RecordQueue::new(),
            sessions: DashMap::new(),
            session_timeout,
        }
    }

    /// Offering this stream belongs to.
    pub fn offering(&self) -> &OfferingId {
        &self.offering
    }

    /// Append a record to the master buffer and fan it out to every live
    /// session. JSON-array records are flattened one level.
    ///
    /// Expired sessions are evicted in a deterministic pass before any
    /// record is appended, so a write never interleaves removal with
    /// fan-out.
    pub fn enqueue(&self, record: Record) {
        self.evict_expired();

        let records = match record {
            Value::Array(items) => items,
            other => vec![other],
        };
        for record in records {
            for session in self.sessions.iter() {
                session.push(record.clone());
            }
            self.master.push(record);
        }
    }

    /// Get the session buffer for a subscription/session pair, creating or
    /// re-seeding it from the master buffer's current contents when absent
    /// or expired.
    pub fn session(
        &self,
        subscription_id: &SubscriptionId,
        session_id: &SessionId,
    ) -> Arc<SessionBuffer> {
        let key = session_key(subscription_id, session_id);
        if let Some(existing) = self.sessions.get(&key) {
            if !existing.is_expired() {
                return Arc::clone(&existing);
            }
        }

        debug!(offering = %self.offering, session = %key, "seeding session buffer from master");
        let seeded = Arc::new(SessionBuffer::seeded(
            self.master.snapshot(),
            self.session_timeout,
        ));
        self.sessions.insert(key, Arc::clone(&seeded));
        seeded
    }

    /// Drain a session: pop until empty, keeping each record if no filter is
    /// configured, the input data is empty, or the predicate accepts it.
    /// Returns the accumulated batch as a JSON array.
    pub fn drain(
        &self,
        subscription_id: &SubscriptionId,
        session_id: &SessionId,
        filter: Option<&dyn AccessFilter>,
        input_data: &HashMap<String, Value>,
    ) -> Value {
        let session = self.session(subscription_id, session_id);
        let mut batch = Vec::new();
        while let Some(record) = session.poll() {
            let keep = match filter {
                None => true,
                Some(_) if input_data.is_empty() => true,
                Some(predicate) => predicate.accept(
                    &self.offering,
                    &record,
                    input_data,
                    subscription_id.as_str(),
                    session_id.as_str(),
                ),
            };
            if keep {
                batch.push(record);
            }
        }
        Value::Array(batch)
    }

    /// Empty the master buffer and discard every session unconditionally.
    pub fn flush(&self) {
        self.master.clear();
        self.sessions.clear();
    }

    /// Number of records currently held in the master buffer.
    pub fn master_len(&self) -> usize {
        self.master.len()
    }

    /// Number of live (non-evicted) session buffers.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn evict_expired(&self) {
        // Sessions may be created concurrently, so counting via before/after
        // map sizes is not reliable; count inside the retain pass instead.
        let mut evicted = 0usize;
        self.sessions.retain(|_, session| {
            let expired = session.is_expired();
            if expired {
                evicted += 1;
            }
            !expired
        });
        if evicted > 0 {
            debug!(offering = %self.offering, evicted, "evicted expired session buffers");
        }
    }
}

/// Manager of access streams across offerings.
///
/// Master buffers are created lazily on first push or session request and
/// cleared only by explicit flush, never time-based.
#[derive(Debug, Default)]
pub struct AccessStreamManager {
    streams: DashMap<OfferingId, Arc<OfferingStream>>,
    config: AccessConfig,
}

impl AccessStreamManager {
    /// Manager with the default session timeout.
    pub fn new() -> Self {
        Self::with_config(AccessConfig::default())
    }

    /// Manager with an explicit configuration.
    pub fn with_config(config: AccessConfig) -> Self {
        Self {
            streams: DashMap::new(),
            config,
        }
    }

    /// Get or lazily create the stream for an offering.
    pub fn stream(&self, offering: &OfferingId) -> Arc<OfferingStream> {
        self.stream_with_timeout(offering, self.config.session_timeout)
    }

    /// Get or lazily create the stream for an offering with a per-offering
    /// session timeout. A zero timeout falls back to the configured default.
    pub fn stream_with_timeout(
        &self,
        offering: &OfferingId,
        session_timeout: Duration,
    ) -> Arc<OfferingStream> {
        let timeout = if session_timeout.is_zero() {
            self.config.session_timeout
        } else {
            session_timeout
        };
        Arc::clone(
            &self
                .streams
                .entry(offering.clone())
                .or_insert_with(|| Arc::new(OfferingStream::new(offering.clone(), timeout))),
        )
    }

    /// Enqueue a record for an offering. See [`OfferingStream::enqueue`].
    pub fn enqueue(&self, offering: &OfferingId, record: Record) {
        self.stream(offering).enqueue(record);
    }

    /// Drain a session for an offering. See [`OfferingStream::drain`].
    pub fn drain(
        &self,
        offering: &OfferingId,
        subscription_id: &SubscriptionId,
        session_id: &SessionId,
        filter: Option<&dyn AccessFilter>,
        input_data: &HashMap<String, Value>,
    ) -> Value {
        self.stream(offering)
            .drain(subscription_id, session_id, filter, input_data)
    }

    /// Flush one offering's stream.
    pub fn flush(&self, offering: &OfferingId) {
        if let Some(stream) = self.streams.get(offering) {
            stream.flush();
        }
    }

    /// Flush every offering's stream.
    pub fn flush_all(&self) {
        for stream in self.streams.iter() {
            stream.flush();
        }
    }
}
