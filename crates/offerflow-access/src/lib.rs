//! Access streams for OfferFlow.
//!
//! A provider pushes records for an offering into a shared master buffer;
//! any number of consumer sessions drain their own copy of the feed through
//! per-session buffers with idle-based expiry. Buffers are internally
//! synchronized: one producer and many consumers need no external locking.

pub mod filter;
pub mod manager;
pub mod queue;
pub mod session;

pub use filter::AccessFilter;
pub use manager::{AccessStreamManager, OfferingStream};
pub use queue::RecordQueue;
pub use session::SessionBuffer;
