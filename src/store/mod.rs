//! Event persistence boundary.
//!
//! The operations only depend on the `EventStore` trait; the SQLite
//! implementation below is one way to satisfy it. Each method is a single
//! logical read or write, so per-statement isolation from the backing
//! store is all the concurrency handling required.

mod sqlite_store;

pub use sqlite_store::SqliteEventStore;

use crate::db::DbResult;
use crate::models::event::{Event, NewEvent};

pub trait EventStore {
    /// Persists one event and returns its assigned id.
    fn create(&self, event: NewEvent) -> DbResult<String>;

    /// Returns events with `start_time` in the inclusive `[start, end]`
    /// bounds (either side optional), optionally filtered to events whose
    /// stored people string contains every requested name. Ordered
    /// ascending by `start_time`.
    fn query(
        &self,
        start: Option<&str>,
        end: Option<&str>,
        people: Option<&[String]>,
    ) -> DbResult<Vec<Event>>;

    /// Deletes events with `start_time` in `[start, end]` inclusive and
    /// returns how many were removed.
    fn delete_range(&self, start: &str, end: &str) -> DbResult<usize>;

    /// Deletes every event and returns the prior total.
    fn delete_all(&self) -> DbResult<usize>;
}
