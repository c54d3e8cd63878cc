//! Framework-independent query cache.
//!
//! UI bindings (signals, effects) live next to the data they serve and
//! subscribe to this cache; they never own cached values themselves.

pub mod cache;
pub mod key;

pub use cache::{FetchDecision, FetchTicket, QueryCache, QueryEntry, QueryError, QueryStatus};
pub use key::QueryKey;
