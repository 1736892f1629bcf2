//! An in-memory bounded cache with W-TinyLFU admission.
//!
//! New entries pass through a small recency window; leaving it, they must
//! out-score the coldest resident of a segmented LRU in an approximate
//! frequency contest (4-bit Count-Min sketch, gated by a Bloom-filter
//! doorkeeper) to earn a place in the main stage.  Retention therefore
//! favors keys whose recent popularity is demonstrably higher than that of
//! whatever they would displace.
//!
//! [`Cache`] is the single-threaded core; [`SyncCache`] wraps it in a mutex
//! for shared use.

mod cache;
mod error;
mod item;
mod metrics;
mod policy;
mod sync;

pub use cache::Cache;
pub use error::InvariantError;
pub use item::Item;
pub use metrics::stats::Stats;
pub use sync::SyncCache;
