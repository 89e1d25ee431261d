//! Response cache.
//!
//! Query results are memoized per (endpoint, arguments) for a TTL. The
//! clock is injectable so expiry can be tested without sleeping.

mod memory;
mod read;

pub use memory::{CacheKey, CacheStats, ResponseCache};
pub use read::CacheRead;
