//! Data-acquisition pipeline.
//!
//! Sits between an inbound data request and the set of possible data
//! producers: rate-limits clients, serves a TTL cache, and falls back
//! through an ordered source chain, degrading to stale cached data when
//! everything upstream is broken.

pub mod cache;
pub mod normalize;
pub mod orchestrator;
pub mod rate_limit;
pub mod sources;

pub use cache::{CacheEntry, TtlCache};
pub use normalize::normalize;
pub use orchestrator::Orchestrator;
pub use rate_limit::{Admission, RateLimiter};
pub use sources::{ApiSource, FileSource, Producer, ScrapeSource, SourceChain, SyntheticSource};
