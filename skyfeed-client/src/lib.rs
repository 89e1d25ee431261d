//! SKYFEED Client - NASA open data queries over HTTP
//!
//! A [`SkyfeedConnection`] owns a retrying [`Session`], a TTL
//! [`ResponseCache`], and one query method per endpoint. Results come back
//! as [`Table`](skyfeed_core::Table)s.

pub mod cache;
pub mod connection;
pub mod endpoints;
pub mod http;
pub mod session;

pub use cache::{CacheKey, CacheRead, CacheStats, ResponseCache};
pub use connection::SkyfeedConnection;
pub use http::ReqwestTransport;
pub use session::Session;

// Re-export core types for convenience
pub use skyfeed_core::{
    ApodQuery, ClientConfig, Endpoint, ExoplanetFormat, ExoplanetQuery, FailureKind,
    NeoFeedQuery, QueryOutput, RetryPolicy, Rover, RoverPhotosQuery, SkyfeedError,
    SkyfeedResult, SpaceWeatherKind, SpaceWeatherQuery, Table, Value,
};
