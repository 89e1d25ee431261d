//! SKYFEED Core - shared data types for the NASA open data client
//!
//! Tables and cell values, query argument structs, the error taxonomy,
//! configuration, and the `Transport`/`Clock` seams used by the client.

pub mod clock;
pub mod config;
pub mod enums;
pub mod error;
pub mod query;
pub mod table;
pub mod transport;

pub use clock::*;
pub use config::*;
pub use enums::*;
pub use error::*;
pub use query::*;
pub use table::*;
pub use transport::*;
