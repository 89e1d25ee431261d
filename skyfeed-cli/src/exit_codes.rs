//! Process exit codes.

pub const SUCCESS: u8 = 0;

/// The query ran but produced no result (network, status or parse failure).
pub const NO_RESULT: u8 = 1;

/// Configuration missing or invalid.
pub const CONFIG_ERROR: u8 = 2;
