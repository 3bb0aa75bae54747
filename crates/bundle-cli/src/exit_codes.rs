//! Exit codes of the `bundle` binary. Part of the public contract.

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_INVALID_BUNDLE: i32 = 1; // Input is corrupt, foreign or over a decode limit
pub const EXIT_CONFIG_ERROR: i32 = 2; // Usage, config or I/O error
