//! exit codes for showfor commands
//!
//! these follow Unix conventions where 0 = success and non-zero = error
//! specific codes help scripts distinguish between failure types

/// command completed successfully
pub const SUCCESS: i32 = 0;

/// general or unknown error
pub const ERROR: i32 = 1;

/// invalid command-line arguments
pub const INVALID_ARGS: i32 = 2;

/// configuration file error
pub const CONFIG_ERROR: i32 = 3;

/// content file could not be read or written
pub const CONTENT_ERROR: i32 = 4;

/// rules hide the element (only with `check --exit-code`)
pub const FILTERED: i32 = 5;
