//! CLI command implementations
//!
//! Every command returns the process exit code:
//!
//! - `0` success
//! - `1` a bootstrap stage failed
//! - `2` configuration error
//! - `5` fatal error

pub mod generate_ids;
pub mod init;
pub mod run;
pub mod validate;

/// Process exit codes
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const STAGE_FAILED: i32 = 1;
    pub const CONFIGURATION: i32 = 2;
    pub const FATAL: i32 = 5;
}
