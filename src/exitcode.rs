/// Exit codes of the readstash CLI, following the BSD sysexits convention.
///
/// Successful termination
pub const SUCCESS: i32 = 0;

/// Command line usage error: invalid arguments, unreadable config, etc.
pub const USAGE: i32 = 64;

/// The import ran but its report is a failure (no file, malformed or empty file)
pub const IMPORT_FAILED: i32 = 65;

/// Database or other runtime failure
pub const SOFTWARE: i32 = 70;
