//! CLI Exit Code Registry
//!
//! Single source of truth for `haul` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified)                          |
//! | 2    | Usage error (bad arguments, bad config file)         |
//! | 3    | Schema validation: required columns not found        |
//! | 4    | Input could not be loaded or parsed                  |
//! | 5    | Export failed                                        |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unreadable or invalid config.
pub const EXIT_USAGE: u8 = 2;

/// One or more required fields matched no header.
/// The message lists the missing field labels.
pub const EXIT_SCHEMA: u8 = 3;

/// Input file missing, unsupported, too large, or malformed.
pub const EXIT_LOAD: u8 = 4;

/// Writing the output file failed.
pub const EXIT_EXPORT: u8 = 5;
