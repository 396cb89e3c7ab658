//! API-level constants.

/// Prefix of every temp file the relay creates in the staging directory.
pub const STAGED_FILE_PREFIX: &str = "mediarelay-";

/// Byte budget for the sanitized file name in a temp file's suffix. With the prefix,
/// six random characters and the separator the temp name stays well under the
/// 255-byte limit of common filesystems.
pub const MAX_STAGED_NAME_BYTES: usize = 180;

/// Longest extension kept intact when a staged name is shortened.
pub const MAX_STAGED_EXTENSION_BYTES: usize = 16;

pub const REQUEST_ID_HEADER: &str = "X-Request-ID";
