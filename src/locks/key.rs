//! Lock key derivation.
//!
//! Keys are `prefix + md5(command line)` unless an explicit key is given.
//! MD5 keeps key names identical to the shell `cronlock` tool, so both can
//! guard the same jobs during a migration.

use md5::{Digest, Md5};

/// The command line as a single space-joined string.
pub fn command_line(command: &[String]) -> String {
    command.join(" ")
}

/// Lowercase hex MD5 digest of a command line.
pub fn command_hash(line: &str) -> String {
    Md5::digest(line.as_bytes())
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Compute the Redis key guarding `command`.
///
/// # Arguments
///
/// * `prefix` - Prefix for every key (e.g. `cronlock.`)
/// * `explicit` - Key to use instead of hashing the command line
/// * `command` - Program name followed by its arguments
pub fn compute_key(prefix: &str, explicit: Option<&str>, command: &[String]) -> String {
    match explicit {
        Some(key) => format!("{}{}", prefix, key),
        None => format!("{}{}", prefix, command_hash(&command_line(command))),
    }
}
