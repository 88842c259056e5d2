//! Error type constants for logging.
//!
//! These constants provide consistent error classification across all crates.

/// Bad or missing shared secret on the admin API.
pub const ERROR_AUTHORIZATION: &str = "authorization";
/// Request body could not be parsed.
pub const ERROR_MALFORMED_REQUEST: &str = "malformed_request";
/// Network failure or unexpected status talking to a remote endpoint.
pub const ERROR_REMOTE_FETCH: &str = "remote_fetch";
/// Remote payload could not be decoded.
pub const ERROR_DECODE: &str = "decode";
/// Export sink rejected the payload or was unreachable.
pub const ERROR_EXPORT: &str = "export";
