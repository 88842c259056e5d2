//! Default value functions for serde deserialization.
//!
//! These functions forward to constants defined in `trojan_core::defaults`.

use trojan_core::defaults;

/// Generate default value functions that forward to trojan_core::defaults constants.
macro_rules! default_fns {
    // For Copy types (integers, bool, etc.)
    ($($fn_name:ident => $const_name:ident : $ty:ty),* $(,)?) => {
        $(
            pub(crate) fn $fn_name() -> $ty {
                defaults::$const_name
            }
        )*
    };
}

/// Generate default value functions that return String from &str constants.
macro_rules! default_string_fns {
    ($($fn_name:ident => $const_name:ident),* $(,)?) => {
        $(
            pub(crate) fn $fn_name() -> String {
                defaults::$const_name.to_string()
            }
        )*
    };
}

default_fns! {
    default_directory_interval_secs => DEFAULT_DIRECTORY_INTERVAL_SECS: u64,
    default_traffic_interval_secs   => DEFAULT_TRAFFIC_PUSH_INTERVAL_SECS: u64,
    default_status_interval_secs    => DEFAULT_STATUS_PUSH_INTERVAL_SECS: u64,
    default_watch_interval_secs     => DEFAULT_CONFIG_WATCH_INTERVAL_SECS: u64,
    default_http_timeout_secs       => DEFAULT_HTTP_TIMEOUT_SECS: u64,
    default_shutdown_timeout_secs   => DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64,
}

default_string_fns! {
    default_stats_listen => DEFAULT_STATS_LISTEN,
}
