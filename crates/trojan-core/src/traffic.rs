//! Connection hooks for per-user accounting.

use std::sync::Arc;

/// Hook invoked by the proxy on per-connection events.
///
/// Implementations must be thread-safe (`Send + Sync`) as they are called
/// concurrently from every connection task.
pub trait TrafficLogger: Send + Sync {
    /// Account `tx`/`rx` bytes to `user_id`.
    ///
    /// Returns `false` when the connection should be closed instead. The
    /// bytes are not accounted in that case.
    fn log_traffic(&self, user_id: &str, tx: u64, rx: u64) -> bool;

    /// Record a session of `user_id` going online or offline.
    fn log_online_state(&self, user_id: &str, online: bool);
}

impl<T: TrafficLogger + ?Sized> TrafficLogger for Arc<T> {
    #[inline]
    fn log_traffic(&self, user_id: &str, tx: u64, rx: u64) -> bool {
        (**self).log_traffic(user_id, tx, rx)
    }

    #[inline]
    fn log_online_state(&self, user_id: &str, online: bool) {
        (**self).log_online_state(user_id, online)
    }
}

impl<T: TrafficLogger + ?Sized> TrafficLogger for Box<T> {
    #[inline]
    fn log_traffic(&self, user_id: &str, tx: u64, rx: u64) -> bool {
        (**self).log_traffic(user_id, tx, rx)
    }

    #[inline]
    fn log_online_state(&self, user_id: &str, online: bool) {
        (**self).log_online_state(user_id, online)
    }
}
