//! Per-user traffic ledger.
//!
//! Tracks cumulative bytes, online session counts and pending kicks for
//! every user. All three maps live behind one lock so operations that touch
//! more than one of them are observed atomically.

use std::collections::{HashMap, HashSet};
use std::future::Future;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use trojan_core::TrafficLogger;

/// Cumulative traffic of a single user since the last clear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficEntry {
    /// Bytes sent by the user.
    pub tx: u64,
    /// Bytes received by the user.
    pub rx: u64,
}

impl TrafficEntry {
    /// Create an entry with the given totals.
    #[inline]
    pub fn new(tx: u64, rx: u64) -> Self {
        Self { tx, rx }
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.tx == 0 && self.rx == 0
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    traffic: HashMap<String, TrafficEntry>,
    online: HashMap<String, i64>,
    kicked: HashSet<String>,
    /// Bumped on every full clear of `traffic`.
    generation: u64,
}

/// Thread-safe per-user traffic ledger.
///
/// Construct one per process and share it behind an `Arc` with the proxy
/// hooks, the admin API and the exporters.
#[derive(Debug, Default)]
pub struct TrafficLedger {
    state: RwLock<LedgerState>,
    /// Held for a whole export so two exports never carry the same batch.
    export_lock: Mutex<()>,
}

impl TrafficLedger {
    /// Create a new empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Account traffic to a user.
    ///
    /// If the user has a pending kick, the kick is consumed, the deltas are
    /// dropped and `false` is returned so the caller closes the connection.
    pub fn record_traffic(&self, user_id: &str, tx: u64, rx: u64) -> bool {
        let mut state = self.state.write();

        if state.kicked.remove(user_id) {
            return false;
        }

        match state.traffic.get_mut(user_id) {
            Some(entry) => {
                entry.tx = entry.tx.saturating_add(tx);
                entry.rx = entry.rx.saturating_add(rx);
            }
            None => {
                state
                    .traffic
                    .insert(user_id.to_owned(), TrafficEntry::new(tx, rx));
            }
        }
        true
    }

    /// Increment or decrement the online session count of a user.
    ///
    /// Counts never go below zero; a user whose count reaches zero is
    /// removed from the online map.
    pub fn set_online(&self, user_id: &str, online: bool) {
        let mut state = self.state.write();

        if online {
            *state.online.entry(user_id.to_owned()).or_insert(0) += 1;
            return;
        }

        let gone = match state.online.get_mut(user_id) {
            Some(count) => {
                *count -= 1;
                *count <= 0
            }
            None => false,
        };
        if gone {
            state.online.remove(user_id);
        }
    }

    /// Copy the current totals, optionally clearing them in the same
    /// critical section.
    ///
    /// Any traffic recorded after a clearing call returns shows up in the
    /// next snapshot.
    pub fn snapshot(&self, clear: bool) -> HashMap<String, TrafficEntry> {
        if clear {
            let mut state = self.state.write();
            state.generation = state.generation.wrapping_add(1);
            std::mem::take(&mut state.traffic)
        } else {
            self.state.read().traffic.clone()
        }
    }

    /// Hand the current totals to `export` and clear them once it succeeds.
    ///
    /// The totals are copied under the lock and the lock is released while
    /// the export future runs, so a slow sink never blocks
    /// [`record_traffic`](Self::record_traffic). On success the exported
    /// amounts are subtracted from the live entries, keeping whatever was
    /// recorded in the meantime. If [`snapshot(true)`](Self::snapshot)
    /// cleared the ledger while the export was in flight nothing is
    /// subtracted. On failure the ledger is left untouched and the same
    /// totals are offered again on the next call.
    ///
    /// Concurrent calls are serialized: a second export waits until the
    /// first one has settled and then exports only what is left.
    ///
    /// Returns the number of exported users. An empty ledger returns `Ok(0)`
    /// without calling `export`.
    pub async fn export_and_clear<F, Fut, E>(&self, export: F) -> Result<usize, E>
    where
        F: FnOnce(&HashMap<String, TrafficEntry>) -> Fut,
        Fut: Future<Output = Result<(), E>>,
    {
        let _export = self.export_lock.lock().await;

        let (batch, generation) = {
            let state = self.state.read();
            if state.traffic.is_empty() {
                return Ok(0);
            }
            (state.traffic.clone(), state.generation)
        };

        export(&batch).await?;

        self.settle(&batch, generation);
        Ok(batch.len())
    }

    /// Subtract an exported batch from the live totals.
    fn settle(&self, exported: &HashMap<String, TrafficEntry>, generation: u64) {
        let mut state = self.state.write();
        if state.generation != generation {
            return;
        }

        for (user_id, sent) in exported {
            let drained = match state.traffic.get_mut(user_id) {
                Some(live) => {
                    live.tx = live.tx.saturating_sub(sent.tx);
                    live.rx = live.rx.saturating_sub(sent.rx);
                    live.is_zero()
                }
                None => false,
            };
            if drained {
                state.traffic.remove(user_id);
            }
        }
    }

    /// Mark a user to be disconnected on its next traffic record.
    pub fn kick(&self, user_id: &str) {
        self.state.write().kicked.insert(user_id.to_owned());
    }

    /// Mark several users at once.
    pub fn kick_many<I, S>(&self, user_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.state.write();
        state.kicked.extend(user_ids.into_iter().map(Into::into));
    }

    /// Check whether a kick is pending for a user.
    pub fn is_kicked(&self, user_id: &str) -> bool {
        self.state.read().kicked.contains(user_id)
    }

    /// Copy the online session counts.
    pub fn online_snapshot(&self) -> HashMap<String, i64> {
        self.state.read().online.clone()
    }

    /// Check if no traffic has been recorded since the last clear.
    pub fn is_empty(&self) -> bool {
        self.state.read().traffic.is_empty()
    }
}

impl TrafficLogger for TrafficLedger {
    #[inline]
    fn log_traffic(&self, user_id: &str, tx: u64, rx: u64) -> bool {
        self.record_traffic(user_id, tx, rx)
    }

    #[inline]
    fn log_online_state(&self, user_id: &str, online: bool) {
        self.set_online(user_id, online);
    }
}
