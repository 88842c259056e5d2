//! Background traffic and system status reporters.
//!
//! Push ledger totals and host status to the panel at their configured
//! intervals until the shutdown token is cancelled.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use trojan_stats::{StatusPusher, SystemSampler, TrafficLedger, TrafficPusher};

/// Run the traffic export loop.
///
/// Failed pushes keep their totals in the ledger for the next tick. One
/// last push is attempted on shutdown so a restart doesn't drop traffic.
pub async fn run_traffic_reporter(
    pusher: TrafficPusher,
    ledger: Arc<TrafficLedger>,
    interval: Duration,
    shutdown: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                debug!("traffic reporter shutting down");
                push_traffic(&pusher, &ledger).await;
                return;
            }

            _ = ticker.tick() => {
                push_traffic(&pusher, &ledger).await;
            }
        }
    }
}

async fn push_traffic(pusher: &TrafficPusher, ledger: &TrafficLedger) {
    match pusher.push(ledger).await {
        Ok(0) => {}
        Ok(users) => debug!(users, url = %pusher.url(), "traffic report sent"),
        Err(e) => {
            warn!(error = %e, kind = e.error_type(), url = %pusher.url(), "traffic report failed, keeping totals");
        }
    }
}

/// Run the system status export loop.
pub async fn run_status_reporter(
    pusher: StatusPusher,
    interval: Duration,
    shutdown: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut sampler = SystemSampler::new();

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                debug!("status reporter shutting down");
                return;
            }

            _ = ticker.tick() => {
                // sysinfo refreshes and disk enumeration block on procfs reads.
                let sampled = tokio::task::spawn_blocking(move || {
                    let status = sampler.sample();
                    (sampler, status)
                })
                .await;
                match sampled {
                    Ok((returned, status)) => {
                        sampler = returned;
                        if let Err(e) = pusher.push(&status).await {
                            warn!(error = %e, kind = e.error_type(), url = %pusher.url(), "status report failed");
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "system sampling task failed");
                        sampler = SystemSampler::new();
                    }
                }
            }
        }
    }
}
