use std::future::Future;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

use crate::error::Error;
use crate::order::Order;

/// How following an order ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Not active anymore, with the last fetched copy
    Finished(Order),

    /// Disappeared from the store
    Gone,

    /// Still active when the time ran out
    TimedOut,
}

/// Polls the order every `period` and calls `on_change` whenever its
/// status differs from the last one seen (the first fetch counts as a change)
///
/// There is no push from the store, the latest fetch is the truth.
/// Returns the last fetched order once it stops being active, or `None`
/// if it disappeared from the store. Fetch errors are logged and retried
/// on the next tick.
pub async fn track<F, Fut, N, NFut>(
    period: Duration,
    fetch: F,
    on_change: N,
) -> Option<Order>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<Order>, Error>>,
    N: FnMut(Order) -> NFut,
    NFut: Future<Output = ()>,
{
    follow(period, None, fetch, on_change).await
}

/// Like `track`, but gives up after `timeout`
///
/// `shown_status` is what the caller already displays, fetches still
/// carrying it don't count as a change.
pub async fn track_for<F, Fut, N, NFut>(
    timeout: Duration,
    period: Duration,
    shown_status: Option<String>,
    fetch: F,
    on_change: N,
) -> Outcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<Order>, Error>>,
    N: FnMut(Order) -> NFut,
    NFut: Future<Output = ()>,
{
    let following = follow(period, shown_status, fetch, on_change);
    match tokio::time::timeout(timeout, following).await {
        Ok(Some(order)) => Outcome::Finished(order),
        Ok(None) => Outcome::Gone,
        Err(_) => Outcome::TimedOut,
    }
}

async fn follow<F, Fut, N, NFut>(
    period: Duration,
    mut last_status: Option<String>,
    mut fetch: F,
    mut on_change: N,
) -> Option<Order>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<Order>, Error>>,
    N: FnMut(Order) -> NFut,
    NFut: Future<Output = ()>,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let order = match fetch().await {
            Ok(Some(order)) => order,
            Ok(None) => {
                log::warn!("tracked order is gone");
                return None
            }
            Err(e) => {
                log::warn!("could not fetch tracked order: {e}");
                continue
            }
        };

        let active = order.is_active();
        if last_status.as_deref() != Some(order.status.as_str()) {
            log::debug!("tracked order {} is now {}", order.id, order.status);
            last_status = Some(order.status.clone());
            if !active {
                on_change(order.clone()).await;
                return Some(order)
            }
            on_change(order).await;
        } else if !active {
            return Some(order)
        }
    }
}
