use std::time::Duration;

use tokio::time;
use tracing::info;

use crate::state::SharedHub;

/// Periodically drops sessions whose socket writer is gone without the
/// reader ever reporting a disconnect.
pub async fn task(hub: SharedHub, every: Duration) {
    let mut tick = time::interval(every);
    tick.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
    loop {
        tick.tick().await;
        let swept = hub.lock().await.sweep();
        if swept > 0 {
            info!(swept, "swept dead sessions");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Limits, state};
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn sweeper_reaps_closed_sessions() {
        let hub = state::shared(Limits::default());
        {
            let (tx, rx) = mpsc::unbounded_channel();
            hub.lock().await.connect("s1", tx);
            drop(rx);
        }
        let handle = tokio::spawn(task(hub.clone(), Duration::from_secs(5)));
        time::sleep(Duration::from_secs(6)).await;
        assert_eq!(hub.lock().await.session_count(), 0);
        handle.abort();
    }
}
