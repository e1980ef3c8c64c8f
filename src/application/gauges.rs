//! Periodic refresh of the `links_total` and `click_queue_depth` gauges.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, warn};

use crate::application::services::LinkService;
use crate::domain::click_worker::{ClickSender, shutdown_requested};
use crate::domain::repositories::LinkRepository;

/// Spawns the gauge task.
///
/// It stops as soon as `shutdown` flips to `true`, abandoning a refresh
/// that is still waiting on the database.
pub fn spawn_gauge_refresh<L>(
    link_service: Arc<LinkService<L>>,
    click_sender: ClickSender,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    L: LinkRepository + ?Sized + 'static,
{
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let stop = shutdown_requested(&mut shutdown);
        tokio::pin!(stop);

        loop {
            tokio::select! {
                _ = &mut stop => break,
                _ = async {
                    ticker.tick().await;
                    refresh(&link_service, &click_sender).await;
                } => {}
            }
        }

        debug!("Gauge refresh stopped");
    })
}

async fn refresh<L>(link_service: &LinkService<L>, click_sender: &ClickSender)
where
    L: LinkRepository + ?Sized,
{
    metrics::gauge!("click_queue_depth").set(click_sender.queued() as f64);

    match link_service.count_all().await {
        Ok(count) => metrics::gauge!("links_total").set(count as f64),
        Err(e) => warn!(error = %e, "Failed to refresh links_total"),
    }
}
