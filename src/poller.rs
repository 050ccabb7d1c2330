use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use spdlog::debug;

use crate::error::{Error, Result};
use crate::site::LiveSite;

#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Periodically checks the posts directory and refreshes the live site.
pub struct Poller {
    site: Arc<LiveSite>,
    interval: Duration,
    stop: StopHandle,
}

impl Poller {
    pub fn new(site: Arc<LiveSite>, interval: Duration) -> Poller {
        Poller {
            site,
            interval,
            stop: StopHandle::default(),
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Runs until stopped. The first failed refresh ends the loop with its error.
    pub async fn run(self) -> Result<()> {
        while !self.stop.is_stopped() {
            tokio::time::sleep(self.interval).await;
            if self.stop.is_stopped() {
                break;
            }

            // Walking and hashing every post blocks, keep it off the server threads
            let site = self.site.clone();
            let refreshed = tokio::task::spawn_blocking(move || site.refresh())
                .await
                .map_err(Error::RefreshAborted)??;
            if !refreshed {
                debug!("No changes in posts");
            }
        }

        Ok(())
    }
}
