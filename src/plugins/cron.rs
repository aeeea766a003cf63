use std::sync::Arc;

use async_trait::async_trait;

use crate::{plugins::Plugin, prelude::*, state::AppState};

/// Drops expired pay-plan rule sets from the rule cache.
pub struct RuleCacheGc;

#[async_trait]
impl Plugin for RuleCacheGc {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let period = app.config.rule_cache_ttl.max(Duration::from_secs(1));
    info!(
      "Rule cache GC started (interval: {})",
      humantime::format_duration(period)
    );

    let mut interval = tokio::time::interval(period);
    // first tick fires immediately, nothing to purge yet
    interval.tick().await;

    loop {
      interval.tick().await;

      let purged = app.rule_cache.purge_expired();
      if purged > 0 {
        let left = app.rule_cache.len();
        debug!("Purged {} expired rule sets, {} left", purged, left);
      }
    }
  }
}
