use migration::{Migrator, MigratorTrait};

use crate::{config::Config, prelude::*, sv};

pub struct AppState {
  pub db: DatabaseConnection,
  pub config: Config,
  pub rule_cache: sv::RuleCache,
}

impl AppState {
  pub async fn new(config: Config) -> anyhow::Result<Self> {
    let db = Database::connect(&config.database_url).await?;
    Migrator::up(&db, None).await?;

    info!("Database ready at {}", config.database_url);

    let rule_cache = sv::RuleCache::new(config.rule_cache_ttl);
    Ok(Self { db, config, rule_cache })
  }

  pub fn visibility(&self) -> sv::Visibility<'_> {
    sv::Visibility::new(&self.db)
      .with_limits(self.config.team_lead_level, self.config.hierarchy_max_depth)
  }

  pub fn rules(&self) -> sv::Rules<'_> {
    sv::Rules::new(&self.db).with_cache(Some(&self.rule_cache))
  }

  pub fn deals(&self) -> sv::Deals<'_> {
    sv::Deals::new(&self.db).with_rule_cache(&self.rule_cache)
  }
}
