use std::{env, str::FromStr};

use crate::prelude::*;

#[derive(Debug, Clone)]
pub struct Config {
  pub database_url: String,
  pub port: u16,
  /// How long the active rules of a pay plan stay memoised.
  pub rule_cache_ttl: Duration,
  /// Role level from which team scope covers the whole downline instead of
  /// direct reports only.
  pub team_lead_level: i32,
  pub hierarchy_max_depth: usize,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      database_url: "sqlite:backoffice.db?mode=rwc".into(),
      port: 3000,
      rule_cache_ttl: Duration::from_secs(5 * 60),
      team_lead_level: 2,
      hierarchy_max_depth: 64,
    }
  }
}

impl Config {
  pub fn from_env() -> Result<Self> {
    let default = Self::default();

    let rule_cache_ttl = match env::var("RULE_CACHE_TTL") {
      Ok(raw) => humantime::parse_duration(raw.trim()).map_err(|err| {
        Error::Config(format!("RULE_CACHE_TTL `{raw}`: {err}"))
      })?,
      Err(_) => default.rule_cache_ttl,
    };

    Ok(Self {
      database_url: env::var("DATABASE_URL")
        .unwrap_or(default.database_url),
      port: parse_var("PORT", default.port)?,
      rule_cache_ttl,
      team_lead_level: parse_var("TEAM_LEAD_LEVEL", default.team_lead_level)?,
      hierarchy_max_depth: parse_var(
        "HIERARCHY_MAX_DEPTH",
        default.hierarchy_max_depth,
      )?,
    })
  }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match env::var(name) {
    Ok(raw) => raw
      .trim()
      .parse()
      .map_err(|err| Error::Config(format!("{name} `{raw}`: {err}"))),
    Err(_) => Ok(default),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_var_falls_back_to_default() {
    let port: u16 = parse_var("BACKOFFICE_TEST_UNSET_PORT", 4242).unwrap();
    assert_eq!(port, 4242);
  }

  #[test]
  fn test_rule_cache_ttl_accepts_humantime() {
    let ttl = humantime::parse_duration("90s").unwrap();
    assert_eq!(ttl, Duration::from_secs(90));
  }
}
