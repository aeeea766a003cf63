use crate::entity::{CommissionStatus, OverrideSource};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("database: {0}")]
  Db(#[from] sea_orm::DbErr),
  #[error("person not found")]
  PersonNotFound,
  #[error("deal not found")]
  DealNotFound,
  #[error("commission not found")]
  CommissionNotFound,
  #[error("rule not found")]
  RuleNotFound,
  #[error("pay plan not found")]
  PayPlanNotFound,
  #[error("invalid rule: {0}")]
  InvalidRule(String),
  #[error("invalid arguments: {0}")]
  InvalidArgs(String),
  #[error("assignment would create a cycle in the {0} chain")]
  HierarchyCycle(OverrideSource),
  #[error("cannot {action} a {from} commission")]
  InvalidTransition { from: CommissionStatus, action: &'static str },
  #[error("unknown or missing actor")]
  Unauthorized,
  #[error("forbidden")]
  Forbidden,
  #[error("config: {0}")]
  Config(String),
}
