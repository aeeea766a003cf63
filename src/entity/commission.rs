use std::fmt;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::deal;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum CommissionStatus {
  #[sea_orm(string_value = "pending")]
  #[default]
  Pending,
  #[sea_orm(string_value = "approved")]
  Approved,
  #[sea_orm(string_value = "paid")]
  Paid,
  #[sea_orm(string_value = "void")]
  Void,
}

impl fmt::Display for CommissionStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Pending => "pending",
      Self::Approved => "approved",
      Self::Paid => "paid",
      Self::Void => "void",
    })
  }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "commissions")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub deal_id: i32,
  pub person_id: i32,
  pub rule_id: Option<i32>,
  /// Rule type name, or `override_<level>` for overrides.
  pub commission_type: String,
  pub amount: Decimal,
  pub status: CommissionStatus,
  pub status_reason: Option<String>,
  pub created_at: DateTime,
  pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "deal::Entity",
    from = "Column::DealId",
    to = "deal::Column::Id"
  )]
  Deal,
}

impl Related<deal::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Deal.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
