use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{commission, office};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum DealStatus {
  #[sea_orm(string_value = "pending")]
  Pending,
  #[sea_orm(string_value = "sold")]
  #[default]
  Sold,
  #[sea_orm(string_value = "installed")]
  Installed,
  #[sea_orm(string_value = "cancelled")]
  Cancelled,
}

impl DealStatus {
  /// Statuses for which commissions are owed.
  pub fn is_payable(&self) -> bool {
    matches!(self, Self::Sold | Self::Installed)
  }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deals")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub setter_id: i32,
  pub closer_id: i32,
  pub is_self_gen: bool,
  pub deal_type: String,
  pub deal_value: Decimal,
  pub system_size_kw: Decimal,
  pub ppw: Option<Decimal>,
  pub sale_date: Option<Date>,
  pub close_date: Option<Date>,
  pub office_id: Option<i32>,
  pub status: DealStatus,
  pub created_at: DateTime,
  pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "office::Entity",
    from = "Column::OfficeId",
    to = "office::Column::Id"
  )]
  Office,
  #[sea_orm(has_many = "commission::Entity")]
  Commissions,
}

impl Related<office::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Office.def()
  }
}

impl Related<commission::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Commissions.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
