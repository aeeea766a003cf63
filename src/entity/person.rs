use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{office, role};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PersonStatus {
  #[sea_orm(string_value = "onboarding")]
  #[default]
  Onboarding,
  #[sea_orm(string_value = "active")]
  Active,
  #[sea_orm(string_value = "inactive")]
  Inactive,
  #[sea_orm(string_value = "terminated")]
  Terminated,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "people")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub first_name: String,
  pub last_name: String,
  pub role_id: Option<i32>,
  pub office_id: Option<i32>,
  pub team_id: Option<i32>,
  /// Org chart parent.
  pub reports_to_id: Option<i32>,
  /// Recruiting lineage parent, independent of the org chart.
  pub recruited_by_id: Option<i32>,
  pub status: PersonStatus,
  pub setter_tier: Option<String>,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "role::Entity",
    from = "Column::RoleId",
    to = "role::Column::Id"
  )]
  Role,
  #[sea_orm(
    belongs_to = "office::Entity",
    from = "Column::OfficeId",
    to = "office::Column::Id"
  )]
  Office,
}

impl Related<role::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Role.def()
  }
}

impl Related<office::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Office.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
