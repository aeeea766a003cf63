use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum RecruitStatus {
  #[sea_orm(string_value = "lead")]
  #[default]
  Lead,
  #[sea_orm(string_value = "interviewing")]
  Interviewing,
  #[sea_orm(string_value = "offered")]
  Offered,
  #[sea_orm(string_value = "hired")]
  Hired,
  #[sea_orm(string_value = "rejected")]
  Rejected,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recruits")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub full_name: String,
  pub recruiter_id: i32,
  /// Office the recruit is hired into; may differ from the recruiter's.
  pub target_office_id: Option<i32>,
  pub status: RecruitStatus,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
