use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::person;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "roles")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub name: String,
  /// 1 = rep, higher is more senior.
  pub level: i32,
  pub is_active: bool,
  /// JSON array of permission names, e.g. `["deals.view.office"]`.
  pub permissions: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "person::Entity")]
  People,
}

impl Related<person::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::People.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
