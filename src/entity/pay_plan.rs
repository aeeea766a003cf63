use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::commission_rule;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pay_plans")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub name: String,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "commission_rule::Entity")]
  Rules,
}

impl Related<commission_rule::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Rules.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
