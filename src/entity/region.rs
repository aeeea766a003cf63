use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::office;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "regions")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub name: String,
  pub manager_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "office::Entity")]
  Offices,
}

impl Related<office::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Offices.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
