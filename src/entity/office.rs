use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{person, region};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "offices")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub name: String,
  pub region_id: Option<i32>,
  pub division: Option<String>,
  pub leader_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "region::Entity",
    from = "Column::RegionId",
    to = "region::Column::Id"
  )]
  Region,
  #[sea_orm(has_many = "person::Entity")]
  People,
}

impl Related<region::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Region.def()
  }
}

impl Related<person::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::People.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
