use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{pay_plan, person};

/// Append-only assignment history; rows are never updated.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "person_pay_plans")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub person_id: i32,
  pub pay_plan_id: i32,
  pub effective_date: Date,
  pub end_date: Option<Date>,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "person::Entity",
    from = "Column::PersonId",
    to = "person::Column::Id"
  )]
  Person,
  #[sea_orm(
    belongs_to = "pay_plan::Entity",
    from = "Column::PayPlanId",
    to = "pay_plan::Column::Id"
  )]
  PayPlan,
}

impl Related<person::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Person.def()
  }
}

impl Related<pay_plan::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::PayPlan.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
