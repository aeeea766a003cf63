use std::fmt;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::pay_plan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
  #[sea_orm(string_value = "setter_commission")]
  SetterCommission,
  #[sea_orm(string_value = "closer_commission")]
  CloserCommission,
  #[sea_orm(string_value = "self_gen_commission")]
  SelfGenCommission,
  #[sea_orm(string_value = "override")]
  Override,
  #[sea_orm(string_value = "recruiting_bonus")]
  RecruitingBonus,
  #[sea_orm(string_value = "draw")]
  Draw,
}

impl RuleType {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::SetterCommission => "setter_commission",
      Self::CloserCommission => "closer_commission",
      Self::SelfGenCommission => "self_gen_commission",
      Self::Override => "override",
      Self::RecruitingBonus => "recruiting_bonus",
      Self::Draw => "draw",
    }
  }
}

impl fmt::Display for RuleType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum CalcMethod {
  #[sea_orm(string_value = "flat_per_kw")]
  FlatPerKw,
  #[sea_orm(string_value = "percentage_of_deal")]
  PercentageOfDeal,
  #[sea_orm(string_value = "flat_fee")]
  FlatFee,
}

/// Which parent pointer an override walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum OverrideSource {
  #[sea_orm(string_value = "reports_to")]
  ReportsTo,
  #[sea_orm(string_value = "recruited_by")]
  RecruitedBy,
}

impl fmt::Display for OverrideSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::ReportsTo => "reports_to",
      Self::RecruitedBy => "recruited_by",
    })
  }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "commission_rules")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub pay_plan_id: i32,
  pub name: String,
  pub rule_type: RuleType,
  pub calc_method: CalcMethod,
  pub amount: Decimal,
  pub applies_to_role_id: Option<i32>,
  pub override_level: Option<i32>,
  pub override_source: Option<OverrideSource>,
  /// JSON array of deal types; null or empty matches every type.
  pub deal_types: Option<Json>,
  pub conditions: Option<Json>,
  pub sort_order: i32,
  pub is_active: bool,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "pay_plan::Entity",
    from = "Column::PayPlanId",
    to = "pay_plan::Column::Id"
  )]
  PayPlan,
}

impl Related<pay_plan::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::PayPlan.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
