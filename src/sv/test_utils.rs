//! Shared test utilities for database setup and fixtures

use crate::{
  entity::{CalcMethod, OverrideSource, RuleType, commission_rule, person},
  prelude::*,
};

#[cfg(test)]
pub mod test_db {
  use sea_orm::{DbBackend, Schema};

  use crate::{entity::*, prelude::*};

  /// Creates an in-memory SQLite database with all required tables
  pub async fn setup() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let schema = Schema::new(DbBackend::Sqlite);
    let backend = db.get_database_backend();

    let tables = [
      schema.create_table_from_entity(role::Entity),
      schema.create_table_from_entity(region::Entity),
      schema.create_table_from_entity(office::Entity),
      schema.create_table_from_entity(team::Entity),
      schema.create_table_from_entity(person::Entity),
      schema.create_table_from_entity(pay_plan::Entity),
      schema.create_table_from_entity(person_pay_plan::Entity),
      schema.create_table_from_entity(commission_rule::Entity),
      schema.create_table_from_entity(deal::Entity),
      schema.create_table_from_entity(commission::Entity),
      schema.create_table_from_entity(recruit::Entity),
      schema.create_table_from_entity(document::Entity),
    ];

    for stmt in &tables {
      db.execute(backend.build(stmt)).await.unwrap();
    }

    db
  }

  pub async fn role(
    db: &DatabaseConnection,
    name: &str,
    level: i32,
    permissions: &[&str],
  ) -> role::Model {
    role::ActiveModel {
      id: NotSet,
      name: Set(name.into()),
      level: Set(level),
      is_active: Set(true),
      permissions: Set(json::json!(permissions)),
    }
    .insert(db)
    .await
    .unwrap()
  }

  pub async fn region(
    db: &DatabaseConnection,
    name: &str,
    manager_id: Option<i32>,
  ) -> region::Model {
    region::ActiveModel {
      id: NotSet,
      name: Set(name.into()),
      manager_id: Set(manager_id),
    }
    .insert(db)
    .await
    .unwrap()
  }

  pub async fn office(
    db: &DatabaseConnection,
    name: &str,
    region_id: Option<i32>,
  ) -> office::Model {
    office::ActiveModel {
      id: NotSet,
      name: Set(name.into()),
      region_id: Set(region_id),
      division: Set(None),
      leader_id: Set(None),
    }
    .insert(db)
    .await
    .unwrap()
  }

  pub async fn team(
    db: &DatabaseConnection,
    name: &str,
    leader_id: Option<i32>,
  ) -> team::Model {
    team::ActiveModel {
      id: NotSet,
      name: Set(name.into()),
      office_id: Set(None),
      leader_id: Set(leader_id),
    }
    .insert(db)
    .await
    .unwrap()
  }

  /// Rewrites a parent pointer without the cycle check.
  pub async fn set_reports_to(
    db: &DatabaseConnection,
    person_id: i32,
    manager_id: Option<i32>,
  ) {
    let person =
      person::Entity::find_by_id(person_id).one(db).await.unwrap().unwrap();
    person::ActiveModel { reports_to_id: Set(manager_id), ..person.into() }
      .update(db)
      .await
      .unwrap();
  }

  pub async fn pay_plan(db: &DatabaseConnection, name: &str) -> pay_plan::Model {
    pay_plan::ActiveModel {
      id: NotSet,
      name: Set(name.into()),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(db)
    .await
    .unwrap()
  }

  pub async fn assign_plan_on(
    db: &DatabaseConnection,
    person_id: i32,
    pay_plan_id: i32,
    effective_date: Date,
  ) -> person_pay_plan::Model {
    person_pay_plan::ActiveModel {
      id: NotSet,
      person_id: Set(person_id),
      pay_plan_id: Set(pay_plan_id),
      effective_date: Set(effective_date),
      end_date: Set(None),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(db)
    .await
    .unwrap()
  }

  pub async fn assign_plan(
    db: &DatabaseConnection,
    person_id: i32,
    pay_plan_id: i32,
  ) -> person_pay_plan::Model {
    let since = Date::from_ymd_opt(2000, 1, 1).unwrap();
    assign_plan_on(db, person_id, pay_plan_id, since).await
  }

  /// A sold solar deal; self-gen when setter and closer coincide.
  pub async fn deal(
    db: &DatabaseConnection,
    setter_id: i32,
    closer_id: i32,
    deal_value: i64,
    system_size_kw: i64,
  ) -> deal::Model {
    let now = Utc::now().naive_utc();
    deal::ActiveModel {
      id: NotSet,
      setter_id: Set(setter_id),
      closer_id: Set(closer_id),
      is_self_gen: Set(setter_id == closer_id),
      deal_type: Set("solar".into()),
      deal_value: Set(Decimal::from(deal_value)),
      system_size_kw: Set(Decimal::from(system_size_kw)),
      ppw: Set(None),
      sale_date: Set(None),
      close_date: Set(None),
      office_id: Set(None),
      status: Set(DealStatus::Sold),
      created_at: Set(now),
      updated_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap()
  }
}

pub struct PersonSeed {
  pub first_name: String,
  pub role_id: Option<i32>,
  pub office_id: Option<i32>,
  pub team_id: Option<i32>,
  pub reports_to_id: Option<i32>,
  pub recruited_by_id: Option<i32>,
  pub setter_tier: Option<String>,
}

impl PersonSeed {
  pub fn new(first_name: &str) -> Self {
    Self {
      first_name: first_name.into(),
      role_id: None,
      office_id: None,
      team_id: None,
      reports_to_id: None,
      recruited_by_id: None,
      setter_tier: None,
    }
  }

  pub fn reports_to(mut self, id: i32) -> Self {
    self.reports_to_id = Some(id);
    self
  }

  pub fn recruited_by(mut self, id: i32) -> Self {
    self.recruited_by_id = Some(id);
    self
  }

  pub fn role(mut self, id: i32) -> Self {
    self.role_id = Some(id);
    self
  }

  pub fn office(mut self, id: i32) -> Self {
    self.office_id = Some(id);
    self
  }

  pub fn team(mut self, id: i32) -> Self {
    self.team_id = Some(id);
    self
  }

  pub fn tier(mut self, tier: &str) -> Self {
    self.setter_tier = Some(tier.into());
    self
  }

  pub async fn insert(
    self,
    db: &DatabaseConnection,
  ) -> person::Model {
    person::ActiveModel {
      id: NotSet,
      first_name: Set(self.first_name),
      last_name: Set("Test".into()),
      role_id: Set(self.role_id),
      office_id: Set(self.office_id),
      team_id: Set(self.team_id),
      reports_to_id: Set(self.reports_to_id),
      recruited_by_id: Set(self.recruited_by_id),
      status: Set(Default::default()),
      setter_tier: Set(self.setter_tier),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(db)
    .await
    .unwrap()
  }
}

/// A rule written straight to the table, skipping validation so tests can
/// plant malformed ones.
pub struct RuleSeed {
  pub pay_plan_id: i32,
  pub rule_type: RuleType,
  pub calc_method: CalcMethod,
  pub amount: Decimal,
  pub applies_to_role_id: Option<i32>,
  pub override_level: Option<i32>,
  pub override_source: Option<OverrideSource>,
  pub deal_types: Option<json::Value>,
  pub conditions: Option<json::Value>,
  pub sort_order: i32,
}

impl RuleSeed {
  pub fn new(
    pay_plan_id: i32,
    rule_type: RuleType,
    calc_method: CalcMethod,
    amount: Decimal,
  ) -> Self {
    Self {
      pay_plan_id,
      rule_type,
      calc_method,
      amount,
      applies_to_role_id: None,
      override_level: None,
      override_source: None,
      deal_types: None,
      conditions: None,
      sort_order: 0,
    }
  }

  pub fn flat_fee(
    pay_plan_id: i32,
    rule_type: RuleType,
    amount: i64,
  ) -> Self {
    Self::new(
      pay_plan_id,
      rule_type,
      CalcMethod::FlatFee,
      Decimal::from(amount),
    )
  }

  pub fn override_at(
    mut self,
    level: i32,
    source: OverrideSource,
  ) -> Self {
    self.override_level = Some(level);
    self.override_source = Some(source);
    self
  }

  pub fn role(mut self, role_id: i32) -> Self {
    self.applies_to_role_id = Some(role_id);
    self
  }

  pub fn deal_types(mut self, types: &[&str]) -> Self {
    self.deal_types = Some(json::json!(types));
    self
  }

  pub fn conditions(mut self, conditions: json::Value) -> Self {
    self.conditions = Some(conditions);
    self
  }

  pub fn sort_order(mut self, sort_order: i32) -> Self {
    self.sort_order = sort_order;
    self
  }

  pub async fn insert(
    self,
    db: &DatabaseConnection,
  ) -> commission_rule::Model {
    commission_rule::ActiveModel {
      id: NotSet,
      pay_plan_id: Set(self.pay_plan_id),
      name: Set(format!("{} rule", self.rule_type)),
      rule_type: Set(self.rule_type),
      calc_method: Set(self.calc_method),
      amount: Set(self.amount),
      applies_to_role_id: Set(self.applies_to_role_id),
      override_level: Set(self.override_level),
      override_source: Set(self.override_source),
      deal_types: Set(self.deal_types),
      conditions: Set(self.conditions),
      sort_order: Set(self.sort_order),
      is_active: Set(true),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(db)
    .await
    .unwrap()
  }
}
