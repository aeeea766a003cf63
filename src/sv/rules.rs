use serde::Deserialize;

use crate::{
  entity::{CalcMethod, OverrideSource, RuleType, commission_rule, deal, pay_plan},
  prelude::*,
  sv::RuleCache,
};

pub struct Rules<'a> {
  db: &'a DatabaseConnection,
  cache: Option<&'a RuleCache>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRule {
  pub pay_plan_id: i32,
  pub name: String,
  pub rule_type: RuleType,
  pub calc_method: CalcMethod,
  pub amount: Decimal,
  #[serde(default)]
  pub applies_to_role_id: Option<i32>,
  #[serde(default)]
  pub override_level: Option<i32>,
  #[serde(default)]
  pub override_source: Option<OverrideSource>,
  #[serde(default)]
  pub deal_types: Option<Vec<String>>,
  #[serde(default)]
  pub conditions: Option<json::Value>,
  #[serde(default)]
  pub sort_order: i32,
}

impl NewRule {
  /// Override rules carry both level and source, other rules neither.
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::InvalidRule("name is empty".into()));
    }

    match (self.rule_type, self.override_level, self.override_source) {
      (RuleType::Override, Some(level), Some(_)) if level >= 1 => {}
      (RuleType::Override, Some(level), Some(_)) => {
        return Err(Error::InvalidRule(format!(
          "override level must be positive, got {level}"
        )));
      }
      (RuleType::Override, _, _) => {
        return Err(Error::InvalidRule(
          "override rule needs override level and source".into(),
        ));
      }
      (_, None, None) => {}
      (ty, _, _) => {
        return Err(Error::InvalidRule(format!(
          "{ty} rule must not carry override level or source"
        )));
      }
    }

    if let Some(conditions) = &self.conditions
      && !(conditions.is_object() || conditions.is_null())
    {
      return Err(Error::InvalidRule("conditions must be an object".into()));
    }

    Ok(())
  }
}

/// A rule matches a deal type when its allow-list is absent, empty or
/// contains the type.
pub fn allows_deal_type(rule: &commission_rule::Model, deal_type: &str) -> bool {
  match &rule.deal_types {
    None | Some(json::Value::Null) => true,
    Some(json::Value::Array(types)) => {
      types.is_empty() || types.iter().any(|ty| ty.as_str() == Some(deal_type))
    }
    Some(other) => {
      warn!("Rule {} has malformed deal types: {}", rule.id, other);
      false
    }
  }
}

impl<'a> Rules<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db, cache: None }
  }

  pub fn with_cache(mut self, cache: Option<&'a RuleCache>) -> Self {
    self.cache = cache;
    self
  }

  /// Active rules of a plan in listing order: `sort_order`, then creation.
  pub async fn active_for_plan(
    &self,
    pay_plan_id: i32,
  ) -> Result<Arc<Vec<commission_rule::Model>>> {
    if let Some(rules) = self.cache.and_then(|cache| cache.get(&pay_plan_id)) {
      trace!("Rule cache hit for plan {}", pay_plan_id);
      return Ok(rules);
    }

    let rules = Arc::new(
      commission_rule::Entity::find()
        .filter(commission_rule::Column::PayPlanId.eq(pay_plan_id))
        .filter(commission_rule::Column::IsActive.eq(true))
        .order_by_asc(commission_rule::Column::SortOrder)
        .order_by_asc(commission_rule::Column::CreatedAt)
        .order_by_asc(commission_rule::Column::Id)
        .all(self.db)
        .await?,
    );

    if let Some(cache) = self.cache {
      cache.insert(pay_plan_id, rules.clone());
    }
    Ok(rules)
  }

  /// Candidate rules of `pay_plan_id` for `deal`. Role filters are left to
  /// the caller since they depend on the earner.
  pub async fn matching(
    &self,
    pay_plan_id: i32,
    deal: &deal::Model,
  ) -> Result<Vec<commission_rule::Model>> {
    let rules = self.active_for_plan(pay_plan_id).await?;

    Ok(
      rules
        .iter()
        .filter(|rule| allows_deal_type(rule, &deal.deal_type))
        .cloned()
        .collect(),
    )
  }

  pub async fn create(&self, new: NewRule) -> Result<commission_rule::Model> {
    new.validate()?;

    pay_plan::Entity::find_by_id(new.pay_plan_id)
      .one(self.db)
      .await?
      .ok_or(Error::PayPlanNotFound)?;

    let now = Utc::now().naive_utc();
    let rule = commission_rule::ActiveModel {
      id: NotSet,
      pay_plan_id: Set(new.pay_plan_id),
      name: Set(new.name),
      rule_type: Set(new.rule_type),
      calc_method: Set(new.calc_method),
      amount: Set(new.amount),
      applies_to_role_id: Set(new.applies_to_role_id),
      override_level: Set(new.override_level),
      override_source: Set(new.override_source),
      deal_types: Set(new.deal_types.map(|types| json::json!(types))),
      conditions: Set(new.conditions),
      sort_order: Set(new.sort_order),
      is_active: Set(true),
      created_at: Set(now),
    }
    .insert(self.db)
    .await?;

    self.invalidate(rule.pay_plan_id);
    info!("Rule {} added to plan {}", rule.id, rule.pay_plan_id);
    Ok(rule)
  }

  pub async fn deactivate(&self, rule_id: i32) -> Result<()> {
    let rule = commission_rule::Entity::find_by_id(rule_id)
      .one(self.db)
      .await?
      .ok_or(Error::RuleNotFound)?;

    let pay_plan_id = rule.pay_plan_id;
    commission_rule::ActiveModel { is_active: Set(false), ..rule.into() }
      .update(self.db)
      .await?;

    self.invalidate(pay_plan_id);
    Ok(())
  }

  fn invalidate(&self, pay_plan_id: i32) {
    if let Some(cache) = self.cache {
      cache.invalidate(&pay_plan_id);
    }
  }
}
