//! Optional per-rule predicates stored as JSON on `commission_rules`.

use serde::Deserialize;

use crate::{
  entity::{deal, person},
  prelude::*,
};

/// Who earns a `recruiting_bonus` or `draw` rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EarnerRef {
  Setter,
  Closer,
  SetterRecruiter,
  CloserRecruiter,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleConditions {
  pub earner: Option<EarnerRef>,
  pub min_system_size_kw: Option<Decimal>,
  pub max_system_size_kw: Option<Decimal>,
  pub min_deal_value: Option<Decimal>,
  pub setter_tiers: Option<Vec<String>>,
  #[serde(default)]
  pub exclude_non_positive: bool,
}

impl RuleConditions {
  /// Unknown keys are ignored; a non-object or mistyped key is an error.
  pub fn parse(raw: Option<&json::Value>) -> Result<Self, json::Error> {
    match raw {
      None | Some(json::Value::Null) => Ok(Self::default()),
      Some(value) => Self::deserialize(value),
    }
  }

  pub fn admits_deal(&self, deal: &deal::Model) -> bool {
    let size = deal.system_size_kw;

    self.min_system_size_kw.is_none_or(|min| size >= min)
      && self.max_system_size_kw.is_none_or(|max| size <= max)
      && self.min_deal_value.is_none_or(|min| deal.deal_value >= min)
  }

  pub fn admits_earner(&self, earner: &person::Model) -> bool {
    match &self.setter_tiers {
      None => true,
      Some(tiers) => earner
        .setter_tier
        .as_ref()
        .is_some_and(|tier| tiers.iter().any(|allowed| allowed == tier)),
    }
  }

  pub fn admits_amount(&self, amount: Decimal) -> bool {
    !self.exclude_non_positive || amount > Decimal::ZERO
  }
}

#[cfg(test)]
mod tests {
  use json::json;

  use super::*;

  fn deal(value: i64, kw: i64) -> deal::Model {
    let now = Utc::now().naive_utc();
    deal::Model {
      id: 1,
      setter_id: 1,
      closer_id: 2,
      is_self_gen: false,
      deal_type: "solar".into(),
      deal_value: Decimal::from(value),
      system_size_kw: Decimal::from(kw),
      ppw: None,
      sale_date: None,
      close_date: None,
      office_id: None,
      status: crate::entity::DealStatus::Sold,
      created_at: now,
      updated_at: now,
    }
  }

  fn earner(tier: Option<&str>) -> person::Model {
    person::Model {
      id: 1,
      first_name: "A".into(),
      last_name: "B".into(),
      role_id: None,
      office_id: None,
      team_id: None,
      reports_to_id: None,
      recruited_by_id: None,
      status: person::PersonStatus::Active,
      setter_tier: tier.map(Into::into),
      created_at: Utc::now().naive_utc(),
    }
  }

  #[test]
  fn test_missing_conditions_admit_everything() {
    let conditions = RuleConditions::parse(None).unwrap();
    assert!(conditions.admits_deal(&deal(1, 1)));
    assert!(conditions.admits_earner(&earner(None)));
    assert!(conditions.admits_amount(Decimal::ZERO));
  }

  #[test]
  fn test_size_bounds_are_inclusive() {
    let raw = json!({ "minSystemSizeKw": 5, "maxSystemSizeKw": "10" });
    let conditions = RuleConditions::parse(Some(&raw)).unwrap();

    assert!(!conditions.admits_deal(&deal(10_000, 4)));
    assert!(conditions.admits_deal(&deal(10_000, 5)));
    assert!(conditions.admits_deal(&deal(10_000, 10)));
    assert!(!conditions.admits_deal(&deal(10_000, 11)));
  }

  #[test]
  fn test_setter_tiers_and_earner() {
    let raw = json!({
      "earner": "closerRecruiter",
      "setterTiers": ["gold", "platinum"],
      "unrelated": true
    });
    let conditions = RuleConditions::parse(Some(&raw)).unwrap();

    assert_eq!(conditions.earner, Some(EarnerRef::CloserRecruiter));
    assert!(conditions.admits_earner(&earner(Some("gold"))));
    assert!(!conditions.admits_earner(&earner(Some("bronze"))));
    assert!(!conditions.admits_earner(&earner(None)));
  }

  #[test]
  fn test_exclude_non_positive() {
    let raw = json!({ "excludeNonPositive": true });
    let conditions = RuleConditions::parse(Some(&raw)).unwrap();

    assert!(!conditions.admits_amount(Decimal::ZERO));
    assert!(conditions.admits_amount(Decimal::ONE));
  }

  #[test]
  fn test_malformed_conditions_are_rejected() {
    assert!(RuleConditions::parse(Some(&json!(["setter"]))).is_err());
    assert!(RuleConditions::parse(Some(&json!({ "earner": "boss" }))).is_err());
  }
}
