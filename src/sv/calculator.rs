//! Turns a sold deal into commission rows: base commissions for the setter
//! and closer (or the self-gen rep), conditional bonuses, and overrides up
//! the reporting or recruiting chain.

use rust_decimal::RoundingStrategy;

use crate::{
  entity::{
    CalcMethod, CommissionStatus, OverrideSource, RuleType, commission,
    commission_rule, deal, person,
  },
  prelude::*,
  sv::{
    RuleCache,
    conditions::{EarnerRef, RuleConditions},
    graph::{Chain, Graph},
    rules::Rules,
  },
};

pub const SUPERSEDED: &str = "superseded by recalculation";

/// One commission the deal owes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payout {
  pub rule_id: i32,
  pub person_id: i32,
  pub commission_type: String,
  pub amount: Decimal,
}

/// Who a rule pays, decoded from its type and override fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
  Setter,
  Closer,
  SelfGen,
  Override { level: u32, source: OverrideSource },
  Conditional(EarnerRef),
}

fn target(
  rule: &commission_rule::Model,
  deal: &deal::Model,
) -> Result<Target, String> {
  let ty = rule.rule_type;
  match (ty, rule.override_level, rule.override_source) {
    (RuleType::Override, Some(level), Some(source)) if level >= 1 => {
      Ok(Target::Override { level: level as u32, source })
    }
    (RuleType::Override, ..) => {
      Err("override rule without a positive level and a source".into())
    }
    (_, Some(_), _) | (_, _, Some(_)) => {
      Err(format!("{ty} rule carries override fields"))
    }
    (RuleType::SetterCommission, ..) => Ok(Target::Setter),
    (RuleType::CloserCommission, ..) => Ok(Target::Closer),
    (RuleType::SelfGenCommission, ..) => Ok(Target::SelfGen),
    (RuleType::RecruitingBonus, ..) => Ok(Target::Conditional(
      if deal.is_self_gen {
        EarnerRef::SetterRecruiter
      } else {
        EarnerRef::CloserRecruiter
      },
    )),
    (RuleType::Draw, ..) => Ok(Target::Conditional(EarnerRef::Closer)),
  }
}

/// Person whose chain an override of `source` walks.
fn anchor(deal: &deal::Model, source: OverrideSource) -> i32 {
  match source {
    OverrideSource::ReportsTo => deal.closer_id,
    OverrideSource::RecruitedBy if deal.is_self_gen => deal.setter_id,
    OverrideSource::RecruitedBy => deal.closer_id,
  }
}

/// Rounded to cents, half away from zero.
pub fn amount_for(
  method: CalcMethod,
  rate: Decimal,
  deal: &deal::Model,
) -> Decimal {
  let raw = match method {
    CalcMethod::FlatPerKw => rate * deal.system_size_kw,
    CalcMethod::PercentageOfDeal => rate * deal.deal_value,
    CalcMethod::FlatFee => rate,
  };
  raw.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn commission_type(rule: &commission_rule::Model, level: Option<u32>) -> String {
  match level {
    Some(level) => format!("override_{level}"),
    None => rule.rule_type.to_string(),
  }
}

pub struct Calculator<'a> {
  db: &'a DatabaseConnection,
  rules: Option<&'a RuleCache>,
}

impl<'a> Calculator<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db, rules: None }
  }

  pub fn with_rule_cache(mut self, cache: Option<&'a RuleCache>) -> Self {
    self.rules = cache;
    self
  }

  /// Recomputes the commissions of a deal and returns the number of rows
  /// written. Pending rows from earlier runs are voided; approved and paid
  /// rows are kept and their rule is not emitted again for the same earner.
  pub async fn calculate_for_deal(&self, deal_id: i32) -> Result<usize> {
    let deal = deal::Entity::find_by_id(deal_id)
      .one(self.db)
      .await?
      .ok_or(Error::DealNotFound)?;

    let payouts = if deal.status.is_payable() {
      self.payouts(&deal).await?
    } else {
      debug!("Deal {} is {:?}, nothing owed", deal.id, deal.status);
      Vec::new()
    };

    let written = self.persist(&deal, payouts).await?;
    info!("Deal {}: {} commission rows written", deal.id, written);
    Ok(written)
  }

  /// Everything `deal` owes under the closer's current pay plan, in rule
  /// order. Reads only.
  pub async fn payouts(&self, deal: &deal::Model) -> Result<Vec<Payout>> {
    let graph = Graph::new(self.db);
    let today = Utc::now().date_naive();

    let Some(pay_plan_id) =
      graph.current_pay_plan(deal.closer_id, today).await?
    else {
      info!("Closer {} of deal {} has no pay plan", deal.closer_id, deal.id);
      return Ok(Vec::new());
    };

    let rules = Rules::new(self.db)
      .with_cache(self.rules)
      .matching(pay_plan_id, deal)
      .await?;

    let mut deepest: HashMap<OverrideSource, u32> = HashMap::new();
    for rule in &rules {
      if let Ok(Target::Override { level, source }) = target(rule, deal) {
        let max = deepest.entry(source).or_default();
        *max = (*max).max(level);
      }
    }

    let mut chains: HashMap<OverrideSource, Chain> = HashMap::new();
    for (source, max_levels) in deepest {
      let chain = graph.walk(anchor(deal, source), source, max_levels).await?;
      chains.insert(source, chain);
    }

    let mut people: HashMap<i32, Option<person::Model>> = HashMap::new();
    let mut payouts = Vec::new();

    for rule in &rules {
      let target = match target(rule, deal) {
        Ok(target) => target,
        Err(reason) => {
          warn!("Skipping rule {}: {}", rule.id, reason);
          continue;
        }
      };

      let conditions = match RuleConditions::parse(rule.conditions.as_ref()) {
        Ok(conditions) => conditions,
        Err(err) => {
          warn!("Skipping rule {}: malformed conditions: {}", rule.id, err);
          continue;
        }
      };

      if !conditions.admits_deal(deal) {
        continue;
      }

      let earner_id = match target {
        Target::Setter if !deal.is_self_gen => Some(deal.setter_id),
        Target::Closer if !deal.is_self_gen => Some(deal.closer_id),
        Target::SelfGen if deal.is_self_gen => Some(deal.setter_id),
        Target::Setter | Target::Closer | Target::SelfGen => None,
        Target::Override { level, source } => {
          chains.get(&source).and_then(|chain| chain.at(level))
        }
        Target::Conditional(default) => {
          let earner = conditions.earner.unwrap_or(default);
          self.resolve(&graph, deal, earner).await?
        }
      };

      let Some(earner_id) = earner_id else {
        continue;
      };

      if !people.contains_key(&earner_id) {
        people.insert(earner_id, graph.find(earner_id).await?);
      }
      let Some(earner) = people.get(&earner_id).and_then(Option::as_ref) else {
        warn!("Rule {} resolved to missing person {}", rule.id, earner_id);
        continue;
      };

      if rule.applies_to_role_id.is_some()
        && rule.applies_to_role_id != earner.role_id
      {
        continue;
      }

      if !conditions.admits_earner(earner) {
        continue;
      }

      let amount = amount_for(rule.calc_method, rule.amount, deal);
      if !conditions.admits_amount(amount) {
        continue;
      }

      let level = match target {
        Target::Override { level, .. } => Some(level),
        _ => None,
      };

      payouts.push(Payout {
        rule_id: rule.id,
        person_id: earner_id,
        commission_type: commission_type(rule, level),
        amount,
      });
    }

    Ok(payouts)
  }

  async fn resolve(
    &self,
    graph: &Graph<'_>,
    deal: &deal::Model,
    earner: EarnerRef,
  ) -> Result<Option<i32>> {
    match earner {
      EarnerRef::Setter => Ok(Some(deal.setter_id)),
      EarnerRef::Closer => Ok(Some(deal.closer_id)),
      EarnerRef::SetterRecruiter => {
        graph.parent(deal.setter_id, OverrideSource::RecruitedBy).await
      }
      EarnerRef::CloserRecruiter => {
        graph.parent(deal.closer_id, OverrideSource::RecruitedBy).await
      }
    }
  }

  async fn persist(
    &self,
    deal: &deal::Model,
    payouts: Vec<Payout>,
  ) -> Result<usize> {
    let txn = self.db.begin().await?;
    let now = Utc::now().naive_utc();

    let locked: HashSet<(Option<i32>, i32, String)> =
      commission::Entity::find()
        .filter(commission::Column::DealId.eq(deal.id))
        .filter(
          commission::Column::Status
            .is_in([CommissionStatus::Approved, CommissionStatus::Paid]),
        )
        .all(&txn)
        .await?
        .into_iter()
        .map(|row| (row.rule_id, row.person_id, row.commission_type))
        .collect();

    let superseded = commission::Entity::update_many()
      .set(commission::ActiveModel {
        status: Set(CommissionStatus::Void),
        status_reason: Set(Some(SUPERSEDED.into())),
        updated_at: Set(now),
        ..Default::default()
      })
      .filter(commission::Column::DealId.eq(deal.id))
      .filter(commission::Column::Status.eq(CommissionStatus::Pending))
      .exec(&txn)
      .await?;

    if superseded.rows_affected > 0 {
      debug!(
        "Deal {}: voided {} pending rows",
        deal.id, superseded.rows_affected
      );
    }

    let mut written = 0;
    for payout in payouts {
      let key =
        (Some(payout.rule_id), payout.person_id, payout.commission_type.clone());
      if locked.contains(&key) {
        debug!(
          "Deal {}: rule {} {} for person {} already settled",
          deal.id, payout.rule_id, payout.commission_type, payout.person_id
        );
        continue;
      }

      commission::ActiveModel {
        id: NotSet,
        deal_id: Set(deal.id),
        person_id: Set(payout.person_id),
        rule_id: Set(Some(payout.rule_id)),
        commission_type: Set(payout.commission_type),
        amount: Set(payout.amount),
        status: Set(CommissionStatus::Pending),
        status_reason: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
      }
      .insert(&txn)
      .await?;

      written += 1;
    }

    txn.commit().await?;
    Ok(written)
  }
}
