use serde::Deserialize;

use crate::{
  entity::{DealStatus, deal},
  prelude::*,
  sv::{
    Calculator, Commissions, RuleCache,
    graph::Graph,
    scope,
    visibility::{EntityKind, VisibilityScope},
  },
};

pub const CANCELLED: &str = "deal cancelled";

fn default_deal_type() -> String {
  "solar".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDeal {
  pub setter_id: i32,
  pub closer_id: i32,
  #[serde(default = "default_deal_type")]
  pub deal_type: String,
  pub deal_value: Decimal,
  pub system_size_kw: Decimal,
  #[serde(default)]
  pub ppw: Option<Decimal>,
  #[serde(default)]
  pub sale_date: Option<Date>,
  #[serde(default)]
  pub close_date: Option<Date>,
  #[serde(default)]
  pub office_id: Option<i32>,
  #[serde(default)]
  pub status: DealStatus,
}

/// Partial update; absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealPatch {
  pub setter_id: Option<i32>,
  pub closer_id: Option<i32>,
  pub deal_type: Option<String>,
  pub deal_value: Option<Decimal>,
  pub system_size_kw: Option<Decimal>,
  pub ppw: Option<Decimal>,
  pub sale_date: Option<Date>,
  pub close_date: Option<Date>,
  pub office_id: Option<i32>,
  pub status: Option<DealStatus>,
}

fn validate_figures(deal_type: &str, value: Decimal, kw: Decimal) -> Result<()> {
  if deal_type.trim().is_empty() {
    return Err(Error::InvalidArgs("deal type is empty".into()));
  }
  if value.is_sign_negative() {
    return Err(Error::InvalidArgs("deal value is negative".into()));
  }
  if kw.is_sign_negative() {
    return Err(Error::InvalidArgs("system size is negative".into()));
  }
  Ok(())
}

/// Whether a change from `before` to `after` affects what the deal owes.
fn needs_recompute(before: &deal::Model, after: &deal::Model) -> bool {
  let inputs_changed = before.setter_id != after.setter_id
    || before.closer_id != after.closer_id
    || before.deal_type != after.deal_type
    || before.deal_value != after.deal_value
    || before.system_size_kw != after.system_size_kw;

  let became_payable =
    !before.status.is_payable() && after.status.is_payable();
  let stopped_payable =
    before.status.is_payable() && !after.status.is_payable();

  (inputs_changed && after.status.is_payable())
    || became_payable
    || stopped_payable
}

pub struct Deals<'a> {
  db: &'a DatabaseConnection,
  rules: Option<&'a RuleCache>,
}

impl<'a> Deals<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db, rules: None }
  }

  pub fn with_rule_cache(mut self, cache: &'a RuleCache) -> Self {
    self.rules = Some(cache);
    self
  }

  fn calculator(&self) -> Calculator<'a> {
    Calculator::new(self.db).with_rule_cache(self.rules)
  }

  pub async fn by_id(&self, id: i32) -> Result<deal::Model> {
    deal::Entity::find_by_id(id).one(self.db).await?.ok_or(Error::DealNotFound)
  }

  /// Stores the deal and, when it is already sold, computes its
  /// commissions. A failed calculation is logged and the deal is kept; the
  /// second element is the number of commission rows written.
  pub async fn create(&self, new: NewDeal) -> Result<(deal::Model, usize)> {
    validate_figures(&new.deal_type, new.deal_value, new.system_size_kw)?;

    let graph = Graph::new(self.db);
    graph.person(new.setter_id).await?;
    let closer = graph.person(new.closer_id).await?;

    let now = Utc::now().naive_utc();
    let deal = deal::ActiveModel {
      id: NotSet,
      setter_id: Set(new.setter_id),
      closer_id: Set(new.closer_id),
      is_self_gen: Set(new.setter_id == new.closer_id),
      deal_type: Set(new.deal_type),
      deal_value: Set(new.deal_value),
      system_size_kw: Set(new.system_size_kw),
      ppw: Set(new.ppw),
      sale_date: Set(new.sale_date),
      close_date: Set(new.close_date),
      office_id: Set(new.office_id.or(closer.office_id)),
      status: Set(new.status),
      created_at: Set(now),
      updated_at: Set(now),
    }
    .insert(self.db)
    .await?;

    info!(
      "Deal {} created: setter {} closer {} value {}",
      deal.id, deal.setter_id, deal.closer_id, deal.deal_value
    );

    let written = if deal.status.is_payable() {
      self.calculate_quietly(deal.id).await
    } else {
      0
    };

    Ok((deal, written))
  }

  async fn calculate_quietly(&self, deal_id: i32) -> usize {
    match self.calculator().calculate_for_deal(deal_id).await {
      Ok(written) => written,
      Err(err) => {
        error!("Commission calculation for deal {} failed: {}", deal_id, err);
        0
      }
    }
  }

  /// Applies `patch` and recomputes commissions when the change affects
  /// them. Moving a deal to `cancelled` goes through [`Self::cancel`]. As in
  /// [`Self::create`], a failed calculation is logged and the edit is kept.
  pub async fn update(
    &self,
    id: i32,
    patch: DealPatch,
  ) -> Result<(deal::Model, usize)> {
    let before = self.by_id(id).await?;

    if before.status == DealStatus::Cancelled {
      return Err(Error::InvalidArgs("deal is cancelled".into()));
    }
    if patch.status == Some(DealStatus::Cancelled) {
      return Ok((self.cancel(id, CANCELLED).await?, 0));
    }

    let setter_id = patch.setter_id.unwrap_or(before.setter_id);
    let closer_id = patch.closer_id.unwrap_or(before.closer_id);
    let deal_type = patch.deal_type.unwrap_or_else(|| before.deal_type.clone());
    let deal_value = patch.deal_value.unwrap_or(before.deal_value);
    let system_size_kw = patch.system_size_kw.unwrap_or(before.system_size_kw);
    validate_figures(&deal_type, deal_value, system_size_kw)?;

    let graph = Graph::new(self.db);
    if setter_id != before.setter_id {
      graph.person(setter_id).await?;
    }

    // A new closer moves the deal to their office unless one is given.
    let mut office_id = patch.office_id.or(before.office_id);
    if closer_id != before.closer_id {
      let closer = graph.person(closer_id).await?;
      office_id = patch.office_id.or(closer.office_id);
    }

    let after = deal::ActiveModel {
      setter_id: Set(setter_id),
      closer_id: Set(closer_id),
      is_self_gen: Set(setter_id == closer_id),
      deal_type: Set(deal_type),
      deal_value: Set(deal_value),
      system_size_kw: Set(system_size_kw),
      ppw: Set(patch.ppw.or(before.ppw)),
      sale_date: Set(patch.sale_date.or(before.sale_date)),
      close_date: Set(patch.close_date.or(before.close_date)),
      office_id: Set(office_id),
      status: Set(patch.status.unwrap_or(before.status)),
      updated_at: Set(Utc::now().naive_utc()),
      ..before.clone().into()
    }
    .update(self.db)
    .await?;

    let written = if needs_recompute(&before, &after) {
      debug!("Deal {} changed, recomputing commissions", after.id);
      self.calculate_quietly(after.id).await
    } else {
      0
    };

    Ok((after, written))
  }

  /// Marks the deal cancelled and voids its commissions.
  pub async fn cancel(&self, id: i32, reason: &str) -> Result<deal::Model> {
    let deal = self.by_id(id).await?;
    if deal.status == DealStatus::Cancelled {
      return Ok(deal);
    }

    let deal = deal::ActiveModel {
      status: Set(DealStatus::Cancelled),
      updated_at: Set(Utc::now().naive_utc()),
      ..deal.into()
    }
    .update(self.db)
    .await?;

    Commissions::new(self.db).void_for_deal(deal.id, reason).await?;
    info!("Deal {} cancelled: {}", deal.id, reason);
    Ok(deal)
  }

  pub async fn recalculate(&self, id: i32) -> Result<usize> {
    self.calculator().calculate_for_deal(id).await
  }

  pub async fn list(
    &self,
    scope: &VisibilityScope,
    status: Option<DealStatus>,
  ) -> Result<Vec<deal::Model>> {
    let mut query =
      deal::Entity::find().filter(scope::condition(scope, EntityKind::Deal));

    if let Some(status) = status {
      query = query.filter(deal::Column::Status.eq(status));
    }

    Ok(query.order_by_desc(deal::Column::CreatedAt).all(self.db).await?)
  }
}
