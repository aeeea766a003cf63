use crate::{
  entity::{CommissionStatus, commission},
  prelude::*,
  sv::{
    scope,
    visibility::{EntityKind, VisibilityScope},
  },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
  Approve,
  Pay,
  Void,
}

impl Transition {
  fn verb(&self) -> &'static str {
    match self {
      Self::Approve => "approve",
      Self::Pay => "pay",
      Self::Void => "void",
    }
  }
}

/// `pending -> approved -> paid`, and anything but `void` may be voided.
pub fn next_status(
  from: CommissionStatus,
  transition: Transition,
) -> Result<CommissionStatus> {
  use CommissionStatus::*;

  match (from, transition) {
    (Pending, Transition::Approve) => Ok(Approved),
    (Approved, Transition::Pay) => Ok(Paid),
    (Pending | Approved | Paid, Transition::Void) => Ok(Void),
    (from, transition) => {
      Err(Error::InvalidTransition { from, action: transition.verb() })
    }
  }
}

pub struct Commissions<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Commissions<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn by_id(&self, id: i32) -> Result<commission::Model> {
    commission::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::CommissionNotFound)
  }

  pub async fn by_deal(&self, deal_id: i32) -> Result<Vec<commission::Model>> {
    Ok(
      commission::Entity::find()
        .filter(commission::Column::DealId.eq(deal_id))
        .order_by_asc(commission::Column::Id)
        .all(self.db)
        .await?,
    )
  }

  pub async fn approve(&self, id: i32) -> Result<commission::Model> {
    self.transition(id, Transition::Approve, None).await
  }

  pub async fn pay(&self, id: i32) -> Result<commission::Model> {
    self.transition(id, Transition::Pay, None).await
  }

  pub async fn void(&self, id: i32, reason: &str) -> Result<commission::Model> {
    self.transition(id, Transition::Void, Some(reason.to_string())).await
  }

  async fn transition(
    &self,
    id: i32,
    transition: Transition,
    reason: Option<String>,
  ) -> Result<commission::Model> {
    let row = self.by_id(id).await?;
    let status = next_status(row.status, transition)?;

    let updated = commission::ActiveModel {
      status: Set(status),
      status_reason: Set(reason.or(row.status_reason.clone())),
      updated_at: Set(Utc::now().naive_utc()),
      ..row.into()
    }
    .update(self.db)
    .await?;

    info!("Commission {} is now {}", updated.id, updated.status);
    Ok(updated)
  }

  /// Voids every live commission of a deal, returns how many changed.
  pub async fn void_for_deal(&self, deal_id: i32, reason: &str) -> Result<u64> {
    let result = commission::Entity::update_many()
      .set(commission::ActiveModel {
        status: Set(CommissionStatus::Void),
        status_reason: Set(Some(reason.to_string())),
        updated_at: Set(Utc::now().naive_utc()),
        ..Default::default()
      })
      .filter(commission::Column::DealId.eq(deal_id))
      .filter(commission::Column::Status.ne(CommissionStatus::Void))
      .exec(self.db)
      .await?;

    info!("Deal {}: voided {} commissions", deal_id, result.rows_affected);
    Ok(result.rows_affected)
  }

  pub async fn list(
    &self,
    scope: &VisibilityScope,
    status: Option<CommissionStatus>,
  ) -> Result<Vec<commission::Model>> {
    let mut query = commission::Entity::find()
      .filter(scope::condition(scope, EntityKind::Commission));

    if let Some(status) = status {
      query = query.filter(commission::Column::Status.eq(status));
    }

    Ok(query.order_by_desc(commission::Column::CreatedAt).all(self.db).await?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    entity::RuleType,
    sv::{
      Calculator,
      test_utils::{PersonSeed, RuleSeed, test_db},
    },
  };

  #[test]
  fn test_state_machine() {
    use CommissionStatus::*;

    assert_eq!(next_status(Pending, Transition::Approve).unwrap(), Approved);
    assert_eq!(next_status(Approved, Transition::Pay).unwrap(), Paid);
    assert_eq!(next_status(Paid, Transition::Void).unwrap(), Void);
    assert_eq!(next_status(Pending, Transition::Void).unwrap(), Void);

    assert!(matches!(
      next_status(Pending, Transition::Pay),
      Err(Error::InvalidTransition { from: Pending, action: "pay" })
    ));
    assert!(next_status(Paid, Transition::Approve).is_err());
    for transition in [Transition::Approve, Transition::Pay, Transition::Void] {
      assert!(next_status(Void, transition).is_err());
    }
  }

  async fn seeded_commission(db: &DatabaseConnection) -> commission::Model {
    let plan = test_db::pay_plan(db, "Standard").await;
    let closer = PersonSeed::new("Closer").insert(db).await;
    test_db::assign_plan(db, closer.id, plan.id).await;
    RuleSeed::flat_fee(plan.id, RuleType::CloserCommission, 500)
      .insert(db)
      .await;

    let setter = PersonSeed::new("Setter").insert(db).await;
    let deal = test_db::deal(db, setter.id, closer.id, 10_000, 5).await;
    Calculator::new(db).calculate_for_deal(deal.id).await.unwrap();

    Commissions::new(db).by_deal(deal.id).await.unwrap().remove(0)
  }

  #[tokio::test]
  async fn test_approve_then_pay() {
    let db = test_db::setup().await;
    let row = seeded_commission(&db).await;
    let sv = Commissions::new(&db);

    assert_eq!(sv.approve(row.id).await.unwrap().status, CommissionStatus::Approved);
    assert_eq!(sv.pay(row.id).await.unwrap().status, CommissionStatus::Paid);
    assert!(matches!(
      sv.approve(row.id).await,
      Err(Error::InvalidTransition { .. })
    ));
  }

  #[tokio::test]
  async fn test_void_is_terminal() {
    let db = test_db::setup().await;
    let row = seeded_commission(&db).await;
    let sv = Commissions::new(&db);

    let voided = sv.void(row.id, "clawback").await.unwrap();
    assert_eq!(voided.status, CommissionStatus::Void);
    assert_eq!(voided.status_reason.as_deref(), Some("clawback"));

    assert!(sv.approve(row.id).await.is_err());
    assert!(sv.void(row.id, "again").await.is_err());
  }

  #[tokio::test]
  async fn test_void_for_deal_skips_void_rows() {
    let db = test_db::setup().await;
    let row = seeded_commission(&db).await;
    let sv = Commissions::new(&db);

    assert_eq!(sv.void_for_deal(row.deal_id, "deal cancelled").await.unwrap(), 1);
    assert_eq!(sv.void_for_deal(row.deal_id, "deal cancelled").await.unwrap(), 0);
    assert!(matches!(sv.by_id(9999).await, Err(Error::CommissionNotFound)));
  }
}
