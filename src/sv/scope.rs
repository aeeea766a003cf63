//! Turns a [`VisibilityScope`] into a `WHERE` fragment for each entity
//! family. An empty id set yields a condition that matches nothing.

use sea_orm::sea_query::{Expr, Query};

use crate::{
  entity::{commission, deal, document, person, recruit},
  prelude::*,
  sv::visibility::{EntityKind, VisibilityScope},
};

fn nothing() -> Condition {
  Condition::all().add(Expr::val(1).eq(0))
}

fn ids(set: &BTreeSet<i32>) -> Vec<i32> {
  set.iter().copied().collect()
}

pub fn condition(scope: &VisibilityScope, kind: EntityKind) -> Condition {
  match scope {
    VisibilityScope::All => Condition::all(),
    VisibilityScope::SelfOnly { person_id } => {
      by_people(kind, &BTreeSet::from([*person_id]))
    }
    VisibilityScope::Team { person_ids } if person_ids.is_empty() => nothing(),
    VisibilityScope::Team { person_ids } => by_people(kind, person_ids),
    VisibilityScope::Offices { office_ids } if office_ids.is_empty() => {
      nothing()
    }
    VisibilityScope::Offices { office_ids } => by_offices(kind, office_ids),
  }
}

fn by_people(kind: EntityKind, people: &BTreeSet<i32>) -> Condition {
  let people = ids(people);

  match kind {
    EntityKind::Person => Condition::all().add(person::Column::Id.is_in(people)),
    EntityKind::Deal => Condition::any()
      .add(deal::Column::SetterId.is_in(people.clone()))
      .add(deal::Column::CloserId.is_in(people)),
    EntityKind::Commission => {
      Condition::all().add(commission::Column::PersonId.is_in(people))
    }
    EntityKind::Recruit => {
      Condition::all().add(recruit::Column::RecruiterId.is_in(people))
    }
    EntityKind::Document => {
      Condition::all().add(document::Column::PersonId.is_in(people))
    }
  }
}

fn by_offices(kind: EntityKind, offices: &BTreeSet<i32>) -> Condition {
  let offices = ids(offices);

  match kind {
    EntityKind::Person => {
      Condition::all().add(person::Column::OfficeId.is_in(offices))
    }
    EntityKind::Deal => {
      Condition::all().add(deal::Column::OfficeId.is_in(offices))
    }
    // Commissions follow the office their deal was booked in.
    EntityKind::Commission => Condition::all().add(
      commission::Column::DealId.in_subquery(
        Query::select()
          .column(deal::Column::Id)
          .from(deal::Entity)
          .and_where(deal::Column::OfficeId.is_in(offices))
          .to_owned(),
      ),
    ),
    EntityKind::Recruit => {
      Condition::all().add(recruit::Column::TargetOfficeId.is_in(offices))
    }
    EntityKind::Document => {
      Condition::all().add(document::Column::OfficeId.is_in(offices))
    }
  }
}

/// Whether record `id` of `kind` falls inside `scope`.
pub async fn contains(
  db: &DatabaseConnection,
  scope: &VisibilityScope,
  kind: EntityKind,
  id: i32,
) -> Result<bool> {
  let filter = condition(scope, kind);

  let count = match kind {
    EntityKind::Person => {
      person::Entity::find_by_id(id).filter(filter).count(db).await?
    }
    EntityKind::Deal => {
      deal::Entity::find_by_id(id).filter(filter).count(db).await?
    }
    EntityKind::Commission => {
      commission::Entity::find_by_id(id).filter(filter).count(db).await?
    }
    EntityKind::Recruit => {
      recruit::Entity::find_by_id(id).filter(filter).count(db).await?
    }
    EntityKind::Document => {
      document::Entity::find_by_id(id).filter(filter).count(db).await?
    }
  };

  Ok(count > 0)
}
