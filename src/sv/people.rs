use serde::Deserialize;

use crate::{
  entity::{OverrideSource, PersonStatus, pay_plan, person, person_pay_plan},
  prelude::*,
  sv::{
    graph::Graph,
    scope,
    visibility::{EntityKind, VisibilityScope},
  },
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPerson {
  pub first_name: String,
  pub last_name: String,
  #[serde(default)]
  pub role_id: Option<i32>,
  #[serde(default)]
  pub office_id: Option<i32>,
  #[serde(default)]
  pub team_id: Option<i32>,
  #[serde(default)]
  pub reports_to_id: Option<i32>,
  #[serde(default)]
  pub recruited_by_id: Option<i32>,
  #[serde(default)]
  pub setter_tier: Option<String>,
}

pub struct People<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> People<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn by_id(&self, id: i32) -> Result<person::Model> {
    Graph::new(self.db).person(id).await
  }

  /// A new person cannot close a loop, but their parents must exist.
  pub async fn create(&self, new: NewPerson) -> Result<person::Model> {
    if new.first_name.trim().is_empty() {
      return Err(Error::InvalidArgs("first name is empty".into()));
    }

    let graph = Graph::new(self.db);
    for parent in [new.reports_to_id, new.recruited_by_id].into_iter().flatten()
    {
      graph.person(parent).await?;
    }

    let person = person::ActiveModel {
      id: NotSet,
      first_name: Set(new.first_name),
      last_name: Set(new.last_name),
      role_id: Set(new.role_id),
      office_id: Set(new.office_id),
      team_id: Set(new.team_id),
      reports_to_id: Set(new.reports_to_id),
      recruited_by_id: Set(new.recruited_by_id),
      status: Set(PersonStatus::Onboarding),
      setter_tier: Set(new.setter_tier),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(self.db)
    .await?;

    info!("Person {} created", person.id);
    Ok(person)
  }

  pub async fn set_reports_to(
    &self,
    person_id: i32,
    manager_id: Option<i32>,
  ) -> Result<person::Model> {
    self.set_parent(person_id, manager_id, OverrideSource::ReportsTo).await
  }

  pub async fn set_recruited_by(
    &self,
    person_id: i32,
    recruiter_id: Option<i32>,
  ) -> Result<person::Model> {
    self.set_parent(person_id, recruiter_id, OverrideSource::RecruitedBy).await
  }

  async fn set_parent(
    &self,
    person_id: i32,
    parent: Option<i32>,
    source: OverrideSource,
  ) -> Result<person::Model> {
    let graph = Graph::new(self.db);
    let person = graph.person(person_id).await?;

    if let Some(parent) = parent {
      graph.person(parent).await?;
      if graph.would_cycle(person_id, parent, source).await? {
        warn!(
          "Rejected {} parent {} for person {}: cycle",
          source, parent, person_id
        );
        return Err(Error::HierarchyCycle(source));
      }
    }

    let mut active: person::ActiveModel = person.into();
    match source {
      OverrideSource::ReportsTo => active.reports_to_id = Set(parent),
      OverrideSource::RecruitedBy => active.recruited_by_id = Set(parent),
    }

    let person = active.update(self.db).await?;
    info!("Person {}: {} set to {:?}", person.id, source, parent);
    Ok(person)
  }

  pub async fn set_status(
    &self,
    person_id: i32,
    status: PersonStatus,
  ) -> Result<person::Model> {
    let person = self.by_id(person_id).await?;
    Ok(
      person::ActiveModel { status: Set(status), ..person.into() }
        .update(self.db)
        .await?,
    )
  }

  /// Appends an assignment; earlier ones stay as history.
  pub async fn assign_pay_plan(
    &self,
    person_id: i32,
    pay_plan_id: i32,
    effective_date: Date,
    end_date: Option<Date>,
  ) -> Result<person_pay_plan::Model> {
    self.by_id(person_id).await?;
    pay_plan::Entity::find_by_id(pay_plan_id)
      .one(self.db)
      .await?
      .ok_or(Error::PayPlanNotFound)?;

    if end_date.is_some_and(|end| end <= effective_date) {
      return Err(Error::InvalidArgs("end date precedes effective date".into()));
    }

    let assignment = person_pay_plan::ActiveModel {
      id: NotSet,
      person_id: Set(person_id),
      pay_plan_id: Set(pay_plan_id),
      effective_date: Set(effective_date),
      end_date: Set(end_date),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(self.db)
    .await?;

    info!(
      "Person {} on pay plan {} from {}",
      person_id, pay_plan_id, effective_date
    );
    Ok(assignment)
  }

  pub async fn list(
    &self,
    scope: &VisibilityScope,
    status: Option<PersonStatus>,
  ) -> Result<Vec<person::Model>> {
    let mut query = person::Entity::find()
      .filter(scope::condition(scope, EntityKind::Person));

    if let Some(status) = status {
      query = query.filter(person::Column::Status.eq(status));
    }

    Ok(query.order_by_asc(person::Column::Id).all(self.db).await?)
  }
}
