use std::sync::Arc;

use axum::{
  Extension, Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
  entity::{
    CommissionStatus, DealStatus, PersonStatus, RecruitStatus, commission,
    commission_rule, deal, document, person, person_pay_plan, recruit,
  },
  prelude::*,
  state::AppState,
  sv::{
    self, Actor, EntityKind, VisibilityScope,
    deal::{DealPatch, NewDeal},
    document::NewDocument,
    people::NewPerson,
    recruit::NewRecruit,
    rules::NewRule,
    visibility::Permission,
  },
};

type AppRef = State<Arc<AppState>>;

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = match &self {
      Error::PersonNotFound
      | Error::DealNotFound
      | Error::CommissionNotFound
      | Error::RuleNotFound
      | Error::PayPlanNotFound => StatusCode::NOT_FOUND,
      Error::Unauthorized => StatusCode::UNAUTHORIZED,
      Error::Forbidden => StatusCode::FORBIDDEN,
      Error::InvalidArgs(_) | Error::InvalidRule(_) => StatusCode::BAD_REQUEST,
      Error::HierarchyCycle(_) | Error::InvalidTransition { .. } => {
        StatusCode::CONFLICT
      }
      Error::Db(_) | Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
      error!("Request failed: {}", self);
      "internal error".to_string()
    } else {
      self.to_string()
    };

    (status, Json(json::json!({ "error": message }))).into_response()
  }
}

fn require(actor: &Actor, permission: Permission) -> Result<()> {
  if actor.has_permission(permission) {
    Ok(())
  } else {
    warn!("Person {} lacks `{}`", actor.person_id, permission);
    Err(Error::Forbidden)
  }
}

// Runs before any lookup so a restricted actor cannot tell hidden ids from
// missing ones.
async fn ensure_visible(
  app: &AppState,
  actor: &Actor,
  kind: EntityKind,
  id: i32,
) -> Result<()> {
  if app.visibility().can_view(actor, kind, id).await? {
    Ok(())
  } else {
    Err(Error::Forbidden)
  }
}

#[derive(Deserialize)]
pub struct StatusFilter<T> {
  status: Option<T>,
}

#[derive(Serialize)]
pub struct Health {
  status: &'static str,
  version: &'static str,
}

pub async fn health() -> Json<Health> {
  Json(Health { status: "ok", version: env!("CARGO_PKG_VERSION") })
}

pub async fn scope(
  State(app): AppRef,
  Extension(actor): Extension<Actor>,
  Path(kind): Path<EntityKind>,
) -> Result<Json<VisibilityScope>> {
  Ok(Json(app.visibility().resolve(&actor, kind).await?))
}

// people

pub async fn list_people(
  State(app): AppRef,
  Extension(actor): Extension<Actor>,
  Query(filter): Query<StatusFilter<PersonStatus>>,
) -> Result<Json<Vec<person::Model>>> {
  let scope = app.visibility().resolve(&actor, EntityKind::Person).await?;
  Ok(Json(sv::People::new(&app.db).list(&scope, filter.status).await?))
}

pub async fn get_person(
  State(app): AppRef,
  Extension(actor): Extension<Actor>,
  Path(id): Path<i32>,
) -> Result<Json<person::Model>> {
  ensure_visible(&app, &actor, EntityKind::Person, id).await?;
  let person = sv::People::new(&app.db).by_id(id).await?;
  Ok(Json(person))
}

pub async fn create_person(
  State(app): AppRef,
  Extension(actor): Extension<Actor>,
  Json(new): Json<NewPerson>,
) -> Result<(StatusCode, Json<person::Model>)> {
  require(&actor, Permission::Admin)?;
  let person = sv::People::new(&app.db).create(new).await?;
  Ok((StatusCode::CREATED, Json(person)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentBody {
  parent_id: Option<i32>,
}

pub async fn set_reports_to(
  State(app): AppRef,
  Extension(actor): Extension<Actor>,
  Path(id): Path<i32>,
  Json(body): Json<ParentBody>,
) -> Result<Json<person::Model>> {
  require(&actor, Permission::Admin)?;
  Ok(Json(sv::People::new(&app.db).set_reports_to(id, body.parent_id).await?))
}

pub async fn set_recruited_by(
  State(app): AppRef,
  Extension(actor): Extension<Actor>,
  Path(id): Path<i32>,
  Json(body): Json<ParentBody>,
) -> Result<Json<person::Model>> {
  require(&actor, Permission::Admin)?;
  let people = sv::People::new(&app.db);
  Ok(Json(people.set_recruited_by(id, body.parent_id).await?))
}

#[derive(Deserialize)]
pub struct StatusBody {
  status: PersonStatus,
}

pub async fn set_person_status(
  State(app): AppRef,
  Extension(actor): Extension<Actor>,
  Path(id): Path<i32>,
  Json(body): Json<StatusBody>,
) -> Result<Json<person::Model>> {
  require(&actor, Permission::Admin)?;
  Ok(Json(sv::People::new(&app.db).set_status(id, body.status).await?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanAssignment {
  pay_plan_id: i32,
  effective_date: Date,
  #[serde(default)]
  end_date: Option<Date>,
}

pub async fn assign_pay_plan(
  State(app): AppRef,
  Extension(actor): Extension<Actor>,
  Path(id): Path<i32>,
  Json(body): Json<PlanAssignment>,
) -> Result<(StatusCode, Json<person_pay_plan::Model>)> {
  require(&actor, Permission::Admin)?;
  let assignment = sv::People::new(&app.db)
    .assign_pay_plan(id, body.pay_plan_id, body.effective_date, body.end_date)
    .await?;
  Ok((StatusCode::CREATED, Json(assignment)))
}

/// Members of an office, narrowed to those the actor may see.
pub async fn office_people(
  State(app): AppRef,
  Extension(actor): Extension<Actor>,
  Path(office_id): Path<i32>,
) -> Result<Json<Vec<i32>>> {
  let members = sv::Graph::new(&app.db).office_members(&[office_id]).await?;

  let scope = app.visibility().resolve(&actor, EntityKind::Person).await?;
  if scope.restriction().is_none() {
    return Ok(Json(members));
  }

  let visible: HashSet<i32> = sv::People::new(&app.db)
    .list(&scope, None)
    .await?
    .into_iter()
    .map(|person| person.id)
    .collect();

  Ok(Json(members.into_iter().filter(|id| visible.contains(id)).collect()))
}

// rules

pub async fn create_rule(
  State(app): AppRef,
  Extension(actor): Extension<Actor>,
  Json(new): Json<NewRule>,
) -> Result<(StatusCode, Json<commission_rule::Model>)> {
  require(&actor, Permission::Admin)?;
  let rule = app.rules().create(new).await?;
  Ok((StatusCode::CREATED, Json(rule)))
}

pub async fn deactivate_rule(
  State(app): AppRef,
  Extension(actor): Extension<Actor>,
  Path(id): Path<i32>,
) -> Result<StatusCode> {
  require(&actor, Permission::Admin)?;
  app.rules().deactivate(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// deals

pub async fn list_deals(
  State(app): AppRef,
  Extension(actor): Extension<Actor>,
  Query(filter): Query<StatusFilter<DealStatus>>,
) -> Result<Json<Vec<deal::Model>>> {
  let scope = app.visibility().resolve(&actor, EntityKind::Deal).await?;
  Ok(Json(app.deals().list(&scope, filter.status).await?))
}

pub async fn get_deal(
  State(app): AppRef,
  Extension(actor): Extension<Actor>,
  Path(id): Path<i32>,
) -> Result<Json<deal::Model>> {
  ensure_visible(&app, &actor, EntityKind::Deal, id).await?;
  let deal = app.deals().by_id(id).await?;
  Ok(Json(deal))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DealOutcome {
  deal: deal::Model,
  commissions_written: usize,
}

pub async fn create_deal(
  State(app): AppRef,
  Extension(actor): Extension<Actor>,
  Json(new): Json<NewDeal>,
) -> Result<(StatusCode, Json<DealOutcome>)> {
  require(&actor, Permission::ManageDeals)?;
  let (deal, commissions_written) = app.deals().create(new).await?;
  Ok((StatusCode::CREATED, Json(DealOutcome { deal, commissions_written })))
}

pub async fn update_deal(
  State(app): AppRef,
  Extension(actor): Extension<Actor>,
  Path(id): Path<i32>,
  Json(patch): Json<DealPatch>,
) -> Result<Json<DealOutcome>> {
  require(&actor, Permission::ManageDeals)?;
  let (deal, commissions_written) = app.deals().update(id, patch).await?;
  Ok(Json(DealOutcome { deal, commissions_written }))
}

#[derive(Deserialize)]
pub struct ReasonBody {
  reason: String,
}

pub async fn cancel_deal(
  State(app): AppRef,
  Extension(actor): Extension<Actor>,
  Path(id): Path<i32>,
  Json(body): Json<ReasonBody>,
) -> Result<Json<deal::Model>> {
  require(&actor, Permission::ManageDeals)?;
  Ok(Json(app.deals().cancel(id, &body.reason).await?))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recalculated {
  commissions_written: usize,
}

pub async fn recalculate_deal(
  State(app): AppRef,
  Extension(actor): Extension<Actor>,
  Path(id): Path<i32>,
) -> Result<Json<Recalculated>> {
  require(&actor, Permission::ManageDeals)?;
  let commissions_written = app.deals().recalculate(id).await?;
  Ok(Json(Recalculated { commissions_written }))
}

/// Commissions of one deal the actor may see on the deal itself.
pub async fn deal_commissions(
  State(app): AppRef,
  Extension(actor): Extension<Actor>,
  Path(id): Path<i32>,
) -> Result<Json<Vec<commission::Model>>> {
  ensure_visible(&app, &actor, EntityKind::Deal, id).await?;
  app.deals().by_id(id).await?;

  let scope = app.visibility().resolve(&actor, EntityKind::Commission).await?;
  let rows = sv::Commissions::new(&app.db).by_deal(id).await?;
  let visible = match scope.restriction() {
    None => rows,
    Some(scope) => {
      let allowed: HashSet<i32> = sv::Commissions::new(&app.db)
        .list(scope, None)
        .await?
        .into_iter()
        .map(|row| row.id)
        .collect();
      rows.into_iter().filter(|row| allowed.contains(&row.id)).collect()
    }
  };

  Ok(Json(visible))
}

// commissions

pub async fn list_commissions(
  State(app): AppRef,
  Extension(actor): Extension<Actor>,
  Query(filter): Query<StatusFilter<CommissionStatus>>,
) -> Result<Json<Vec<commission::Model>>> {
  let scope = app.visibility().resolve(&actor, EntityKind::Commission).await?;
  Ok(Json(sv::Commissions::new(&app.db).list(&scope, filter.status).await?))
}

pub async fn approve_commission(
  State(app): AppRef,
  Extension(actor): Extension<Actor>,
  Path(id): Path<i32>,
) -> Result<Json<commission::Model>> {
  require(&actor, Permission::ApproveCommissions)?;
  Ok(Json(sv::Commissions::new(&app.db).approve(id).await?))
}

pub async fn pay_commission(
  State(app): AppRef,
  Extension(actor): Extension<Actor>,
  Path(id): Path<i32>,
) -> Result<Json<commission::Model>> {
  require(&actor, Permission::ApproveCommissions)?;
  Ok(Json(sv::Commissions::new(&app.db).pay(id).await?))
}

pub async fn void_commission(
  State(app): AppRef,
  Extension(actor): Extension<Actor>,
  Path(id): Path<i32>,
  Json(body): Json<ReasonBody>,
) -> Result<Json<commission::Model>> {
  require(&actor, Permission::ApproveCommissions)?;
  Ok(Json(sv::Commissions::new(&app.db).void(id, &body.reason).await?))
}

// recruits & documents

pub async fn list_recruits(
  State(app): AppRef,
  Extension(actor): Extension<Actor>,
  Query(filter): Query<StatusFilter<RecruitStatus>>,
) -> Result<Json<Vec<recruit::Model>>> {
  let scope = app.visibility().resolve(&actor, EntityKind::Recruit).await?;
  Ok(Json(sv::Recruits::new(&app.db).list(&scope, filter.status).await?))
}

pub async fn create_recruit(
  State(app): AppRef,
  Extension(actor): Extension<Actor>,
  Json(new): Json<NewRecruit>,
) -> Result<(StatusCode, Json<recruit::Model>)> {
  if new.recruiter_id != actor.person_id {
    require(&actor, Permission::Admin)?;
  }
  let recruit = sv::Recruits::new(&app.db).create(new).await?;
  Ok((StatusCode::CREATED, Json(recruit)))
}

pub async fn list_documents(
  State(app): AppRef,
  Extension(actor): Extension<Actor>,
  Query(filter): Query<StatusFilter<String>>,
) -> Result<Json<Vec<document::Model>>> {
  let scope = app.visibility().resolve(&actor, EntityKind::Document).await?;
  let documents = sv::Documents::new(&app.db);
  Ok(Json(documents.list(&scope, filter.status.as_deref()).await?))
}

pub async fn create_document(
  State(app): AppRef,
  Extension(actor): Extension<Actor>,
  Json(new): Json<NewDocument>,
) -> Result<(StatusCode, Json<document::Model>)> {
  require(&actor, Permission::Admin)?;
  let document = sv::Documents::new(&app.db).create(new).await?;
  Ok((StatusCode::CREATED, Json(document)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::entity::OverrideSource;

  #[test]
  fn test_error_status_mapping() {
    let cases = [
      (Error::DealNotFound, StatusCode::NOT_FOUND),
      (Error::Forbidden, StatusCode::FORBIDDEN),
      (Error::Unauthorized, StatusCode::UNAUTHORIZED),
      (Error::InvalidArgs("x".into()), StatusCode::BAD_REQUEST),
      (Error::HierarchyCycle(OverrideSource::ReportsTo), StatusCode::CONFLICT),
      (Error::Config("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (err, status) in cases {
      assert_eq!(err.into_response().status(), status);
    }
  }
}
