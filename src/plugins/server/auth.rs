use std::sync::Arc;

use axum::{
  extract::{Request, State},
  middleware::Next,
  response::Response,
};

use crate::{prelude::*, state::AppState, sv::Actor};

/// Set by the authentication gateway in front of the service.
pub const ACTOR_HEADER: &str = "x-actor-id";

fn actor_id(request: &Request) -> Option<i32> {
  request
    .headers()
    .get(ACTOR_HEADER)
    .and_then(|value| value.to_str().ok())
    .and_then(|raw| raw.trim().parse().ok())
}

/// Resolves the acting person and stores them in the request extensions.
pub async fn require_actor(
  State(app): State<Arc<AppState>>,
  mut request: Request,
  next: Next,
) -> Result<Response> {
  let person_id = actor_id(&request).ok_or(Error::Unauthorized)?;

  let actor = Actor::load(&app.db, person_id).await.map_err(|err| match err {
    Error::PersonNotFound => Error::Unauthorized,
    err => err,
  })?;

  trace!("Request by person {} ({})", actor.person_id, actor.role_name);
  request.extensions_mut().insert(actor);

  Ok(next.run(request).await)
}
