mod auth;
mod handlers;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use async_trait::async_trait;
use axum::{
  Router, middleware,
  routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

use crate::{prelude::*, state::AppState};

pub struct Plugin;

fn api(app: Arc<AppState>) -> Router<Arc<AppState>> {
  Router::new()
    .route("/scope/{kind}", get(handlers::scope))
    .route("/people", get(handlers::list_people).post(handlers::create_person))
    .route("/people/{id}", get(handlers::get_person))
    .route("/people/{id}/status", put(handlers::set_person_status))
    .route("/people/{id}/reports-to", put(handlers::set_reports_to))
    .route("/people/{id}/recruited-by", put(handlers::set_recruited_by))
    .route("/people/{id}/pay-plans", post(handlers::assign_pay_plan))
    .route("/offices/{id}/people", get(handlers::office_people))
    .route("/rules", post(handlers::create_rule))
    .route("/rules/{id}", axum::routing::delete(handlers::deactivate_rule))
    .route("/deals", get(handlers::list_deals).post(handlers::create_deal))
    .route("/deals/{id}", get(handlers::get_deal).patch(handlers::update_deal))
    .route("/deals/{id}/cancel", post(handlers::cancel_deal))
    .route("/deals/{id}/recalculate", post(handlers::recalculate_deal))
    .route("/deals/{id}/commissions", get(handlers::deal_commissions))
    .route("/commissions", get(handlers::list_commissions))
    .route("/commissions/{id}/approve", post(handlers::approve_commission))
    .route("/commissions/{id}/pay", post(handlers::pay_commission))
    .route("/commissions/{id}/void", post(handlers::void_commission))
    .route(
      "/recruits",
      get(handlers::list_recruits).post(handlers::create_recruit),
    )
    .route(
      "/documents",
      get(handlers::list_documents).post(handlers::create_document),
    )
    .route_layer(middleware::from_fn_with_state(app, auth::require_actor))
}

#[async_trait]
impl super::Plugin for Plugin {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let governor_conf = Arc::new(
      GovernorConfigBuilder::default()
        .per_second(2)
        .burst_size(100)
        .finish()
        .context("Failed to build rate limiter config")?,
    );

    let governor_limiter = governor_conf.limiter().clone();

    tokio::spawn(async move {
      loop {
        tokio::time::sleep(Duration::from_secs(60)).await;
        governor_limiter.retain_recent();
      }
    });

    let router = Router::new()
      .route("/health", get(handlers::health))
      .nest("/api", api(app.clone()))
      .layer(
        ServiceBuilder::new()
          .layer(TraceLayer::new_for_http())
          .layer(GovernorLayer::new(governor_conf))
          .layer(
            CorsLayer::new()
              .allow_origin(Any)
              .allow_methods(Any)
              .allow_headers(Any),
          ),
      )
      .with_state(app.clone())
      .into_make_service_with_connect_info::<SocketAddr>();

    let addr = SocketAddr::from(([0, 0, 0, 0], app.config.port));
    let listener = tokio::net::TcpListener::bind(addr)
      .await
      .with_context(|| format!("Failed to bind {addr}"))?;

    info!("HTTP Server listening on {addr}");
    axum::serve(listener, router).await.context("HTTP server stopped")?;

    Ok(())
  }
}
