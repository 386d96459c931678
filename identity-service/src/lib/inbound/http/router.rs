use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use auth::Role;
use auth::RoutePolicy;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::guard::guarded;
use super::handlers::assign_role::assign_role;
use super::handlers::change_password::change_password;
use super::handlers::current_account::current_account;
use super::handlers::health::health;
use super::handlers::list_accounts::list_accounts;
use super::handlers::login::login;
use super::handlers::register::register;
use super::middleware::resolve_identity;
use crate::domain::account::ports::AccountServicePort;

#[derive(Clone)]
pub struct AppState {
    pub account_service: Arc<dyn AccountServicePort>,
}

/// Build the HTTP application.
///
/// Every route declares its access policy next to its handler. Identity is
/// resolved once per request for the whole router, before any guard runs.
pub fn create_router(
    account_service: Arc<dyn AccountServicePort>,
    authenticator: Arc<Authenticator>,
) -> Router {
    let state = AppState { account_service };
    let admin_only = || RoutePolicy::requires([Role::Admin]);

    let routes = Router::new()
        .route("/health", guarded(RoutePolicy::Public, get(health)))
        .route("/auth/register", guarded(RoutePolicy::Public, post(register)))
        .route("/auth/login", guarded(RoutePolicy::Public, post(login)))
        .route(
            "/auth/me",
            guarded(RoutePolicy::AnyAuthenticated, get(current_account)),
        )
        .route(
            "/auth/password",
            guarded(RoutePolicy::AnyAuthenticated, put(change_password)),
        )
        .route("/admin/accounts", guarded(admin_only(), get(list_accounts)))
        .route(
            "/admin/accounts/:email/role",
            guarded(admin_only(), put(assign_role)),
        );

    // Headers are left out of the span: they carry bearer tokens
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    routes
        .layer(
            ServiceBuilder::new()
                .layer(trace_layer)
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn_with_state(
                    authenticator,
                    resolve_identity,
                )),
        )
        .with_state(state)
}
