//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the versioned JSON API and stitches it with Leptos SSR
//! rendering under a single Axum router. API routes live under `/api/v1`;
//! the Leptos app owns `/` and `/dashboard`, and the service banner lives
//! at `/api`.

pub mod analytics;
pub mod auth;
pub mod error;
pub mod fees;

use std::path::PathBuf;

use axum::Json;
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use leptos::prelude::*;
use leptos_axum::{LeptosRoutes, generate_route_list};
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) if value != "*" => Some(value),
            _ => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Versioned JSON API plus service banner and health check.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.allowed_origins);

    Router::new()
        .route("/api", get(root))
        .route("/health", get(health))
        .route("/api/v1/auth/token", post(auth::issue_token))
        .route("/api/v1/auth/me", get(auth::me))
        .route("/api/v1/analytics/sdg4", get(analytics::sdg4))
        .route("/api/v1/analytics/attendance/anomalies", post(analytics::attendance_anomalies))
        .route("/api/v1/fees/mpesa/stk-push", post(fees::stk_push))
        .route(crate::services::mpesa::CALLBACK_PATH, post(fees::mpesa_callback))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API routes + Leptos SSR pages + static `/pkg` assets and the web manifest.
///
/// # Errors
///
/// Returns an error if the Leptos configuration cannot be loaded (missing or
/// malformed `[package.metadata.leptos]` section).
pub fn leptos_app(state: AppState) -> Result<Router, String> {
    let conf = get_configuration(None).map_err(|e| format!("leptos configuration: {e}"))?;
    let leptos_options = conf.leptos_options;
    let routes = generate_route_list(client::app::App);

    let leptos_router = Router::new()
        .leptos_routes(&leptos_options, routes, {
            let opts = leptos_options.clone();
            move || client::app::shell(opts.clone())
        })
        .with_state(leptos_options.clone());

    let site_root_path = PathBuf::from(leptos_options.site_root.as_ref());

    Ok(app(state)
        .merge(leptos_router)
        .nest_service("/pkg", ServeDir::new(site_root_path.join("pkg")))
        .route_service("/manifest.json", ServeFile::new(site_root_path.join("manifest.json")))
        .layer(CompressionLayer::new()))
}

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub message: &'static str,
    pub version: &'static str,
    pub sdg_alignment: &'static str,
}

async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Asili SSMS API - Quality Education for Kenya",
        version: SERVICE_VERSION,
        sdg_alignment: crate::services::metrics::GOAL,
    })
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub timestamp: String,
}

async fn health() -> Json<Health> {
    let timestamp = OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default();
    Json(Health { status: "healthy", timestamp })
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
