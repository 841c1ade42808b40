#![recursion_limit = "256"]

mod config;
mod db;
mod models;
mod rate_limit;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::services::users::{self, MemoryUserStore, PgUserStore, UserStore};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = config::Settings::from_env().expect("invalid configuration");
    let port = settings.port;
    tracing::info!(environment = ?settings.environment, "configuration loaded");

    let user_store: Arc<dyn UserStore> = match &settings.database_url {
        Some(url) => {
            let pool = db::init_pool(url, settings.db_max_connections)
                .await
                .expect("database init failed");
            tracing::info!("using postgres user store");
            Arc::new(PgUserStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; accounts are kept in memory only");
            Arc::new(MemoryUserStore::new())
        }
    };

    if let Some(admin) = &settings.bootstrap_admin {
        match users::ensure_bootstrap_admin(&user_store, admin).await {
            Ok(true) => tracing::info!(email = %admin.email, "bootstrap admin created"),
            Ok(false) => tracing::debug!(email = %admin.email, "bootstrap admin already present"),
            Err(e) => panic!("bootstrap admin failed: {e}"),
        }
    }

    let mpesa = settings.mpesa.clone().map(|mpesa_settings| {
        tracing::info!(base_url = %mpesa_settings.base_url, "m-pesa fee payments enabled");
        services::mpesa::MpesaClient::new(mpesa_settings).expect("m-pesa client init failed")
    });
    if mpesa.is_none() {
        tracing::info!("MPESA_* not set; fee payment routes answer 503");
    }

    let mut state = state::AppState::new(settings, user_store);
    if let Some(client) = mpesa {
        state = state.with_mpesa(client);
    }

    let app = routes::leptos_app(state).expect("leptos app init failed");
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "asili listening");
    axum::serve(listener, app).await.expect("server failed");
}
