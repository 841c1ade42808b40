//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! Clone is required by Axum; every field is either `Arc`-wrapped or cheap to
//! clone.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Settings;
use crate::rate_limit::LoginRateLimiter;
use crate::services::mpesa::MpesaClient;
use crate::services::token::TokenSigner;
use crate::services::users::UserStore;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub users: Arc<dyn UserStore>,
    pub tokens: TokenSigner,
    pub login_limiter: LoginRateLimiter,
    /// Present only when Daraja credentials are configured.
    pub mpesa: Option<Arc<MpesaClient>>,
}

impl AppState {
    /// Assemble state from parsed settings and a user store.
    ///
    /// Without a configured `JWT_SECRET` the signer uses a random key, so
    /// issued tokens do not survive a restart.
    #[must_use]
    pub fn new(settings: Settings, users: Arc<dyn UserStore>) -> Self {
        let ttl = Duration::from_secs(settings.access_token_expire_minutes.saturating_mul(60));
        let tokens = match &settings.jwt_secret {
            Some(secret) => TokenSigner::new(secret.as_bytes(), ttl),
            None => {
                tracing::warn!("JWT_SECRET not set; using an ephemeral signing key");
                TokenSigner::ephemeral(ttl)
            }
        };
        let login_limiter =
            LoginRateLimiter::new(settings.login_rate_limit, Duration::from_secs(settings.login_rate_window_secs));
        Self { settings: Arc::new(settings), users, tokens, login_limiter, mpesa: None }
    }

    #[must_use]
    pub fn with_mpesa(mut self, client: MpesaClient) -> Self {
        self.mpesa = Some(Arc::new(client));
        self
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::extract::{Query, State};
    use axum::http::{HeaderMap, StatusCode, header};
    use axum::response::{IntoResponse, Response};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    use super::*;
    use crate::config::MpesaSettings;
    use crate::models::{NewUser, User, UserRole};
    use crate::services::mpesa;
    use crate::services::users::{self, MemoryUserStore};

    pub const TEST_PASSWORD: &str = "Harambee-2030";

    /// `AppState` on an empty in-memory store with a fixed signing key.
    #[must_use]
    pub fn test_app_state() -> AppState {
        let settings = Settings { jwt_secret: Some("x".repeat(32)), ..Settings::default() };
        AppState::new(settings, Arc::new(MemoryUserStore::new()))
    }

    /// Register a user with [`TEST_PASSWORD`] and return it.
    pub async fn seed_user(state: &AppState, email: &str, role: UserRole) -> User {
        let new_user = NewUser {
            email: email.to_owned(),
            first_name: "Achieng".to_owned(),
            last_name: "Mwangi".to_owned(),
            password: TEST_PASSWORD.to_owned(),
            role,
        };
        users::register(state.users.as_ref(), new_user)
            .await
            .expect("seed user should register")
    }

    // =========================================================================
    // MOCK DARAJA
    // =========================================================================

    pub const MOCK_CONSUMER_KEY: &str = "consumer-key";
    pub const MOCK_CONSUMER_SECRET: &str = "consumer-secret";
    pub const MOCK_ACCESS_TOKEN: &str = "mock-access-token";
    pub const MOCK_SHORTCODE: &str = "174379";
    pub const MOCK_PASSKEY: &str = "mock-passkey";
    pub const MOCK_CALLBACK_URL: &str = "https://asili.test/api/v1/fees/mpesa-callback";
    /// Account reference the mock answers with a non-zero `ResponseCode`.
    pub const MOCK_DECLINED_REFERENCE: &str = "DECLINE";

    /// Local stand-in for the Daraja OAuth and STK push endpoints.
    #[derive(Clone, Default)]
    pub struct MockDaraja {
        pub token_calls: Arc<AtomicUsize>,
        pub pushes: Arc<StdMutex<Vec<serde_json::Value>>>,
    }

    impl MockDaraja {
        #[must_use]
        pub fn pushes(&self) -> Vec<serde_json::Value> {
            self.pushes.lock().unwrap().clone()
        }
    }

    async fn mock_token(
        State(mock): State<MockDaraja>,
        Query(query): Query<HashMap<String, String>>,
        headers: HeaderMap,
    ) -> Response {
        mock.token_calls.fetch_add(1, Ordering::SeqCst);
        let expected = format!(
            "Basic {}",
            STANDARD.encode(format!("{MOCK_CONSUMER_KEY}:{MOCK_CONSUMER_SECRET}"))
        );
        let authorized = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) == Some(expected.as_str());
        if !authorized || query.get("grant_type").map(String::as_str) != Some("client_credentials") {
            return (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "errorMessage": "Invalid credentials" })))
                .into_response();
        }
        Json(serde_json::json!({ "access_token": MOCK_ACCESS_TOKEN, "expires_in": "3599" })).into_response()
    }

    async fn mock_stk_push(
        State(mock): State<MockDaraja>,
        headers: HeaderMap,
        Json(body): Json<serde_json::Value>,
    ) -> Response {
        let expected = format!("Bearer {MOCK_ACCESS_TOKEN}");
        if headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) != Some(expected.as_str()) {
            return (StatusCode::UNAUTHORIZED, Json(serde_json::json!({ "errorMessage": "Invalid Access Token" })))
                .into_response();
        }
        let declined = body["AccountReference"] == MOCK_DECLINED_REFERENCE;
        mock.pushes.lock().unwrap().push(body);
        let code = if declined { "1" } else { "0" };
        Json(serde_json::json!({
            "MerchantRequestID": "29115-34620561-1",
            "CheckoutRequestID": "ws_CO_191220191020363925",
            "ResponseCode": code,
            "ResponseDescription": "Success. Request accepted for processing",
            "CustomerMessage": "Success. Request accepted for processing",
        }))
        .into_response()
    }

    /// Serve a mock Daraja on an ephemeral port and return matching settings.
    pub async fn spawn_mock_daraja() -> (MockDaraja, MpesaSettings) {
        let mock = MockDaraja::default();
        let app = Router::new()
            .route(mpesa::TOKEN_PATH, get(mock_token))
            .route(mpesa::STK_PUSH_PATH, post(mock_stk_push))
            .with_state(mock.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let settings = MpesaSettings {
            base_url: format!("http://{addr}"),
            consumer_key: MOCK_CONSUMER_KEY.to_owned(),
            consumer_secret: MOCK_CONSUMER_SECRET.to_owned(),
            shortcode: MOCK_SHORTCODE.to_owned(),
            passkey: MOCK_PASSKEY.to_owned(),
            callback_url: MOCK_CALLBACK_URL.to_owned(),
        };
        (mock, settings)
    }

    /// [`test_app_state`] wired to a fresh mock Daraja.
    pub async fn test_app_state_with_mpesa() -> (AppState, MockDaraja) {
        let (mock, settings) = spawn_mock_daraja().await;
        let state = test_app_state().with_mpesa(MpesaClient::new(settings).unwrap());
        (state, mock)
    }
}
