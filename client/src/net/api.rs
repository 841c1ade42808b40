//! REST API helpers for communicating with the server.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`.
//! Server-side (SSR): stubs returning an error since login is only
//! meaningful in the browser.
//!
//! ERROR HANDLING
//! ==============
//! Every login failure collapses to `LOGIN_FAILED_MESSAGE`. Transport errors,
//! rejected credentials and malformed bodies look the same to the user; the
//! underlying cause is only logged.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::future::Future;

use super::types::TokenResponse;
use crate::state::session::Session;

pub const LOGIN_ENDPOINT: &str = "/api/v1/auth/token";
pub const LOGIN_FAILED_MESSAGE: &str = "Invalid credentials. Please try again.";

/// Form fields for the token request, in wire order.
#[must_use]
pub fn login_form_fields(email: &str, password: &str) -> Vec<(&'static str, String)> {
    vec![("username", email.to_owned()), ("password", password.to_owned())]
}

/// Run one login attempt through `send` and turn the reply into a session.
///
/// `send` is invoked exactly once with the endpoint and form fields.
///
/// # Errors
///
/// Returns `LOGIN_FAILED_MESSAGE` when `send` fails or the reply carries no
/// usable token or role.
pub async fn submit_login<F, Fut>(email: &str, password: &str, send: F) -> Result<Session, String>
where
    F: FnOnce(&'static str, Vec<(&'static str, String)>) -> Fut,
    Fut: Future<Output = Result<TokenResponse, String>>,
{
    let reply = send(LOGIN_ENDPOINT, login_form_fields(email, password)).await;
    match reply {
        Ok(body) => Session::from_parts(Some(body.access_token), Some(body.role))
            .ok_or_else(|| LOGIN_FAILED_MESSAGE.to_owned()),
        Err(_cause) => {
            #[cfg(feature = "hydrate")]
            log::warn!("login failed: {_cause}");
            Err(LOGIN_FAILED_MESSAGE.to_owned())
        }
    }
}

/// Log in against the server with a form-encoded `POST`.
///
/// # Errors
///
/// Returns `LOGIN_FAILED_MESSAGE` on any failure.
pub async fn login(email: &str, password: &str) -> Result<Session, String> {
    #[cfg(feature = "hydrate")]
    {
        submit_login(email, password, post_login_form).await
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (email, password);
        Err(LOGIN_FAILED_MESSAGE.to_owned())
    }
}

#[cfg(feature = "hydrate")]
async fn post_login_form(url: &'static str, fields: Vec<(&'static str, String)>) -> Result<TokenResponse, String> {
    let params = web_sys::UrlSearchParams::new().map_err(|_| "form encoding unavailable".to_owned())?;
    for (name, value) in &fields {
        params.append(name, value);
    }
    let body: String = params.to_string().into();

    let resp = gloo_net::http::Request::post(url)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(body)
        .map_err(|e| e.to_string())?
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !resp.ok() {
        let detail = resp
            .json::<super::types::ErrorDetail>()
            .await
            .map(|d| d.detail)
            .unwrap_or_default();
        return Err(format!("token request failed: {} {detail}", resp.status()));
    }
    resp.json::<TokenResponse>().await.map_err(|e| e.to_string())
}
