//! Per-request identity context
//!
//! Every handler, HTTP or realtime, receives a [`Ctx`] built from the
//! request's session cookie instead of consulting shared session state.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};

use crate::{
    error::{HubError, HubResult},
    models::User,
    state::AppState,
};

pub const SESSION_COOKIE: &str = "study_hub_session";

#[derive(Debug, Clone, Default)]
pub struct Ctx {
    session_token: Option<String>,
    user: Option<User>,
}

impl Ctx {
    /// Resolve a session token to the user behind it.
    ///
    /// Unknown tokens, expired sessions and identifiers that no longer match
    /// a user all yield an anonymous context.
    pub async fn resolve(state: &AppState, session_token: Option<String>) -> HubResult<Self> {
        let Some(token) = session_token else {
            return Ok(Self::default());
        };

        let user_id = state
            .sessions
            .user_id(&token)
            .await
            .map_err(HubError::Session)?;

        let user = match user_id {
            Some(user_id) => state.identity.resolve(&user_id).await?,
            None => None,
        };

        Ok(Self {
            session_token: Some(token),
            user,
        })
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn require_user(&self) -> HubResult<&User> {
        self.user.as_ref().ok_or(HubError::NotAuthenticated)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Ctx {
    type Rejection = HubError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> HubResult<Self> {
        let jar = SignedCookieJar::from_headers(&parts.headers, state.cookie_key.clone());
        let token = jar
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string());
        Ctx::resolve(state, token).await
    }
}

/// Cookie that binds the browser to a session token
///
/// It lives for the browser session; the server-side TTL bounds it further.
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub fn clear_session_cookie(jar: SignedCookieJar) -> SignedCookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}
