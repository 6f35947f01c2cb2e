use std::env;

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{header, request::Parts},
    response::IntoResponse,
    routing::{get, post},
    Json,
};
use homestay_core::{IdentityClaim, Role, UserData};

use crate::{
    context::ServerContext,
    errors::ServerError,
    schemas::{TokenSchema, ValidatedJson},
    serialized::{SuccessResult, TokenResult},
    Router,
};

/// Name of the cookie carrying the session token
const TOKEN_COOKIE: &str = "token";
const TOKEN_MAX_AGE_SECONDS: i64 = 365 * 24 * 60 * 60;

/// Wraps the verified identity claim so [FromRequestParts] can be implemented for it.
///
/// Extraction never consults the identity store; it only verifies the token.
pub struct Session(pub IdentityClaim);

/// A session whose account holds the host role
pub struct HostSession(pub UserData);

/// A session whose account holds the admin role
pub struct AdminSession(pub UserData);

/// Pulls the session token out of the cookie, or a Bearer header as a fallback
fn token_from_parts(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|x| x.to_str().ok())
        .and_then(|x| x.strip_prefix("Bearer "))
        .map(|x| x.trim().to_string());

    if bearer.is_some() {
        return bearer;
    }

    parts
        .headers
        .get(header::COOKIE)
        .and_then(|x| x.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').map(str::trim).find_map(|pair| {
                let (name, value) = pair.split_once('=')?;

                (name == TOKEN_COOKIE).then(|| value.to_string())
            })
        })
}

#[async_trait]
impl FromRequestParts<ServerContext> for Session {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerContext,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts);

        let claim = state.marketplace.auth.authenticate(token.as_deref())?;

        Ok(Self(claim))
    }
}

#[async_trait]
impl FromRequestParts<ServerContext> for HostSession {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerContext,
    ) -> Result<Self, Self::Rejection> {
        let Session(claim) = Session::from_request_parts(parts, state).await?;

        let user = state.marketplace.auth.require_role(&claim, Role::Host).await?;

        Ok(Self(user))
    }
}

#[async_trait]
impl FromRequestParts<ServerContext> for AdminSession {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerContext,
    ) -> Result<Self, Self::Rejection> {
        let Session(claim) = Session::from_request_parts(parts, state).await?;

        let user = state
            .marketplace
            .auth
            .require_role(&claim, Role::Admin)
            .await?;

        Ok(Self(user))
    }
}

/// Builds the Set-Cookie value holding the session token.
///
/// SameSite=None requires Secure, so the cross-site variant is only used in
/// production where the server sits behind TLS.
fn session_cookie(token: &str, max_age: i64) -> String {
    let production = env::var("HOMESTAY_ENV")
        .map(|x| x == "production")
        .unwrap_or(false);

    let attributes = if production {
        "Secure; SameSite=None"
    } else {
        "SameSite=Strict"
    };

    format!("{TOKEN_COOKIE}={token}; Max-Age={max_age}; Path=/; HttpOnly; {attributes}")
}

#[utoipa::path(
    post,
    path = "/v1/auth/token",
    tag = "auth",
    request_body = TokenSchema,
    responses(
        (status = 200, body = TokenResult)
    )
)]
pub(crate) async fn issue_token(
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<TokenSchema>,
) -> impl IntoResponse {
    let token = context
        .marketplace
        .auth
        .issue(IdentityClaim { email: body.email });

    let cookie = session_cookie(&token, TOKEN_MAX_AGE_SECONDS);

    (
        [(header::SET_COOKIE, cookie)],
        Json(TokenResult {
            success: true,
            token,
        }),
    )
}

#[utoipa::path(
    get,
    path = "/v1/auth/logout",
    tag = "auth",
    responses(
        (status = 200, body = SuccessResult)
    )
)]
pub(crate) async fn logout() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, session_cookie("", 0))],
        Json(SuccessResult { success: true }),
    )
}

pub fn router() -> Router {
    Router::new()
        .route("/token", post(issue_token))
        .route("/logout", get(logout))
}

#[cfg(test)]
mod test {
    use axum::http::Request;

    use super::*;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder();

        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_token_from_cookie() {
        let parts = parts(&[("cookie", "theme=dark; token=abc123; lang=en")]);

        assert_eq!(token_from_parts(&parts), Some("abc123".to_string()));
    }

    #[test]
    fn test_token_from_bearer_header() {
        let parts = parts(&[("authorization", "Bearer abc123")]);

        assert_eq!(token_from_parts(&parts), Some("abc123".to_string()));
    }

    #[test]
    fn test_missing_token() {
        assert_eq!(token_from_parts(&parts(&[("cookie", "theme=dark")])), None);
        assert_eq!(token_from_parts(&parts(&[])), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc123", 60);

        assert!(cookie.starts_with("token=abc123;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=60"));
    }
}
