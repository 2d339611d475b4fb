//! Identity gateway handler
//!
//! `GET /api/identity/{action}`: the cross-domain session propagation
//! endpoint served on every domain the platform hosts. `login` registers or
//! refreshes the caller's session for the callback origin; `logout` clears
//! every session the author holds and chains each domain's own logout
//! endpoint so domain-scoped cookies get cleared hop by hop.

use axum::extract::{Path, RawQuery, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use tracing::{error, warn};
use url::Url;

use identity_security::cookie::{auth_cookie_name, clear_cookie, read_cookie, set_cookie};
use identity_security::token::IdentityClaims;
use identity_shared::AuthorId;

use crate::response::{found_redirect, temporary_redirect, ApiResponse};
use crate::state::AppState;

/// Query parameters of a gateway request. `next` repeats, so the raw query
/// string is parsed instead of going through a derive.
#[derive(Debug, Default)]
struct GatewayParams {
    callback_url: Option<String>,
    origin: Option<String>,
    next: Vec<String>,
}

impl GatewayParams {
    fn parse(query: Option<&str>) -> Self {
        let mut params = GatewayParams::default();
        for (key, value) in url::form_urlencoded::parse(query.unwrap_or("").as_bytes()) {
            match key.as_ref() {
                "callbackUrl" => params.callback_url = Some(value.into_owned()),
                "origin" => params.origin = Some(value.into_owned()),
                "next" => params.next.push(value.into_owned()),
                _ => {}
            }
        }
        params
    }
}

pub async fn gateway(
    State(state): State<AppState>,
    Path(action): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let params = GatewayParams::parse(query.as_deref());
    let cookie_name = auth_cookie_name(state.config.auth.secure_cookies);

    let session_token = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| read_cookie(cookies, cookie_name))
        .map(str::to_owned);

    let claims = match session_token
        .as_deref()
        .map(|token| state.tokens.validate(token))
    {
        Some(Ok(claims)) => claims,
        Some(Err(e)) => {
            warn!(%action, error = %e, "identity: invalid token");
            return unauthorized(&state, params.callback_url.as_deref());
        }
        None => {
            warn!(%action, "identity: no token");
            return unauthorized(&state, params.callback_url.as_deref());
        }
    };

    let author_id = match claims.author_id() {
        Ok(id) => id,
        Err(e) => {
            warn!(%action, error = %e, "identity: malformed subject claim");
            return unauthorized(&state, params.callback_url.as_deref());
        }
    };

    // session_token is Some here: claims were decoded from it.
    let session_token = session_token.unwrap_or_default();

    match action.as_str() {
        "login" => login(&state, author_id, &claims, &params, &session_token, cookie_name).await,
        "logout" => logout(&state, author_id, &params, cookie_name).await,
        _ => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error(
                "UNKNOWN_ACTION",
                "identity action must be login or logout",
            )),
        )
            .into_response(),
    }
}

async fn login(
    state: &AppState,
    author_id: AuthorId,
    claims: &IdentityClaims,
    params: &GatewayParams,
    session_token: &str,
    cookie_name: &str,
) -> Response {
    let callback_url = match params.callback_url.as_deref().map(Url::parse) {
        Some(Ok(url)) => url,
        Some(Err(e)) => {
            warn!(author_id, error = %e, "login: unparseable callbackUrl");
            return login_error(state, "callbackUrl_is_missing", None);
        }
        None => return login_error(state, "callbackUrl_is_missing", None),
    };

    match state
        .gateway
        .login(author_id, claims.expires_at(), &callback_url, session_token)
        .await
    {
        Ok(_) => {
            let mut target = callback_url.clone();
            target
                .query_pairs_mut()
                .append_pair("token", session_token);

            let max_age = (claims.expires_at() - Utc::now()).num_seconds().max(0);
            let cookie = set_cookie(
                cookie_name,
                session_token,
                max_age,
                state.config.auth.secure_cookies,
            );

            with_cookie(found_redirect(target.as_str()), &cookie)
        }
        Err(e) => {
            error!(author_id, error = %e, "login: session store failure");
            login_error(state, "internal", params.callback_url.as_deref())
        }
    }
}

async fn logout(
    state: &AppState,
    author_id: AuthorId,
    params: &GatewayParams,
    cookie_name: &str,
) -> Response {
    // Chain hops carry the original callback as `origin` instead of
    // `callbackUrl`; accept either.
    let target = params.callback_url.as_deref().or(params.origin.as_deref());
    let callback_url = match target.map(Url::parse) {
        Some(Ok(url)) => url,
        Some(Err(e)) => {
            warn!(author_id, error = %e, "logout: unparseable callback target");
            return login_error(state, "callbackUrl_is_missing", None);
        }
        None => return login_error(state, "callbackUrl_is_missing", None),
    };

    match state
        .gateway
        .logout(author_id, &callback_url, &params.next)
        .await
    {
        Ok(chain) => {
            // Cookie clearing is domain-scoped; each hop clears its own.
            let cookie = clear_cookie(cookie_name, state.config.auth.secure_cookies);
            with_cookie(temporary_redirect(chain.as_str()), &cookie)
        }
        Err(e) => {
            error!(author_id, error = %e, "logout: session store failure");
            login_error(state, "internal", target)
        }
    }
}

fn unauthorized(state: &AppState, callback_url: Option<&str>) -> Response {
    login_error(state, "unauthorized", callback_url)
}

/// `307` to the platform login page with a human-readable `error` value,
/// preserving `callbackUrl` when known so the flow can resume.
fn login_error(state: &AppState, error: &str, callback_url: Option<&str>) -> Response {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query.append_pair("error", error);
    if let Some(cb) = callback_url {
        query.append_pair("callbackUrl", cb);
    }
    let location = format!(
        "{}/login?{}",
        state.config.auth.root_url.trim_end_matches('/'),
        query.finish()
    );
    temporary_redirect(&location)
}

fn with_cookie(mut response: Response, cookie: &str) -> Response {
    match header::HeaderValue::from_str(cookie) {
        Ok(value) => {
            response.headers_mut().insert(header::SET_COOKIE, value);
            response
        }
        Err(e) => {
            error!(error = %e, "identity: unserializable cookie value");
            response
        }
    }
}
