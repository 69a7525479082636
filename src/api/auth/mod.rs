// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0
//! # Interactive authentication API
//!
//! The browser-facing half of the trust boundary: login initiation, the
//! shared provider callback, logout and session introspection. All session
//! state lives server-side; the browser only ever holds the opaque cookie.
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use chrono::Utc;
use tower_cookies::Cookies;
use tracing::warn;
use utoipa_axum::router::OpenApiRouter;

pub mod callback;
pub mod login;
pub mod logout;
pub mod me;
pub mod providers;
pub mod types;

use crate::account::AccountApi;
use crate::account::types::Account;
use crate::api::error::ApiError;
use crate::context::{Caller, RequestContext};
use crate::gatehouse::ServiceState;
use crate::session::SessionApi;
use crate::session::types::{Session, SessionTokenUpdate};

pub(super) const DESCRIPTION: &str =
    "Interactive authentication: identity provider logins and browser sessions.";

pub fn openapi_router() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .merge(login::openapi_router())
        .merge(callback::openapi_router())
        .merge(logout::openapi_router())
        .merge(me::openapi_router())
        .merge(providers::openapi_router())
}

/// The authentication gate for browser-facing endpoints.
///
/// Resolves the session cookie into an account, transparently attempting at
/// most one token refresh when the provider access token has expired. Any
/// failure on the way collapses into a generic 401; a session that cannot be
/// made valid again is torn down on the spot.
pub struct Authenticated {
    /// The resolved account.
    pub account: Account,

    /// The backing session.
    pub session: Session,
}

impl FromRequestParts<ServiceState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServiceState,
    ) -> Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Unauthorized)?;
        let Some(cookie) = cookies.get(&state.config.session.cookie_name) else {
            return Err(ApiError::Unauthorized);
        };
        let session_id = cookie.value().to_string();

        let sessions = state.provider.get_session_provider();
        let Some(mut session) = sessions.get_session(state, &session_id).await? else {
            return Err(ApiError::Unauthorized);
        };

        // At most one transparent refresh per request. A second failure in
        // the same request means the session is beyond saving.
        if let Some(token_expires_at) = session.token_expires_at
            && token_expires_at <= Utc::now()
        {
            session = match refresh_session_tokens(state, session).await {
                Ok(session) => session,
                Err(err) => {
                    warn!("Tearing down session after failed token refresh: {err}");
                    sessions.delete_session(state, &session_id).await.ok();
                    return Err(ApiError::Unauthorized);
                }
            };
        }

        let account = match &session.account_snapshot {
            Some(account) => account.clone(),
            None => rehydrate_account(state, &session).await?,
        };
        if !account.enabled {
            sessions.delete_session(state, &session_id).await.ok();
            return Err(ApiError::Unauthorized);
        }

        if let Some(ctx) = RequestContext::try_current() {
            ctx.set_caller(Caller::Account {
                account_id: account.id.clone(),
                session_id: session.id.clone(),
            });
        }

        Ok(Self { account, session })
    }
}

/// Exchange the refresh token held by the session for a fresh bundle.
async fn refresh_session_tokens(
    state: &ServiceState,
    session: Session,
) -> Result<Session, ApiError> {
    let Some(refresh_token) = session.refresh_token.clone() else {
        return Err(ApiError::Unauthorized);
    };
    let adapter = state
        .registry
        .get(&session.provider_type)
        .ok_or(ApiError::Unauthorized)?;
    let tokens = adapter.refresh(&refresh_token).await.map_err(|err| {
        warn!(
            "Token refresh against {} failed: {err}",
            session.provider_type
        );
        ApiError::Unauthorized
    })?;

    Ok(state
        .provider
        .get_session_provider()
        .update_session_tokens(
            state,
            &session.id,
            SessionTokenUpdate {
                access_token: tokens.access_token,
                // Providers that do not rotate keep the old one valid.
                refresh_token: tokens.refresh_token.or(Some(refresh_token)),
                token_expires_at: tokens.token_expires_at,
            },
        )
        .await?)
}

/// Resolve the account of a session carrying no snapshot.
async fn rehydrate_account(
    state: &ServiceState,
    session: &Session,
) -> Result<Account, ApiError> {
    let accounts = state.provider.get_account_provider();
    let Some(identity) = accounts
        .find_external_identity(state, &session.provider_type, &session.external_id)
        .await?
    else {
        return Err(ApiError::Unauthorized);
    };
    accounts
        .get_account(state, &identity.account_id)
        .await?
        .ok_or(ApiError::Unauthorized)
}

/// The host the browser addressed, used to derive the per-host callback
/// url.
pub(super) fn request_host(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(header::HOST)
        .and_then(|host| host.to_str().ok())
        .map(ToString::to_string)
        .ok_or_else(|| ApiError::BadRequest("missing Host header".into()))
}

/// Accept only relative `return_to` targets. Anything that could leave the
/// deployment (absolute urls, protocol-relative `//host`) is dropped.
pub(super) fn sanitize_return_to(return_to: Option<String>) -> Option<String> {
    return_to.filter(|target| target.starts_with('/') && !target.starts_with("//"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_return_to() {
        assert_eq!(
            Some("/dashboard".to_string()),
            sanitize_return_to(Some("/dashboard".into()))
        );
        assert_eq!(None, sanitize_return_to(Some("https://evil.example".into())));
        assert_eq!(None, sanitize_return_to(Some("//evil.example".into())));
        assert_eq!(None, sanitize_return_to(None));
    }
}
