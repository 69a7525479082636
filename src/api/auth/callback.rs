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

use axum::{
    Form, debug_handler,
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use tower_cookies::{
    Cookie, Cookies,
    cookie::SameSite,
};
use tracing::warn;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::api::error::ApiError;
use crate::audit::AuditApi;
use crate::audit::types::AuditEvent;
use crate::federation::FederationApi;
use crate::federation::types::CallbackParams;
use crate::gatehouse::ServiceState;
use crate::resolution::{ResolutionOutcome, resolve};
use crate::session::SessionApi;
use crate::session::types::SessionCreate;

pub(super) fn openapi_router() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new().routes(routes!(get, post))
}

/// Identity provider callback (authorization code flows).
///
/// OIDC and OAuth2 providers redirect the browser here with the
/// authorization code and the state tag issued at login initiation.
#[utoipa::path(
    get,
    path = "/callback",
    operation_id = "auth/callback:get",
    responses(
        (status = 303, description = "Redirect to the post-login target or the error page"),
        (status = 401, description = "Unknown, expired or replayed state tag"),
    ),
    tag = "auth"
)]
#[tracing::instrument(
    name = "api::auth_callback",
    level = "debug",
    skip(state, cookies, params),
    err(Debug)
)]
#[debug_handler]
pub async fn get(
    State(state): State<ServiceState>,
    cookies: Cookies,
    Query(params): Query<CallbackParams>,
) -> Result<impl IntoResponse, ApiError> {
    complete_login(state, cookies, params).await
}

/// Identity provider callback (SAML POST binding).
///
/// SAML providers deliver the response document as a form POST with the
/// state tag riding in `RelayState`.
#[utoipa::path(
    post,
    path = "/callback",
    operation_id = "auth/callback:post",
    responses(
        (status = 303, description = "Redirect to the post-login target or the error page"),
        (status = 401, description = "Unknown, expired or replayed state tag"),
    ),
    tag = "auth"
)]
#[tracing::instrument(
    name = "api::auth_callback",
    level = "debug",
    skip(state, cookies, params),
    err(Debug)
)]
#[debug_handler]
pub async fn post(
    State(state): State<ServiceState>,
    cookies: Cookies,
    Form(params): Form<CallbackParams>,
) -> Result<impl IntoResponse, ApiError> {
    complete_login(state, cookies, params).await
}

/// The shared callback path: consume the pending login, verify the protocol
/// material, resolve the identity onto an account and establish the session.
///
/// A failed verification or a rejected resolution sends the browser to the
/// generic error page; why it failed lands only in the log and the audit
/// trail.
async fn complete_login(
    state: ServiceState,
    cookies: Cookies,
    params: CallbackParams,
) -> Result<Redirect, ApiError> {
    let tag = params
        .state
        .clone()
        .or_else(|| params.relay_state.clone())
        .ok_or_else(|| ApiError::BadRequest("missing state parameter".into()))?;

    // Single use: the row is gone after this even when verification fails.
    let login_state = state
        .provider
        .get_federation_provider()
        .take_login_state(&state, &tag)
        .await?;

    let provider_type = login_state.provider_type.clone();
    let return_to = login_state.return_to.clone();
    let adapter = state
        .registry
        .get(&provider_type)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown identity provider: {provider_type}")))?;

    let assertion = match adapter.handle_callback(login_state, params).await {
        Ok(assertion) => assertion,
        Err(err) => {
            warn!("Callback verification against {provider_type} failed: {err}");
            state
                .provider
                .get_audit_provider()
                .emit(AuditEvent::LoginRejected {
                    provider_type,
                    external_id: None,
                    reason: "protocol_error".into(),
                });
            return Ok(Redirect::to(&state.config.federation.error_page));
        }
    };

    match resolve(&state, &assertion, adapter.auto_provision()).await? {
        ResolutionOutcome::Accepted { account, .. } => {
            let session = state
                .provider
                .get_session_provider()
                .create_session(
                    &state,
                    SessionCreate {
                        id: String::new(),
                        provider_type: assertion.provider_type.clone(),
                        external_id: assertion.external_id.clone(),
                        email: assertion.email.clone(),
                        access_token: assertion.access_token.clone(),
                        refresh_token: assertion.refresh_token.clone(),
                        token_expires_at: assertion.token_expires_at,
                        account_snapshot: Some(account),
                        expires_at: None,
                    },
                )
                .await?;

            cookies.add(
                Cookie::build((state.config.session.cookie_name.clone(), session.id))
                    .path("/")
                    .http_only(true)
                    .secure(state.config.session.cookie_secure)
                    .same_site(SameSite::Lax)
                    .build(),
            );

            Ok(Redirect::to(return_to.as_deref().unwrap_or("/")))
        }
        ResolutionOutcome::Rejected(..) => Ok(Redirect::to(&state.config.federation.error_page)),
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt; // for `call`, `oneshot`, and `ready`
    use tower_cookies::CookieManagerLayer;
    use tower_http::trace::TraceLayer;
    use tracing_test::traced_test;

    use super::super::openapi_router;

    use crate::federation::error::FederationProviderError;
    use crate::federation::MockFederationProvider;
    use crate::provider::Provider;
    use crate::tests::api::get_mocked_state;

    #[tokio::test]
    #[traced_test]
    async fn test_get_missing_state() {
        let provider = Provider::mocked_builder().build().unwrap();
        let state = get_mocked_state(provider);

        let mut api = openapi_router()
            .layer(CookieManagerLayer::new())
            .layer(TraceLayer::new_for_http())
            .with_state(state.clone());

        let response = api
            .as_service()
            .oneshot(
                Request::builder()
                    .uri("/callback?code=abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_get_replayed_state() {
        let mut federation_mock = MockFederationProvider::default();
        federation_mock
            .expect_take_login_state()
            .withf(|_, tag: &'_ str| tag == "okta.abc")
            .returning(|_, tag| Err(FederationProviderError::LoginStateNotFound(tag.to_string())));

        let provider = Provider::mocked_builder()
            .federation(federation_mock)
            .build()
            .unwrap();
        let state = get_mocked_state(provider);

        let mut api = openapi_router()
            .layer(CookieManagerLayer::new())
            .layer(TraceLayer::new_for_http())
            .with_state(state.clone());

        let response = api
            .as_service()
            .oneshot(
                Request::builder()
                    .uri("/callback?code=abc&state=okta.abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        // A consumed or expired tag is indistinguishable from a forged one.
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
