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
    debug_handler,
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect},
};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::api::auth::types::LoginQuery;
use crate::api::error::ApiError;
use crate::federation::FederationApi;
use crate::federation::types::LoginChallenge;
use crate::gatehouse::ServiceState;

pub(super) fn openapi_router() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new().routes(routes!(get))
}

/// Initiate an external login.
///
/// Picks the requested identity provider (or the configured default),
/// persists the pending login state and sends the browser to the provider's
/// authorization endpoint. The provider redirects back to the shared
/// `/auth/callback` endpoint once the user authenticated.
///
/// This is an unauthenticated endpoint; the identity is established when the
/// callback is invoked.
#[utoipa::path(
    get,
    path = "/login",
    operation_id = "auth/login:get",
    params(LoginQuery),
    responses(
        (status = 303, description = "Redirect to the identity provider"),
        (status = 400, description = "Unknown identity provider"),
    ),
    tag = "auth"
)]
#[tracing::instrument(name = "api::auth_login", level = "debug", skip(state), err(Debug))]
#[debug_handler]
pub async fn get(
    State(state): State<ServiceState>,
    headers: HeaderMap,
    Query(query): Query<LoginQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let adapter = state.registry.select(query.provider.as_deref(), None)?;
    let host = super::request_host(&headers)?;

    let LoginChallenge {
        auth_url,
        login_state,
    } = adapter
        .login_start(&host, super::sanitize_return_to(query.return_to))
        .await?;

    // The pending state must be durable before the browser leaves, or the
    // callback has nothing to correlate against.
    state
        .provider
        .get_federation_provider()
        .create_login_state(&state, login_state)
        .await?;

    Ok(Redirect::to(auth_url.as_str()))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt; // for `call`, `oneshot`, and `ready`
    use tower_http::trace::TraceLayer;
    use tracing_test::traced_test;

    use super::super::openapi_router;

    use crate::provider::Provider;
    use crate::tests::api::get_mocked_state;

    #[tokio::test]
    #[traced_test]
    async fn test_get_unknown_provider() {
        let provider = Provider::mocked_builder().build().unwrap();
        let state = get_mocked_state(provider);

        let mut api = openapi_router()
            .layer(TraceLayer::new_for_http())
            .with_state(state.clone());

        // An explicit hint that matches nothing.
        let response = api
            .as_service()
            .oneshot(
                Request::builder()
                    .uri("/login?provider=ghost")
                    .header("host", "portal.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // No hint and no configured default.
        let response = api
            .as_service()
            .oneshot(
                Request::builder()
                    .uri("/login")
                    .header("host", "portal.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
