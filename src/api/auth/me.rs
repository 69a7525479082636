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

use axum::{Json, debug_handler, response::IntoResponse};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::api::auth::Authenticated;
use crate::api::auth::types::AccountResponse;
use crate::api::error::ApiError;
use crate::gatehouse::ServiceState;

pub(super) fn openapi_router() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new().routes(routes!(get))
}

/// The account behind the current session.
#[utoipa::path(
    get,
    path = "/me",
    operation_id = "auth/me:get",
    responses(
        (status = OK, description = "The authenticated account", body = AccountResponse),
        (status = 401, description = "No valid session"),
    ),
    security(("session_cookie" = [])),
    tag = "auth"
)]
#[tracing::instrument(name = "api::auth_me", level = "debug", skip_all, err(Debug))]
#[debug_handler(state = ServiceState)]
pub async fn get(auth: Authenticated) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(AccountResponse::from(auth.account)))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use http_body_util::BodyExt; // for `collect`
    use tower::ServiceExt; // for `call`, `oneshot`, and `ready`
    use tower_cookies::CookieManagerLayer;
    use tower_http::trace::TraceLayer;
    use tracing_test::traced_test;

    use super::{super::openapi_router, *};

    use crate::account::types::Account;
    use crate::provider::Provider;
    use crate::session::MockSessionProvider;
    use crate::session::types::Session;
    use crate::tests::api::{get_mocked_state, get_mocked_state_unauthed};

    #[tokio::test]
    #[traced_test]
    async fn test_get_unauthed() {
        let state = get_mocked_state_unauthed();

        let mut api = openapi_router()
            .layer(CookieManagerLayer::new())
            .layer(TraceLayer::new_for_http())
            .with_state(state.clone());

        let response = api
            .as_service()
            .oneshot(Request::builder().uri("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_get() {
        let mut session_mock = MockSessionProvider::default();
        session_mock
            .expect_get_session()
            .withf(|_, id: &'_ str| id == "sid-1")
            .returning(|_, _| {
                Ok(Some(Session {
                    id: "sid-1".into(),
                    provider_type: "okta".into(),
                    external_id: "sub-1".into(),
                    email: "jane@example.com".into(),
                    access_token: "at".into(),
                    account_snapshot: Some(Account {
                        id: "acc-1".into(),
                        email: "jane@example.com".into(),
                        name: "Jane".into(),
                        enabled: true,
                        ..Default::default()
                    }),
                    ..Default::default()
                }))
            });

        let provider = Provider::mocked_builder()
            .session(session_mock)
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
                    .uri("/me")
                    .header(header::COOKIE, "gh_session=sid-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let account: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!("acc-1", account["id"]);
        assert_eq!("jane@example.com", account["email"]);
    }
}
