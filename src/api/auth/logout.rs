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
    extract::State,
    response::{IntoResponse, Redirect},
};
use tower_cookies::{Cookie, Cookies};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::api::error::ApiError;
use crate::audit::AuditApi;
use crate::audit::types::AuditEvent;
use crate::gatehouse::ServiceState;
use crate::session::SessionApi;

pub(super) fn openapi_router() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new().routes(routes!(get))
}

/// Terminate the current session.
///
/// Deletes the server-side session and clears the cookie. Logout is
/// idempotent: a request without a live session still succeeds. When the
/// provider that authenticated the session has a central logout endpoint the
/// browser is sent there, otherwise to the site root.
#[utoipa::path(
    get,
    path = "/logout",
    operation_id = "auth/logout:get",
    responses(
        (status = 303, description = "Redirect to the provider logout endpoint or the site root"),
    ),
    tag = "auth"
)]
#[tracing::instrument(
    name = "api::auth_logout",
    level = "debug",
    skip(state, cookies),
    err(Debug)
)]
#[debug_handler]
pub async fn get(
    State(state): State<ServiceState>,
    cookies: Cookies,
) -> Result<impl IntoResponse, ApiError> {
    let mut target = "/".to_string();

    if let Some(cookie) = cookies.get(&state.config.session.cookie_name) {
        let session_id = cookie.value().to_string();
        let sessions = state.provider.get_session_provider();

        if let Some(session) = sessions.get_session(&state, &session_id).await? {
            let account_id = match &session.account_snapshot {
                Some(account) => Some(account.id.clone()),
                None => super::rehydrate_account(&state, &session)
                    .await
                    .ok()
                    .map(|account| account.id),
            };
            if let Some(account_id) = account_id {
                state.provider.get_audit_provider().emit(AuditEvent::Logout {
                    account_id,
                    session_id: session.id.clone(),
                });
            }

            if let Some(adapter) = state.registry.get(&session.provider_type)
                && let Some(logout_url) = adapter.logout_url()
            {
                target = logout_url.to_string();
            }

            sessions.delete_session(&state, &session_id).await?;
        }

        cookies.remove(
            Cookie::build((state.config.session.cookie_name.clone(), ""))
                .path("/")
                .build(),
        );
    }

    Ok(Redirect::to(&target))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt; // for `call`, `oneshot`, and `ready`
    use tower_cookies::CookieManagerLayer;
    use tower_http::trace::TraceLayer;
    use tracing_test::traced_test;

    use super::super::openapi_router;

    use crate::provider::Provider;
    use crate::session::MockSessionProvider;
    use crate::tests::api::get_mocked_state;

    #[tokio::test]
    #[traced_test]
    async fn test_get_without_session() {
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
                    .uri("/logout")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!("/", response.headers()[header::LOCATION]);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_get_with_stale_cookie() {
        let mut session_mock = MockSessionProvider::default();
        session_mock
            .expect_get_session()
            .withf(|_, id: &'_ str| id == "gone")
            .returning(|_, _| Ok(None));

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
                    .uri("/logout")
                    .header(header::COOKIE, "gh_session=gone")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        // Idempotent: the dead cookie is cleared and the browser goes home.
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!("/", response.headers()[header::LOCATION]);
    }
}
