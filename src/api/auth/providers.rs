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

use axum::{Json, debug_handler, extract::State, response::IntoResponse};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::api::auth::types::ProviderListResponse;
use crate::api::error::ApiError;
use crate::gatehouse::ServiceState;

pub(super) fn openapi_router() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new().routes(routes!(get))
}

/// List the configured identity providers.
///
/// Exposes only the provider names and protocol families so a login page can
/// render its buttons. Client credentials and endpoint urls never leave the
/// server.
#[utoipa::path(
    get,
    path = "/providers",
    operation_id = "auth/providers:get",
    responses(
        (status = OK, description = "Configured identity providers", body = ProviderListResponse),
    ),
    tag = "auth"
)]
#[tracing::instrument(name = "api::auth_providers", level = "debug", skip_all, err(Debug))]
#[debug_handler]
pub async fn get(State(state): State<ServiceState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(ProviderListResponse {
        providers: state.registry.describe(),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt; // for `collect`
    use tower::ServiceExt; // for `call`, `oneshot`, and `ready`
    use tower_http::trace::TraceLayer;
    use tracing_test::traced_test;
    use url::Url;

    use super::{super::openapi_router, *};

    use crate::federation::adapter::IdentityAdapter;
    use crate::federation::error::FederationProviderError;
    use crate::federation::registry::ProviderRegistry;
    use crate::federation::types::*;
    use crate::provider::Provider;
    use crate::tests::api::get_mocked_state_with_registry;

    #[derive(Debug)]
    struct StubAdapter {
        name: String,
        kind: ProviderKind,
    }

    #[async_trait]
    impl IdentityAdapter for StubAdapter {
        fn provider_type(&self) -> &str {
            &self.name
        }

        fn kind(&self) -> ProviderKind {
            self.kind
        }

        fn auto_provision(&self) -> bool {
            false
        }

        fn logout_url(&self) -> Option<Url> {
            None
        }

        async fn login_start(
            &self,
            _host: &str,
            _return_to: Option<String>,
        ) -> Result<LoginChallenge, FederationProviderError> {
            unimplemented!()
        }

        async fn handle_callback(
            &self,
            _login_state: LoginState,
            _params: CallbackParams,
        ) -> Result<IdentityAssertion, FederationProviderError> {
            unimplemented!()
        }

        async fn refresh(
            &self,
            _refresh_token: &str,
        ) -> Result<RefreshedTokens, FederationProviderError> {
            unimplemented!()
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn test_list() {
        let mut registry = ProviderRegistry::default();
        registry.register(Arc::new(StubAdapter {
            name: "okta".into(),
            kind: ProviderKind::Oidc,
        }));
        registry.register(Arc::new(StubAdapter {
            name: "adfs".into(),
            kind: ProviderKind::Saml,
        }));

        let provider = Provider::mocked_builder().build().unwrap();
        let state = get_mocked_state_with_registry(provider, registry);

        let mut api = openapi_router()
            .layer(TraceLayer::new_for_http())
            .with_state(state.clone());

        let response = api
            .as_service()
            .oneshot(
                Request::builder()
                    .uri("/providers")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            serde_json::json!([
                {"name": "adfs", "kind": "saml"},
                {"name": "okta", "kind": "oidc"},
            ]),
            body["providers"]
        );
    }
}
