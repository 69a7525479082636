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
//! Gatehouse API
use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};
use utoipa_axum::router::OpenApiRouter;

use crate::gatehouse::ServiceState;

pub mod auth;
pub mod error;
pub mod ws;

#[derive(OpenApi)]
#[openapi(
    info(version = "1.0.0"),
    modifiers(&SecurityAddon),
    tags(
        (name="auth", description=auth::DESCRIPTION),
        (name="ws", description=ws::DESCRIPTION),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "gh_session",
                    "Opaque session id established through /auth/login",
                ))),
            );
            components.add_security_scheme(
                "ws_client_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-ws-client-key"))),
            );
            components.add_security_scheme(
                "ws_client_secret",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-ws-client-secret"))),
            );
        }
    }
}

pub fn openapi_router() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .nest("/auth", auth::openapi_router())
        .nest("/ws", ws::openapi_router())
}
