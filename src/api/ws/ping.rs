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

use crate::api::error::ApiError;
use crate::api::ws::WsTrust;
use crate::api::ws::types::PingResponse;
use crate::gatehouse::ServiceState;

pub(super) fn openapi_router() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new().routes(routes!(get))
}

/// Authenticated connectivity check.
///
/// Lets an integrating client verify its credentials and bundle admission
/// without touching any business endpoint.
#[utoipa::path(
    get,
    path = "/{bundle_code}/ping",
    operation_id = "ws/ping:get",
    params(
        ("bundle_code" = String, Path, description = "Bundle code the client claims admission to"),
    ),
    responses(
        (status = OK, description = "Credentials accepted", body = PingResponse),
        (status = 401, description = "Authentication denied"),
    ),
    security(("ws_client_key" = [], "ws_client_secret" = [])),
    tag = "ws"
)]
#[tracing::instrument(name = "api::ws_ping", level = "debug", skip_all, err(Debug))]
#[debug_handler(state = ServiceState)]
pub async fn get(auth: WsTrust) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(PingResponse {
        bundle_code: auth.trust.bundle_code,
        client_name: auth.trust.client_name,
    }))
}
