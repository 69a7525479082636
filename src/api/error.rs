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
//! # Gatehouse API error.
//!
//! Everything crossing the trust boundary is deliberately terse: a browser
//! login failure is a generic 401, a webservice denial carries a stable code
//! and nothing else. The full detail goes into the log on this side.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::account::error::AccountProviderError;
use crate::error::GatehouseError;
use crate::federation::error::FederationProviderError;
use crate::session::error::SessionProviderError;
use crate::webservice::types::WsDenyReason;

/// Gatehouse API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("The request you have made requires authentication.")]
    Unauthorized,

    #[error("You are not authorized to perform the requested action.")]
    Forbidden,

    /// Webservice authentication denial carrying its stable wire code.
    #[error("webservice authentication denied: {}", .0.code())]
    WsDenied(WsDenyReason),

    #[error("could not find {resource}: {identifier}")]
    NotFound {
        resource: String,
        identifier: String,
    },

    #[error("{0}.")]
    BadRequest(String),

    #[error("internal server error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Gatehouse {
        #[from]
        source: GatehouseError,
    },

    #[error(transparent)]
    AccountError {
        #[from]
        source: AccountProviderError,
    },

    #[error(transparent)]
    FederationError { source: FederationProviderError },

    #[error(transparent)]
    SessionError {
        #[from]
        source: SessionProviderError,
    },

    #[error(transparent)]
    Serde {
        #[from]
        source: serde_json::Error,
    },
}

impl From<FederationProviderError> for ApiError {
    fn from(source: FederationProviderError) -> Self {
        match source {
            FederationProviderError::ProviderNotFound(name) => {
                Self::BadRequest(format!("unknown identity provider: {name}"))
            }
            // A stale or replayed state tag is an authentication failure,
            // not a server fault.
            FederationProviderError::LoginStateNotFound(..) => Self::Unauthorized,
            _ => Self::FederationError { source },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Error happened during request processing: {:#?}", self);

        let status_code = match &self {
            ApiError::Unauthorized | ApiError::WsDenied(..) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest(..) => StatusCode::BAD_REQUEST,
            ApiError::InternalError(..)
            | ApiError::Gatehouse { .. }
            | ApiError::AccountError { .. }
            | ApiError::FederationError { .. }
            | ApiError::SessionError { .. }
            | ApiError::Serde { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            // Only the stable code. Which rung of the evaluation ladder
            // denied the request stays server-side.
            ApiError::WsDenied(reason) => {
                json!({"error": {"code": status_code.as_u16(), "denial": reason.code()}})
            }
            // Internal detail never leaves the process.
            _ if status_code == StatusCode::INTERNAL_SERVER_ERROR => {
                json!({"error": {"code": status_code.as_u16(), "message": "internal server error"}})
            }
            other => {
                json!({"error": {"code": status_code.as_u16(), "message": other.to_string()}})
            }
        };

        (status_code, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ws_denied_body_carries_only_the_code() {
        let response = ApiError::WsDenied(WsDenyReason::BundleMismatch).into_response();
        assert_eq!(StatusCode::UNAUTHORIZED, response.status());

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!("BUNDLE_MISMATCH", body["error"]["denial"]);
        assert!(body["error"].get("message").is_none());
    }

    #[tokio::test]
    async fn test_internal_detail_is_not_leaked() {
        let response = ApiError::InternalError("connection string".into()).into_response();
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!("internal server error", body["error"]["message"]);
    }
}
