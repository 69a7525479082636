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
//! # Webservice API
//!
//! The machine-facing half of the trust boundary. Every route under
//! `/ws/{bundle_code}` passes the [WsTrust] gate: key/secret credentials are
//! evaluated against the client, bundle and IP allow-list rules, and a denial
//! surfaces nothing but a stable code.
use std::collections::HashMap;

use axum::{
    extract::{FromRequestParts, Path},
    http::{HeaderMap, header, request::Parts},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use secrecy::SecretString;
use utoipa_axum::router::OpenApiRouter;

pub mod ping;
pub mod types;

use crate::api::error::ApiError;
use crate::audit::AuditApi;
use crate::audit::types::AuditEvent;
use crate::context::{Caller, RequestContext};
use crate::gatehouse::ServiceState;
use crate::webservice::WebserviceApi;
use crate::webservice::types::{PresentedCredentials, TrustContext, WsAuthOutcome};

pub(super) const DESCRIPTION: &str =
    "Machine-to-machine API: per-bundle endpoints guarded by client credentials.";

/// Header carrying the public lookup key.
const CLIENT_KEY_HEADER: &str = "x-ws-client-key";

/// Header carrying the secret.
const CLIENT_SECRET_HEADER: &str = "x-ws-client-secret";

pub fn openapi_router() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new().merge(ping::openapi_router())
}

/// The authentication gate for webservice endpoints.
///
/// Pulls the bundle code out of the path and the credentials out of the
/// headers, runs the full evaluation ladder and stamps the request context
/// with the authenticated client. Both the grant and the denial land in the
/// audit trail.
pub struct WsTrust {
    /// The trust context of the authenticated client.
    pub trust: TrustContext,
}

impl FromRequestParts<ServiceState> for WsTrust {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServiceState,
    ) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::BadRequest("missing bundle code".into()))?;
        let bundle_code = params
            .get("bundle_code")
            .cloned()
            .ok_or_else(|| ApiError::BadRequest("missing bundle code".into()))?;

        let credentials = presented_credentials(&parts.headers);
        let client_ip = RequestContext::try_current().and_then(|ctx| ctx.client_ip);

        let outcome = state
            .provider
            .get_webservice_provider()
            .authenticate(state, &bundle_code, credentials, client_ip)
            .await;

        match outcome {
            WsAuthOutcome::Granted(trust) => {
                state
                    .provider
                    .get_audit_provider()
                    .emit(AuditEvent::WsAuthenticated {
                        bundle_code: trust.bundle_code.clone(),
                        client_id: trust.client_id.clone(),
                    });
                if let Some(ctx) = RequestContext::try_current() {
                    ctx.set_caller(Caller::Webservice {
                        client_id: trust.client_id.clone(),
                        bundle_code: trust.bundle_code.clone(),
                    });
                }
                Ok(Self { trust })
            }
            WsAuthOutcome::Denied(reason) => {
                state
                    .provider
                    .get_audit_provider()
                    .emit(AuditEvent::WsRejected {
                        bundle_code,
                        reason: reason.code().into(),
                    });
                Err(ApiError::WsDenied(reason))
            }
        }
    }
}

/// Extract the presented credentials from the request headers.
///
/// The dedicated `x-ws-client-*` headers win; `Authorization: Basic` with
/// `key:secret` is accepted as a fallback for clients that cannot set custom
/// headers. Absence is not an error here; the provider turns it into the
/// proper denial.
fn presented_credentials(headers: &HeaderMap) -> Option<PresentedCredentials> {
    if let Some(api_key) = header_value(headers, CLIENT_KEY_HEADER)
        && let Some(secret) = header_value(headers, CLIENT_SECRET_HEADER)
    {
        return Some(PresentedCredentials {
            api_key,
            secret: SecretString::from(secret),
        });
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(basic_credentials)
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
}

fn basic_credentials(value: &str) -> Option<PresentedCredentials> {
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = String::from_utf8(STANDARD.decode(encoded.trim()).ok()?).ok()?;
    let (api_key, secret) = decoded.split_once(':')?;
    Some(PresentedCredentials {
        api_key: api_key.to_string(),
        secret: SecretString::from(secret.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_dedicated_headers_win_over_basic_auth() {
        let mut headers = HeaderMap::new();
        headers.insert(CLIENT_KEY_HEADER, "key-1".parse().unwrap());
        headers.insert(CLIENT_SECRET_HEADER, "s3cret".parse().unwrap());
        headers.insert(
            header::AUTHORIZATION,
            format!("Basic {}", STANDARD.encode("other:creds"))
                .parse()
                .unwrap(),
        );

        let creds = presented_credentials(&headers).unwrap();
        assert_eq!("key-1", creds.api_key);
        assert_eq!("s3cret", creds.secret.expose_secret());
    }

    #[test]
    fn test_basic_auth_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Basic {}", STANDARD.encode("key-2:top:secret"))
                .parse()
                .unwrap(),
        );

        let creds = presented_credentials(&headers).unwrap();
        assert_eq!("key-2", creds.api_key);
        // Only the first colon separates key and secret.
        assert_eq!("top:secret", creds.secret.expose_secret());
    }

    #[test]
    fn test_no_credentials() {
        assert!(presented_credentials(&HeaderMap::new()).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer token".parse().unwrap());
        assert!(presented_credentials(&headers).is_none());

        // A key without a secret is no credential.
        let mut headers = HeaderMap::new();
        headers.insert(CLIENT_KEY_HEADER, "key-3".parse().unwrap());
        assert!(presented_credentials(&headers).is_none());
    }

    #[test]
    fn test_malformed_basic_auth() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic not-base64!".parse().unwrap());
        assert!(presented_credentials(&headers).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Basic {}", STANDARD.encode("no-colon"))
                .parse()
                .unwrap(),
        );
        assert!(presented_credentials(&headers).is_none());
    }
}
