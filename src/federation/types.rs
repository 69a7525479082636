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
//! # Federation provider types.
use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Protocol family of a configured identity provider.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenID Connect with issuer metadata discovery.
    Oidc,
    /// Plain OAuth2 authorization code flow with a userinfo endpoint.
    Oauth2,
    /// SAML 2.0 web browser SSO.
    Saml,
}

/// Short-lived state bridging the authorization redirect round-trip.
///
/// The `state` value doubles as the browser round-trip correlation token and
/// as the primary key; it is single-use and consumed by the callback.
#[derive(Builder, Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[builder(setter(strip_option, into))]
pub struct LoginState {
    /// Opaque state tag returned by the browser on callback. Prefixed with
    /// the provider name so the callback can be dispatched before the row is
    /// loaded.
    pub state: String,

    /// Provider the login was initiated against.
    pub provider_type: String,

    /// OIDC nonce, or the SAML request id for `InResponseTo` validation.
    #[builder(default)]
    pub nonce: Option<String>,

    /// PKCE code verifier (authorization code flows).
    #[builder(default)]
    pub pkce_verifier: Option<String>,

    /// Callback url the authorization response must land on.
    pub redirect_uri: String,

    /// Relative url the browser is sent to after a successful login.
    #[builder(default)]
    pub return_to: Option<String>,

    /// Hard expiry of the pending login.
    #[builder(default)]
    pub expires_at: DateTime<Utc>,
}

/// A verified statement from an external identity provider about who the
/// caller is.
///
/// This is the common currency every protocol adapter produces and the only
/// input the resolution engine accepts. Nothing protocol-specific survives
/// past this point.
#[derive(Builder, Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[builder(setter(strip_option, into))]
pub struct IdentityAssertion {
    /// Provider that made the assertion.
    pub provider_type: String,

    /// Stable subject identifier within the provider.
    pub external_id: String,

    /// Email asserted by the provider.
    pub email: String,

    /// Human-readable display name, when the provider shared one.
    #[builder(default)]
    pub display_name: Option<String>,

    /// Profile image url, when the provider shared one.
    #[builder(default)]
    pub profile_image_url: Option<String>,

    /// Provider access token. Empty for protocols without a token concept
    /// (SAML).
    #[builder(default)]
    pub access_token: String,

    /// Provider refresh token.
    #[builder(default)]
    pub refresh_token: Option<String>,

    /// Expiry of the provider access token.
    #[builder(default)]
    pub token_expires_at: Option<DateTime<Utc>>,
}

/// Replacement token bundle obtained through a refresh grant.
#[derive(Builder, Clone, Debug, Default, PartialEq)]
#[builder(setter(strip_option, into))]
pub struct RefreshedTokens {
    /// New access token.
    pub access_token: String,

    /// New refresh token, when the provider rotated it.
    #[builder(default)]
    pub refresh_token: Option<String>,

    /// Expiry of the new access token.
    #[builder(default)]
    pub token_expires_at: Option<DateTime<Utc>>,
}

/// Parameters delivered by the browser to the callback endpoint.
///
/// OIDC and OAuth2 providers redirect with a query string, SAML providers
/// POST a form; both shapes deserialize into this one struct.
#[derive(Clone, Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct CallbackParams {
    /// Authorization code (code flows).
    pub code: Option<String>,

    /// State tag issued at login initiation (code flows).
    pub state: Option<String>,

    /// Error code relayed by the provider instead of a code.
    pub error: Option<String>,

    /// Human-readable error detail relayed by the provider.
    pub error_description: Option<String>,

    /// Base64-encoded SAML response document.
    #[serde(rename = "SAMLResponse")]
    pub saml_response: Option<String>,

    /// SAML relay state carrying the state tag.
    #[serde(rename = "RelayState")]
    pub relay_state: Option<String>,
}

/// The redirect produced by a login initiation.
#[derive(Clone, Debug)]
pub struct LoginChallenge {
    /// Where to send the browser.
    pub auth_url: url::Url,

    /// The pending state to persist before redirecting.
    pub login_state: LoginState,
}

/// Public description of a configured provider, safe to show to an
/// unauthenticated caller.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, utoipa::ToSchema)]
pub struct ProviderDescription {
    /// Provider name (the login hint value).
    pub name: String,

    /// Protocol family.
    #[schema(value_type = String)]
    pub kind: ProviderKind,
}
