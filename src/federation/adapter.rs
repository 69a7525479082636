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
//! # Identity provider adapter interface
//!
//! A protocol adapter turns one external identity provider protocol into the
//! common [IdentityAssertion] currency. Everything protocol-specific lives
//! behind this trait; the resolution engine and the API layer never see raw
//! protocol material.
use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use url::Url;

use crate::federation::FederationProviderError;
use crate::federation::types::*;

#[async_trait]
pub trait IdentityAdapter: Send + Sync + std::fmt::Debug {
    /// Provider name. Recorded on every identity linkage made through this
    /// adapter.
    fn provider_type(&self) -> &str;

    /// Protocol family.
    fn kind(&self) -> ProviderKind;

    /// Whether a first login with no matching account may create one.
    fn auto_provision(&self) -> bool;

    /// Central logout endpoint, when the provider has one.
    fn logout_url(&self) -> Option<Url>;

    /// Build the authorization redirect and the pending state to persist
    /// before sending the browser away.
    async fn login_start(
        &self,
        host: &str,
        return_to: Option<String>,
    ) -> Result<LoginChallenge, FederationProviderError>;

    /// Verify the callback material against the pending login and produce
    /// the identity assertion.
    async fn handle_callback(
        &self,
        login_state: LoginState,
        params: CallbackParams,
    ) -> Result<IdentityAssertion, FederationProviderError>;

    /// Exchange a refresh token for a new token bundle.
    async fn refresh(
        &self,
        refresh_token: &str,
    ) -> Result<RefreshedTokens, FederationProviderError>;
}

/// Build the outgoing http client shared by the adapters.
pub(super) fn http_client(timeout: Duration) -> Result<reqwest::Client, FederationProviderError> {
    Ok(reqwest::ClientBuilder::new()
        // Following redirects opens the client up to SSRF vulnerabilities.
        .redirect(reqwest::redirect::Policy::none())
        .timeout(timeout)
        .build()?)
}

/// Callback url the provider must redirect back to. Derived from the
/// requested host so one deployment can serve several vanity domains.
pub(super) fn callback_url(scheme: &str, host: &str) -> String {
    format!("{scheme}://{host}/auth/callback")
}

/// Generate the state tag for a pending login. The provider name prefix lets
/// the callback be dispatched to the right adapter before the state row is
/// loaded.
pub(super) fn state_tag(provider: &str) -> String {
    let mut buf = [0u8; 24];
    rand::rng().fill_bytes(&mut buf);
    format!("{}.{}", provider, URL_SAFE_NO_PAD.encode(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_url() {
        assert_eq!(
            "https://portal.example.com/auth/callback",
            callback_url("https", "portal.example.com")
        );
    }

    #[test]
    fn test_state_tag_carries_provider_prefix() {
        let tag = state_tag("okta");
        assert_eq!(Some("okta"), tag.split_once('.').map(|(p, _)| p));
        // 24 random bytes in url-safe base64 without padding.
        assert_eq!(32, tag.split_once('.').map(|(_, r)| r.len()).unwrap());
    }

    #[test]
    fn test_state_tags_are_unique() {
        assert_ne!(state_tag("okta"), state_tag("okta"));
    }
}
