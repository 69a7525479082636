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
//! # Plain OAuth2 adapter
//!
//! Authorization code flow with PKCE against providers that expose a
//! userinfo endpoint but no OpenID Connect discovery (GitHub being the
//! canonical case). Endpoint urls come straight from the configuration and
//! the profile claims are read from the userinfo JSON with per-field
//! fallbacks.
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, RefreshToken, Scope, TokenResponse,
    TokenUrl,
};
use secrecy::ExposeSecret;
use url::Url;

use crate::config::{FederationSection, ProviderEntry};
use crate::federation::FederationProviderError;
use crate::federation::adapter::{IdentityAdapter, callback_url, http_client, state_tag};
use crate::federation::types::*;

type Oauth2Client =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Userinfo keys tried in order for each assertion field.
const SUBJECT_KEYS: &[&str] = &["sub", "id"];
const EMAIL_KEYS: &[&str] = &["email"];
const NAME_KEYS: &[&str] = &["name", "login"];
const PICTURE_KEYS: &[&str] = &["picture", "avatar_url"];

#[derive(Debug)]
pub struct Oauth2Adapter {
    entry: ProviderEntry,
    callback_scheme: String,
    http_timeout: Duration,
}

impl Oauth2Adapter {
    pub fn new(entry: ProviderEntry, section: &FederationSection) -> Self {
        Self {
            entry,
            callback_scheme: section.callback_scheme.clone(),
            http_timeout: Duration::from_secs(section.http_timeout),
        }
    }

    fn client(&self) -> Result<Oauth2Client, FederationProviderError> {
        let (Some(client_id), Some(auth_url), Some(token_url)) = (
            self.entry.client_id.clone(),
            self.entry.auth_url.clone(),
            self.entry.token_url.clone(),
        ) else {
            return Err(FederationProviderError::Discovery(format!(
                "provider {} is missing the client_id, auth_url or token_url",
                self.entry.name
            )));
        };

        let mut client = BasicClient::new(ClientId::new(client_id))
            .set_auth_uri(AuthUrl::from_url(auth_url))
            .set_token_uri(TokenUrl::from_url(token_url));
        if let Some(secret) = &self.entry.client_secret {
            client = client.set_client_secret(ClientSecret::new(secret.expose_secret().to_string()));
        }
        Ok(client)
    }

    /// Query the userinfo endpoint with the fresh access token.
    async fn userinfo(
        &self,
        http_client: &reqwest::Client,
        access_token: &str,
    ) -> Result<serde_json::Value, FederationProviderError> {
        let userinfo_url = self.entry.userinfo_url.clone().ok_or_else(|| {
            FederationProviderError::Discovery(format!(
                "provider {} has no userinfo_url",
                self.entry.name
            ))
        })?;
        let response = http_client
            .get(userinfo_url)
            .bearer_auth(access_token)
            .header("accept", "application/json")
            .send()
            .await?
            .error_for_status()
            .map_err(|err| FederationProviderError::InvalidAssertion(err.to_string()))?;
        Ok(response.json().await?)
    }
}

/// Pick the first present key out of the fallback list. Numeric values are
/// stringified (GitHub serves the subject id as a number).
fn first_claim(profile: &serde_json::Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        profile.get(key).and_then(|value| {
            if let Some(s) = value.as_str() {
                Some(s.to_string())
            } else if value.is_number() {
                Some(value.to_string())
            } else {
                None
            }
        })
    })
}

#[async_trait]
impl IdentityAdapter for Oauth2Adapter {
    fn provider_type(&self) -> &str {
        &self.entry.name
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Oauth2
    }

    fn auto_provision(&self) -> bool {
        self.entry.auto_provision
    }

    fn logout_url(&self) -> Option<Url> {
        self.entry.logout_url.clone()
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn login_start(
        &self,
        host: &str,
        return_to: Option<String>,
    ) -> Result<LoginChallenge, FederationProviderError> {
        let redirect_uri = callback_url(&self.callback_scheme, host);
        let client = self
            .client()?
            .set_redirect_uri(RedirectUrl::new(redirect_uri.clone())?);

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let tag = state_tag(&self.entry.name);

        let (auth_url, csrf_token) = client
            .authorize_url(|| CsrfToken::new(tag))
            .add_scopes(self.entry.scopes.iter().cloned().map(Scope::new))
            .set_pkce_challenge(pkce_challenge)
            .url();

        let login_state = LoginState {
            state: csrf_token.secret().clone(),
            provider_type: self.entry.name.clone(),
            nonce: None,
            pkce_verifier: Some(pkce_verifier.into_secret()),
            redirect_uri,
            return_to,
            // Filled by the federation provider on persist.
            expires_at: Utc::now(),
        };

        Ok(LoginChallenge {
            auth_url,
            login_state,
        })
    }

    #[tracing::instrument(level = "debug", skip(self, login_state, params))]
    async fn handle_callback(
        &self,
        login_state: LoginState,
        params: CallbackParams,
    ) -> Result<IdentityAssertion, FederationProviderError> {
        if let Some(error) = params.error {
            return Err(FederationProviderError::AuthorizationDenied(
                params.error_description.unwrap_or(error),
            ));
        }
        let code = params.code.ok_or_else(|| {
            FederationProviderError::InvalidAssertion(
                "callback carries no authorization code".to_string(),
            )
        })?;

        let http_client = http_client(self.http_timeout)?;
        let client = self
            .client()?
            .set_redirect_uri(RedirectUrl::new(login_state.redirect_uri.clone())?);

        let mut token_request = client.exchange_code(AuthorizationCode::new(code));
        if let Some(verifier) = login_state.pkce_verifier.clone() {
            token_request = token_request.set_pkce_verifier(PkceCodeVerifier::new(verifier));
        }
        let token_response = token_request
            .request_async(&http_client)
            .await
            .map_err(|err| FederationProviderError::TokenExchange(err.to_string()))?;

        let access_token = token_response.access_token().secret().clone();
        let profile = self.userinfo(&http_client, &access_token).await?;

        let external_id = first_claim(&profile, SUBJECT_KEYS).ok_or_else(|| {
            FederationProviderError::InvalidAssertion(
                "userinfo carries no subject identifier".to_string(),
            )
        })?;
        let email = first_claim(&profile, EMAIL_KEYS).ok_or_else(|| {
            FederationProviderError::InvalidAssertion("userinfo carries no email".to_string())
        })?;

        let mut assertion = IdentityAssertionBuilder::default();
        assertion.provider_type(self.entry.name.clone());
        assertion.external_id(external_id);
        assertion.email(email);
        if let Some(name) = first_claim(&profile, NAME_KEYS) {
            assertion.display_name(name);
        }
        if let Some(picture) = first_claim(&profile, PICTURE_KEYS) {
            assertion.profile_image_url(picture);
        }
        assertion.access_token(access_token);
        if let Some(refresh_token) = token_response.refresh_token() {
            assertion.refresh_token(refresh_token.secret().clone());
        }
        if let Some(expires_in) = token_response
            .expires_in()
            .and_then(|d| TimeDelta::from_std(d).ok())
        {
            assertion.token_expires_at(Utc::now() + expires_in);
        }
        assertion
            .build()
            .map_err(|err| FederationProviderError::InvalidAssertion(err.to_string()))
    }

    #[tracing::instrument(level = "debug", skip(self, refresh_token))]
    async fn refresh(
        &self,
        refresh_token: &str,
    ) -> Result<RefreshedTokens, FederationProviderError> {
        let http_client = http_client(self.http_timeout)?;
        let client = self.client()?;

        let token_response = client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(&http_client)
            .await
            .map_err(|err| FederationProviderError::TokenExchange(err.to_string()))?;

        let mut tokens = RefreshedTokensBuilder::default();
        tokens.access_token(token_response.access_token().secret().clone());
        if let Some(new_refresh_token) = token_response.refresh_token() {
            tokens.refresh_token(new_refresh_token.secret().clone());
        }
        if let Some(expires_in) = token_response
            .expires_in()
            .and_then(|d| TimeDelta::from_std(d).ok())
        {
            tokens.token_expires_at(Utc::now() + expires_in);
        }
        tokens
            .build()
            .map_err(|err| FederationProviderError::TokenExchange(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_claim_fallback_order() {
        let github = serde_json::json!({"id": 12345, "login": "octocat", "avatar_url": "https://img.example.com/a.png"});
        assert_eq!(Some("12345".into()), first_claim(&github, SUBJECT_KEYS));
        assert_eq!(Some("octocat".into()), first_claim(&github, NAME_KEYS));
        assert_eq!(
            Some("https://img.example.com/a.png".into()),
            first_claim(&github, PICTURE_KEYS)
        );
        assert_eq!(None, first_claim(&github, EMAIL_KEYS));

        let oidc_like = serde_json::json!({"sub": "abc", "id": 1, "name": "Ada", "login": "ada"});
        assert_eq!(Some("abc".into()), first_claim(&oidc_like, SUBJECT_KEYS));
        assert_eq!(Some("Ada".into()), first_claim(&oidc_like, NAME_KEYS));
    }
}
