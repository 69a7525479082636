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
//! # OpenID Connect adapter
//!
//! Authorization code flow with PKCE and nonce, endpoints taken from issuer
//! metadata discovery. The discovery document is memoized per adapter for the
//! configured TTL so a login does not pay the discovery round-trip every
//! time.
use std::collections::HashSet;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use openidconnect::core::{CoreAuthenticationFlow, CoreClient, CoreProviderMetadata};
use openidconnect::{
    AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointMaybeSet, EndpointNotSet,
    EndpointSet, IssuerUrl, Nonce, OAuth2TokenResponse, PkceCodeChallenge, PkceCodeVerifier,
    RedirectUrl, RefreshToken, Scope, TokenResponse,
};
use secrecy::ExposeSecret;
use url::Url;

use crate::config::{FederationSection, ProviderEntry};
use crate::federation::FederationProviderError;
use crate::federation::adapter::{IdentityAdapter, callback_url, http_client, state_tag};
use crate::federation::types::*;

type OidcClient = CoreClient<
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointMaybeSet,
    EndpointMaybeSet,
>;

#[derive(Debug)]
pub struct OidcAdapter {
    entry: ProviderEntry,
    callback_scheme: String,
    http_timeout: Duration,
    discovery_cache_ttl: Duration,
    metadata: RwLock<Option<(CoreProviderMetadata, Instant)>>,
}

impl OidcAdapter {
    pub fn new(entry: ProviderEntry, section: &FederationSection) -> Self {
        Self {
            entry,
            callback_scheme: section.callback_scheme.clone(),
            http_timeout: Duration::from_secs(section.http_timeout),
            discovery_cache_ttl: Duration::from_secs(section.discovery_cache_ttl),
            metadata: RwLock::new(None),
        }
    }

    /// Fetch (or reuse) the issuer discovery document.
    async fn provider_metadata(
        &self,
        http_client: &reqwest::Client,
    ) -> Result<CoreProviderMetadata, FederationProviderError> {
        {
            let guard = self.metadata.read().unwrap_or_else(|p| p.into_inner());
            if let Some((metadata, fetched_at)) = guard.as_ref()
                && fetched_at.elapsed() < self.discovery_cache_ttl
            {
                return Ok(metadata.clone());
            }
        }

        let issuer_url = self.entry.issuer_url.as_ref().ok_or_else(|| {
            FederationProviderError::Discovery(format!(
                "provider {} has no issuer_url",
                self.entry.name
            ))
        })?;
        let metadata = CoreProviderMetadata::discover_async(
            IssuerUrl::new(issuer_url.to_string())?,
            http_client,
        )
        .await
        .map_err(|err| FederationProviderError::Discovery(err.to_string()))?;

        let mut guard = self.metadata.write().unwrap_or_else(|p| p.into_inner());
        *guard = Some((metadata.clone(), Instant::now()));
        Ok(metadata)
    }

    async fn client(
        &self,
        http_client: &reqwest::Client,
    ) -> Result<OidcClient, FederationProviderError> {
        let metadata = self.provider_metadata(http_client).await?;
        let client_id = self.entry.client_id.clone().ok_or_else(|| {
            FederationProviderError::Discovery(format!(
                "provider {} has no client_id",
                self.entry.name
            ))
        })?;
        Ok(CoreClient::from_provider_metadata(
            metadata,
            ClientId::new(client_id),
            self.entry
                .client_secret
                .as_ref()
                .map(|secret| ClientSecret::new(secret.expose_secret().to_string())),
        ))
    }
}

#[async_trait]
impl IdentityAdapter for OidcAdapter {
    fn provider_type(&self) -> &str {
        &self.entry.name
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Oidc
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
        let http_client = http_client(self.http_timeout)?;
        let redirect_uri = callback_url(&self.callback_scheme, host);
        let client = self
            .client(&http_client)
            .await?
            .set_redirect_uri(RedirectUrl::new(redirect_uri.clone())?);

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let tag = state_tag(&self.entry.name);

        let mut oidc_scopes: HashSet<Scope> =
            HashSet::from_iter(self.entry.scopes.iter().cloned().map(Scope::new));
        oidc_scopes.insert(Scope::new("openid".to_string()));
        oidc_scopes.insert(Scope::new("email".to_string()));
        oidc_scopes.insert(Scope::new("profile".to_string()));

        let (auth_url, csrf_token, nonce) = client
            .authorize_url(
                CoreAuthenticationFlow::AuthorizationCode,
                || CsrfToken::new(tag),
                Nonce::new_random,
            )
            .add_scopes(oidc_scopes)
            .set_pkce_challenge(pkce_challenge)
            .url();

        let login_state = LoginState {
            state: csrf_token.secret().clone(),
            provider_type: self.entry.name.clone(),
            nonce: Some(nonce.secret().clone()),
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
        let nonce = login_state.nonce.clone().ok_or_else(|| {
            FederationProviderError::InvalidAssertion("pending login carries no nonce".to_string())
        })?;

        let http_client = http_client(self.http_timeout)?;
        let client = self
            .client(&http_client)
            .await?
            .set_redirect_uri(RedirectUrl::new(login_state.redirect_uri.clone())?);

        let mut token_request = client
            .exchange_code(AuthorizationCode::new(code))
            .map_err(|err| FederationProviderError::TokenExchange(err.to_string()))?;
        if let Some(verifier) = login_state.pkce_verifier.clone() {
            token_request = token_request.set_pkce_verifier(PkceCodeVerifier::new(verifier));
        }
        let token_response = token_request
            .request_async(&http_client)
            .await
            .map_err(|err| FederationProviderError::TokenExchange(err.to_string()))?;

        let id_token = token_response.id_token().ok_or_else(|| {
            FederationProviderError::InvalidAssertion(
                "token response carries no id token".to_string(),
            )
        })?;
        let claims = id_token
            .claims(&client.id_token_verifier(), &Nonce::new(nonce))
            .map_err(|err| FederationProviderError::InvalidAssertion(err.to_string()))?;

        let email = claims.email().map(|email| email.to_string()).ok_or_else(|| {
            FederationProviderError::InvalidAssertion(
                "id token carries no email claim".to_string(),
            )
        })?;

        let mut assertion = IdentityAssertionBuilder::default();
        assertion.provider_type(self.entry.name.clone());
        assertion.external_id(claims.subject().to_string());
        assertion.email(email);
        if let Some(name) = claims.name().and_then(|name| name.get(None)) {
            assertion.display_name(name.to_string());
        }
        if let Some(picture) = claims.picture().and_then(|picture| picture.get(None)) {
            assertion.profile_image_url(picture.to_string());
        }
        assertion.access_token(token_response.access_token().secret().clone());
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
        let client = self.client(&http_client).await?;

        let token_response = client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .map_err(|err| FederationProviderError::TokenExchange(err.to_string()))?
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
