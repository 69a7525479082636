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
//! # Identity provider registry
//!
//! The set of protocol adapters built from the configuration. Providers are
//! compile-time-known: each configured entry maps onto one of the built-in
//! protocol families and an unknown kind never reaches this point.
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;
use crate::federation::FederationProviderError;
use crate::federation::adapter::IdentityAdapter;
use crate::federation::oauth2::Oauth2Adapter;
use crate::federation::oidc::OidcAdapter;
use crate::federation::saml::SamlAdapter;
use crate::federation::types::{ProviderDescription, ProviderKind};

#[derive(Clone, Debug, Default)]
pub struct ProviderRegistry {
    adapters: HashMap<String, Arc<dyn IdentityAdapter>>,
    default_provider: Option<String>,
}

impl ProviderRegistry {
    /// Build the adapters for every configured provider. Construction is
    /// synchronous; metadata discovery happens lazily on first use.
    pub fn from_config(config: &Config) -> Result<Self, FederationProviderError> {
        let mut registry = Self::default();
        for entry in &config.federation.providers {
            let adapter: Arc<dyn IdentityAdapter> = match entry.kind {
                ProviderKind::Oidc => {
                    Arc::new(OidcAdapter::new(entry.clone(), &config.federation))
                }
                ProviderKind::Oauth2 => {
                    Arc::new(Oauth2Adapter::new(entry.clone(), &config.federation))
                }
                ProviderKind::Saml => {
                    Arc::new(SamlAdapter::new(entry.clone(), &config.federation))
                }
            };
            registry.register(adapter);
        }
        if let Some(default) = &config.federation.default_provider {
            registry.set_default(default)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, adapter: Arc<dyn IdentityAdapter>) {
        self.adapters
            .insert(adapter.provider_type().to_string(), adapter);
    }

    pub fn set_default<S: AsRef<str>>(&mut self, name: S) -> Result<(), FederationProviderError> {
        if !self.adapters.contains_key(name.as_ref()) {
            return Err(FederationProviderError::ProviderNotFound(
                name.as_ref().to_string(),
            ));
        }
        self.default_provider = Some(name.as_ref().to_string());
        Ok(())
    }

    pub fn get<S: AsRef<str>>(&self, name: S) -> Option<Arc<dyn IdentityAdapter>> {
        self.adapters.get(name.as_ref()).cloned()
    }

    pub fn get_default(&self) -> Option<Arc<dyn IdentityAdapter>> {
        self.default_provider
            .as_ref()
            .and_then(|name| self.get(name))
    }

    /// Pick the adapter for a request: an explicit hint wins, then the
    /// provider prefix of the state tag, then the configured default.
    pub fn select(
        &self,
        hint: Option<&str>,
        state_tag: Option<&str>,
    ) -> Result<Arc<dyn IdentityAdapter>, FederationProviderError> {
        if let Some(name) = hint {
            return self
                .get(name)
                .ok_or_else(|| FederationProviderError::ProviderNotFound(name.to_string()));
        }
        if let Some(name) = state_tag.and_then(|tag| tag.split_once('.')).map(|(p, _)| p)
            && let Some(adapter) = self.get(name)
        {
            return Ok(adapter);
        }
        self.get_default()
            .ok_or_else(|| FederationProviderError::ProviderNotFound("default".to_string()))
    }

    /// Public description of the configured providers, sorted by name.
    pub fn describe(&self) -> Vec<ProviderDescription> {
        let mut providers: Vec<ProviderDescription> = self
            .adapters
            .values()
            .map(|adapter| ProviderDescription {
                name: adapter.provider_type().to_string(),
                kind: adapter.kind(),
            })
            .collect();
        providers.sort_by(|a, b| a.name.cmp(&b.name));
        providers
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use url::Url;

    use super::*;
    use crate::federation::types::*;

    #[derive(Debug)]
    struct StubAdapter {
        name: String,
    }

    #[async_trait]
    impl IdentityAdapter for StubAdapter {
        fn provider_type(&self) -> &str {
            &self.name
        }

        fn kind(&self) -> ProviderKind {
            ProviderKind::Oidc
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

    fn registry_with(names: &[&str]) -> ProviderRegistry {
        let mut registry = ProviderRegistry::default();
        for name in names {
            registry.register(Arc::new(StubAdapter { name: name.to_string() }));
        }
        registry
    }

    #[test]
    fn test_select_by_hint() {
        let registry = registry_with(&["okta", "github"]);
        assert_eq!(
            "github",
            registry
                .select(Some("github"), None)
                .unwrap()
                .provider_type()
        );
        assert!(matches!(
            registry.select(Some("google"), None),
            Err(FederationProviderError::ProviderNotFound(..))
        ));
    }

    #[test]
    fn test_select_by_state_tag_prefix() {
        let registry = registry_with(&["okta", "github"]);
        assert_eq!(
            "okta",
            registry
                .select(None, Some("okta.c29tZXJhbmRvbQ"))
                .unwrap()
                .provider_type()
        );
    }

    #[test]
    fn test_select_falls_back_to_default() {
        let mut registry = registry_with(&["okta"]);
        assert!(registry.select(None, None).is_err());

        registry.set_default("okta").unwrap();
        assert_eq!(
            "okta",
            registry.select(None, None).unwrap().provider_type()
        );
        // Tag with an unknown prefix still lands on the default.
        assert_eq!(
            "okta",
            registry
                .select(None, Some("ghost.abc"))
                .unwrap()
                .provider_type()
        );
    }

    #[test]
    fn test_set_default_unknown_provider() {
        let mut registry = registry_with(&["okta"]);
        assert!(matches!(
            registry.set_default("google"),
            Err(FederationProviderError::ProviderNotFound(..))
        ));
    }

    #[test]
    fn test_describe_sorted() {
        let registry = registry_with(&["okta", "adfs", "github"]);
        let names: Vec<String> = registry.describe().into_iter().map(|p| p.name).collect();
        assert_eq!(vec!["adfs", "github", "okta"], names);
    }
}
