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
//! # Webservice provider
//!
//! Machine-to-machine authentication: external clients present a key/secret
//! pair against a bundle URL and, when every link of the
//! bundle -> client -> credential -> ip chain holds, get a [`TrustContext`]
//! attached to their request. Every other outcome is a denial carrying one of
//! the fixed [`WsDenyReason`] codes; infrastructure failures are logged
//! server-side and collapse into `INVALID_CREDENTIALS` so the surface does not
//! leak which link broke.
use std::net::IpAddr;

use async_trait::async_trait;
use chrono::Utc;
#[cfg(test)]
use mockall::mock;
use secrecy::ExposeSecret;
use tracing::warn;

pub mod backend;
pub mod error;
pub mod secret_hashing;
pub mod types;

use crate::config::Config;
use crate::gatehouse::ServiceState;
use crate::plugin_manager::PluginManager;
use crate::webservice::backend::SqlBackend;
use crate::webservice::error::WebserviceProviderError;
use crate::webservice::types::*;

#[derive(Clone, Debug)]
pub struct WebserviceProvider {
    backend_driver: Box<dyn backend::WebserviceBackend>,
    /// Valid bcrypt hash used to equalize the timing of lookups that found no
    /// credential with lookups that found one.
    dummy_hash: String,
}

#[async_trait]
pub trait WebserviceApi: Send + Sync + Clone {
    /// Authenticate a machine client against a bundle.
    async fn authenticate<'a>(
        &self,
        state: &ServiceState,
        bundle_code: &'a str,
        credentials: Option<PresentedCredentials>,
        client_ip: Option<IpAddr>,
    ) -> WsAuthOutcome;
}

#[cfg(test)]
mock! {
    pub WebserviceProvider {
        pub fn new(cfg: &Config, plugin_manager: &PluginManager) -> Result<Self, WebserviceProviderError>;
    }

    #[async_trait]
    impl WebserviceApi for WebserviceProvider {
        async fn authenticate<'a>(
            &self,
            state: &ServiceState,
            bundle_code: &'a str,
            credentials: Option<PresentedCredentials>,
            client_ip: Option<IpAddr>,
        ) -> WsAuthOutcome;
    }

    impl Clone for WebserviceProvider {
        fn clone(&self) -> Self;
    }
}

impl WebserviceProvider {
    pub fn new(
        config: &Config,
        plugin_manager: &PluginManager,
    ) -> Result<Self, WebserviceProviderError> {
        let mut backend_driver = if let Some(driver) =
            plugin_manager.get_webservice_backend(config.webservice.driver.clone())
        {
            driver.clone()
        } else {
            match config.webservice.driver.as_str() {
                "sql" => Box::new(SqlBackend::default()) as Box<dyn backend::WebserviceBackend>,
                _ => {
                    return Err(WebserviceProviderError::UnsupportedDriver(
                        config.webservice.driver.clone(),
                    ));
                }
            }
        };
        backend_driver.set_config(config.clone());

        // Hashing a throwaway value once at startup is cheaper than leaking
        // key existence through response timing on every miss.
        let dummy_hash = bcrypt::hash("gatehouse-dummy", config.webservice.secret_hash_rounds)?;

        Ok(Self {
            backend_driver,
            dummy_hash,
        })
    }

    async fn evaluate<'a>(
        &self,
        state: &ServiceState,
        bundle_code: &'a str,
        credentials: Option<PresentedCredentials>,
        client_ip: Option<IpAddr>,
    ) -> Result<WsAuthOutcome, WebserviceProviderError> {
        use WsDenyReason::*;

        let Some(presented) = credentials else {
            return Ok(WsAuthOutcome::Denied(MissingCredentials));
        };

        let credential = match self
            .backend_driver
            .find_credential(state, &presented.api_key)
            .await?
        {
            Some(credential) => credential,
            None => {
                let _ = secret_hashing::verify_secret(
                    presented.secret.expose_secret(),
                    &self.dummy_hash,
                )
                .await;
                return Ok(WsAuthOutcome::Denied(InvalidCredentials));
            }
        };

        if !secret_hashing::verify_secret(presented.secret.expose_secret(), &credential.secret_hash)
            .await?
        {
            return Ok(WsAuthOutcome::Denied(InvalidCredentials));
        }

        if !credential.enabled {
            return Ok(WsAuthOutcome::Denied(InvalidCredentials));
        }
        if let Some(expires_at) = credential.expires_at
            && expires_at <= Utc::now()
        {
            return Ok(WsAuthOutcome::Denied(InvalidCredentials));
        }

        let Some(client) = self
            .backend_driver
            .get_client(state, &credential.client_id)
            .await?
        else {
            return Ok(WsAuthOutcome::Denied(ClientNotFound));
        };
        if !client.enabled {
            return Ok(WsAuthOutcome::Denied(ClientInactive));
        }

        let Some(bundle) = self
            .backend_driver
            .get_bundle(state, &client.bundle_id)
            .await?
        else {
            warn!(
                client_id = client.id,
                bundle_id = client.bundle_id,
                "client references a missing bundle"
            );
            return Ok(WsAuthOutcome::Denied(InvalidCredentials));
        };
        if bundle.code != bundle_code {
            return Ok(WsAuthOutcome::Denied(BundleMismatch));
        }
        if !bundle.enabled {
            return Ok(WsAuthOutcome::Denied(BundleInactive));
        }

        if client.ip_restricted {
            let Some(ip) = client_ip else {
                return Ok(WsAuthOutcome::Denied(IpNotAllowed));
            };
            let rules = self.backend_driver.list_ip_rules(state, &client.id).await?;
            let allowed = rules.iter().any(|rule| {
                rule.address
                    .parse::<IpAddr>()
                    .map(|addr| addr == ip)
                    .unwrap_or_else(|_| {
                        warn!(rule_id = rule.id, "unparseable ip rule address, skipped");
                        false
                    })
            });
            if !allowed {
                return Ok(WsAuthOutcome::Denied(IpNotAllowed));
            }
        }

        // Usage is recorded only for granted attempts; a failure to record
        // must not turn a granted request into a denial.
        if let Err(err) = self
            .backend_driver
            .record_credential_usage(state, &credential.id, Utc::now())
            .await
        {
            warn!("failed to record credential usage: {}", err);
        }

        Ok(WsAuthOutcome::Granted(TrustContext {
            client_id: client.id,
            client_name: client.name,
            credential_id: credential.id,
            bundle_id: bundle.id,
            bundle_code: bundle.code,
        }))
    }
}

#[async_trait]
impl WebserviceApi for WebserviceProvider {
    /// Authenticate a machine client against a bundle.
    #[tracing::instrument(level = "debug", skip(self, state, credentials))]
    async fn authenticate<'a>(
        &self,
        state: &ServiceState,
        bundle_code: &'a str,
        credentials: Option<PresentedCredentials>,
        client_ip: Option<IpAddr>,
    ) -> WsAuthOutcome {
        match self
            .evaluate(state, bundle_code, credentials, client_ip)
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!("webservice authentication infrastructure error: {}", err);
                WsAuthOutcome::Denied(WsDenyReason::InvalidCredentials)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use chrono::{DateTime, Duration, Utc};
    use sea_orm::DatabaseConnection;
    use secrecy::SecretString;

    use super::*;
    use crate::federation::registry::ProviderRegistry;
    use crate::gatehouse::Service;
    use crate::provider::Provider;

    /// In-memory backend holding a fixed bundle/client/credential graph.
    #[derive(Clone, Debug, Default)]
    struct FakeBackend {
        bundles: HashMap<String, Bundle>,
        clients: HashMap<String, Client>,
        credentials: HashMap<String, Credential>,
        ip_rules: Vec<IpRule>,
    }

    #[async_trait]
    impl backend::WebserviceBackend for FakeBackend {
        fn set_config(&mut self, _config: Config) {}

        async fn find_credential<'a>(
            &self,
            _state: &ServiceState,
            api_key: &'a str,
        ) -> Result<Option<Credential>, WebserviceProviderError> {
            Ok(self.credentials.get(api_key).cloned())
        }

        async fn get_bundle<'a>(
            &self,
            _state: &ServiceState,
            id: &'a str,
        ) -> Result<Option<Bundle>, WebserviceProviderError> {
            Ok(self.bundles.get(id).cloned())
        }

        async fn get_client<'a>(
            &self,
            _state: &ServiceState,
            id: &'a str,
        ) -> Result<Option<Client>, WebserviceProviderError> {
            Ok(self.clients.get(id).cloned())
        }

        async fn list_ip_rules<'a>(
            &self,
            _state: &ServiceState,
            client_id: &'a str,
        ) -> Result<Vec<IpRule>, WebserviceProviderError> {
            Ok(self
                .ip_rules
                .iter()
                .filter(|rule| rule.client_id == client_id)
                .cloned()
                .collect())
        }

        async fn record_credential_usage<'a>(
            &self,
            _state: &ServiceState,
            _id: &'a str,
            _used_at: DateTime<Utc>,
        ) -> Result<(), WebserviceProviderError> {
            Ok(())
        }
    }

    fn service_state() -> ServiceState {
        Arc::new(
            Service::new(
                Config::default(),
                DatabaseConnection::Disconnected,
                Provider::mocked_builder().build().unwrap(),
                ProviderRegistry::default(),
            )
            .unwrap(),
        )
    }

    fn fixture(ip_restricted: bool) -> WebserviceProvider {
        let secret_hash = bcrypt::hash("s3cret", 4).unwrap();
        let mut backend = FakeBackend::default();
        backend.bundles.insert(
            "bundle".into(),
            Bundle {
                id: "bundle".into(),
                code: "payroll".into(),
                name: "Payroll".into(),
                enabled: true,
            },
        );
        backend.clients.insert(
            "client".into(),
            Client {
                id: "client".into(),
                bundle_id: "bundle".into(),
                name: "Acme".into(),
                enabled: true,
                ip_restricted,
            },
        );
        backend.credentials.insert(
            "key".into(),
            Credential {
                id: "cred".into(),
                client_id: "client".into(),
                api_key: "key".into(),
                secret_hash,
                enabled: true,
                expires_at: None,
                created_at: Utc::now(),
                last_used_at: None,
            },
        );
        backend.ip_rules.push(IpRule {
            id: "rule".into(),
            client_id: "client".into(),
            address: "203.0.113.7".into(),
        });

        WebserviceProvider {
            backend_driver: Box::new(backend),
            dummy_hash: bcrypt::hash("dummy", 4).unwrap(),
        }
    }

    fn presented(secret: &str) -> Option<PresentedCredentials> {
        Some(PresentedCredentials {
            api_key: "key".into(),
            secret: SecretString::from(secret.to_string()),
        })
    }

    #[tokio::test]
    async fn test_granted() {
        let provider = fixture(false);
        let state = service_state();
        match provider
            .authenticate(&state, "payroll", presented("s3cret"), None)
            .await
        {
            WsAuthOutcome::Granted(trust) => {
                assert_eq!(trust.client_id, "client");
                assert_eq!(trust.bundle_code, "payroll");
                assert_eq!(trust.credential_id, "cred");
            }
            other => panic!("expected granted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let provider = fixture(false);
        let state = service_state();
        assert_eq!(
            provider.authenticate(&state, "payroll", None, None).await,
            WsAuthOutcome::Denied(WsDenyReason::MissingCredentials)
        );
    }

    #[tokio::test]
    async fn test_unknown_key_and_wrong_secret_are_indistinguishable() {
        let provider = fixture(false);
        let state = service_state();
        let unknown = provider
            .authenticate(
                &state,
                "payroll",
                Some(PresentedCredentials {
                    api_key: "ghost".into(),
                    secret: SecretString::from("s3cret".to_string()),
                }),
                None,
            )
            .await;
        let wrong = provider
            .authenticate(&state, "payroll", presented("wrong"), None)
            .await;
        assert_eq!(unknown, WsAuthOutcome::Denied(WsDenyReason::InvalidCredentials));
        assert_eq!(unknown, wrong);
    }

    #[tokio::test]
    async fn test_disabled_credential() {
        // Fixture with the credential switched off.
        let mut provider = fixture(false);
        let secret_hash = bcrypt::hash("s3cret", 4).unwrap();
        let mut backend = FakeBackend::default();
        backend.credentials.insert(
            "key".into(),
            Credential {
                id: "cred".into(),
                client_id: "client".into(),
                api_key: "key".into(),
                secret_hash,
                enabled: false,
                expires_at: None,
                created_at: Utc::now(),
                last_used_at: None,
            },
        );
        provider.backend_driver = Box::new(backend);
        let state = service_state();
        assert_eq!(
            provider
                .authenticate(&state, "payroll", presented("s3cret"), None)
                .await,
            WsAuthOutcome::Denied(WsDenyReason::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn test_expired_credential() {
        let mut provider = fixture(false);
        let secret_hash = bcrypt::hash("s3cret", 4).unwrap();
        let mut backend = FakeBackend::default();
        backend.credentials.insert(
            "key".into(),
            Credential {
                id: "cred".into(),
                client_id: "client".into(),
                api_key: "key".into(),
                secret_hash,
                enabled: true,
                expires_at: Some(Utc::now() - Duration::hours(1)),
                created_at: Utc::now(),
                last_used_at: None,
            },
        );
        provider.backend_driver = Box::new(backend);
        let state = service_state();
        assert_eq!(
            provider
                .authenticate(&state, "payroll", presented("s3cret"), None)
                .await,
            WsAuthOutcome::Denied(WsDenyReason::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn test_bundle_mismatch() {
        let provider = fixture(false);
        let state = service_state();
        assert_eq!(
            provider
                .authenticate(&state, "benefits", presented("s3cret"), None)
                .await,
            WsAuthOutcome::Denied(WsDenyReason::BundleMismatch)
        );
    }

    #[tokio::test]
    async fn test_ip_restricted_allows_listed_address() {
        let provider = fixture(true);
        let state = service_state();
        let outcome = provider
            .authenticate(
                &state,
                "payroll",
                presented("s3cret"),
                Some("203.0.113.7".parse().unwrap()),
            )
            .await;
        assert!(matches!(outcome, WsAuthOutcome::Granted(_)));
    }

    #[tokio::test]
    async fn test_ip_restricted_denies_other_address() {
        let provider = fixture(true);
        let state = service_state();
        assert_eq!(
            provider
                .authenticate(
                    &state,
                    "payroll",
                    presented("s3cret"),
                    Some("198.51.100.9".parse().unwrap()),
                )
                .await,
            WsAuthOutcome::Denied(WsDenyReason::IpNotAllowed)
        );
    }

    #[tokio::test]
    async fn test_ip_restricted_denies_unknown_address() {
        let provider = fixture(true);
        let state = service_state();
        assert_eq!(
            provider
                .authenticate(&state, "payroll", presented("s3cret"), None)
                .await,
            WsAuthOutcome::Denied(WsDenyReason::IpNotAllowed)
        );
    }

    #[tokio::test]
    async fn test_unrestricted_ignores_ip() {
        let provider = fixture(false);
        let state = service_state();
        let outcome = provider
            .authenticate(
                &state,
                "payroll",
                presented("s3cret"),
                Some("198.51.100.9".parse().unwrap()),
            )
            .await;
        assert!(matches!(outcome, WsAuthOutcome::Granted(_)));
    }
}
