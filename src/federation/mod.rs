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
//! # Federation provider
//!
//! Owns the login state store bridging the authorization redirect
//! round-trip. The protocol adapters themselves live in the
//! [registry](crate::federation::registry); this provider only guards the
//! single-use contract of the state tags.
use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
#[cfg(test)]
use mockall::mock;

pub mod adapter;
pub mod backend;
pub mod error;
pub mod oauth2;
pub mod oidc;
pub mod registry;
pub mod saml;
pub mod types;

use crate::config::Config;
use crate::federation::backend::SqlBackend;
use crate::federation::error::FederationProviderError;
use crate::federation::types::*;
use crate::gatehouse::ServiceState;
use crate::plugin_manager::PluginManager;

#[derive(Clone, Debug)]
pub struct FederationProvider {
    backend_driver: Box<dyn backend::LoginStateBackend>,
    /// Pending login lifetime (seconds).
    login_state_ttl: i64,
}

#[async_trait]
pub trait FederationApi: Send + Sync + Clone {
    async fn create_login_state(
        &self,
        state: &ServiceState,
        rec: LoginState,
    ) -> Result<LoginState, FederationProviderError>;

    async fn take_login_state<'a>(
        &self,
        state: &ServiceState,
        tag: &'a str,
    ) -> Result<LoginState, FederationProviderError>;

    async fn cleanup_login_states(
        &self,
        state: &ServiceState,
    ) -> Result<u64, FederationProviderError>;
}

#[cfg(test)]
mock! {
    pub FederationProvider {
        pub fn new(cfg: &Config, plugin_manager: &PluginManager) -> Result<Self, FederationProviderError>;
    }

    #[async_trait]
    impl FederationApi for FederationProvider {
        async fn create_login_state(
            &self,
            state: &ServiceState,
            rec: LoginState,
        ) -> Result<LoginState, FederationProviderError>;

        async fn take_login_state<'a>(
            &self,
            state: &ServiceState,
            tag: &'a str,
        ) -> Result<LoginState, FederationProviderError>;

        async fn cleanup_login_states(
            &self,
            state: &ServiceState,
        ) -> Result<u64, FederationProviderError>;
    }

    impl Clone for FederationProvider {
        fn clone(&self) -> Self;
    }
}

impl FederationProvider {
    pub fn new(
        config: &Config,
        plugin_manager: &PluginManager,
    ) -> Result<Self, FederationProviderError> {
        let mut backend_driver = if let Some(driver) =
            plugin_manager.get_login_state_backend(config.federation.driver.clone())
        {
            driver.clone()
        } else {
            match config.federation.driver.as_str() {
                "sql" => Box::new(SqlBackend::default()) as Box<dyn backend::LoginStateBackend>,
                _ => {
                    return Err(FederationProviderError::UnsupportedDriver(
                        config.federation.driver.clone(),
                    ));
                }
            }
        };
        backend_driver.set_config(config.clone());
        Ok(Self {
            backend_driver,
            login_state_ttl: config.federation.login_state_ttl,
        })
    }
}

#[async_trait]
impl FederationApi for FederationProvider {
    /// Persist a pending login. The hard expiry is stamped here so adapters
    /// cannot disagree about the lifetime.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn create_login_state(
        &self,
        state: &ServiceState,
        rec: LoginState,
    ) -> Result<LoginState, FederationProviderError> {
        let mut mod_rec = rec;
        mod_rec.expires_at = Utc::now() + TimeDelta::seconds(self.login_state_ttl);

        self.backend_driver.create_login_state(state, mod_rec).await
    }

    /// Consume a pending login. The row is deleted on the way out, so a
    /// replayed state tag finds nothing.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn take_login_state<'a>(
        &self,
        state: &ServiceState,
        tag: &'a str,
    ) -> Result<LoginState, FederationProviderError> {
        let Some(login_state) = self.backend_driver.get_login_state(state, tag).await? else {
            return Err(FederationProviderError::LoginStateNotFound(tag.to_string()));
        };
        self.backend_driver.delete_login_state(state, tag).await?;
        if login_state.expires_at <= Utc::now() {
            return Err(FederationProviderError::LoginStateNotFound(tag.to_string()));
        }
        Ok(login_state)
    }

    /// Drop expired pending logins.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn cleanup_login_states(
        &self,
        state: &ServiceState,
    ) -> Result<u64, FederationProviderError> {
        self.backend_driver
            .delete_expired_login_states(state, Utc::now())
            .await
    }
}
