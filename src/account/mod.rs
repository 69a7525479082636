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
//! # Account provider
//!
//! Account provider owns the canonical user accounts and their identity
//! linkages. Identity providers vouch for personas; this provider maps every
//! persona onto exactly one account.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::mock;
use uuid::Uuid;

pub mod backend;
pub mod error;
pub mod types;

use crate::account::backend::SqlBackend;
use crate::account::error::AccountProviderError;
use crate::account::types::*;
use crate::config::Config;
use crate::gatehouse::ServiceState;
use crate::plugin_manager::PluginManager;

#[derive(Clone, Debug)]
pub struct AccountProvider {
    backend_driver: Box<dyn backend::AccountBackend>,
}

#[async_trait]
pub trait AccountApi: Send + Sync + Clone {
    async fn create_account(
        &self,
        state: &ServiceState,
        account: AccountCreate,
    ) -> Result<Account, AccountProviderError>;

    async fn create_external_identity(
        &self,
        state: &ServiceState,
        identity: ExternalIdentityCreate,
    ) -> Result<ExternalIdentity, AccountProviderError>;

    async fn find_external_identity<'a>(
        &self,
        state: &ServiceState,
        provider_type: &'a str,
        external_id: &'a str,
    ) -> Result<Option<ExternalIdentity>, AccountProviderError>;

    async fn get_account<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
    ) -> Result<Option<Account>, AccountProviderError>;

    async fn get_account_by_email<'a>(
        &self,
        state: &ServiceState,
        email: &'a str,
    ) -> Result<Option<Account>, AccountProviderError>;

    async fn record_login<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
        login_at: DateTime<Utc>,
    ) -> Result<(), AccountProviderError>;

    async fn update_account_profile<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
        profile: AccountProfileUpdate,
    ) -> Result<Account, AccountProviderError>;

    async fn update_external_identity<'a>(
        &self,
        state: &ServiceState,
        provider_type: &'a str,
        external_id: &'a str,
        identity: ExternalIdentityUpdate,
    ) -> Result<ExternalIdentity, AccountProviderError>;
}

#[cfg(test)]
mock! {
    pub AccountProvider {
        pub fn new(cfg: &Config, plugin_manager: &PluginManager) -> Result<Self, AccountProviderError>;
    }

    #[async_trait]
    impl AccountApi for AccountProvider {
        async fn create_account(
            &self,
            state: &ServiceState,
            account: AccountCreate,
        ) -> Result<Account, AccountProviderError>;

        async fn create_external_identity(
            &self,
            state: &ServiceState,
            identity: ExternalIdentityCreate,
        ) -> Result<ExternalIdentity, AccountProviderError>;

        async fn find_external_identity<'a>(
            &self,
            state: &ServiceState,
            provider_type: &'a str,
            external_id: &'a str,
        ) -> Result<Option<ExternalIdentity>, AccountProviderError>;

        async fn get_account<'a>(
            &self,
            state: &ServiceState,
            id: &'a str,
        ) -> Result<Option<Account>, AccountProviderError>;

        async fn get_account_by_email<'a>(
            &self,
            state: &ServiceState,
            email: &'a str,
        ) -> Result<Option<Account>, AccountProviderError>;

        async fn record_login<'a>(
            &self,
            state: &ServiceState,
            id: &'a str,
            login_at: DateTime<Utc>,
        ) -> Result<(), AccountProviderError>;

        async fn update_account_profile<'a>(
            &self,
            state: &ServiceState,
            id: &'a str,
            profile: AccountProfileUpdate,
        ) -> Result<Account, AccountProviderError>;

        async fn update_external_identity<'a>(
            &self,
            state: &ServiceState,
            provider_type: &'a str,
            external_id: &'a str,
            identity: ExternalIdentityUpdate,
        ) -> Result<ExternalIdentity, AccountProviderError>;
    }

    impl Clone for AccountProvider {
        fn clone(&self) -> Self;
    }
}

impl AccountProvider {
    pub fn new(
        config: &Config,
        plugin_manager: &PluginManager,
    ) -> Result<Self, AccountProviderError> {
        let mut backend_driver = if let Some(driver) =
            plugin_manager.get_account_backend(config.account.driver.clone())
        {
            driver.clone()
        } else {
            match config.account.driver.as_str() {
                "sql" => Box::new(SqlBackend::default()) as Box<dyn backend::AccountBackend>,
                _ => {
                    return Err(AccountProviderError::UnsupportedDriver(
                        config.account.driver.clone(),
                    ));
                }
            }
        };
        backend_driver.set_config(config.clone());
        Ok(Self { backend_driver })
    }
}

#[async_trait]
impl AccountApi for AccountProvider {
    /// Create a new account.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn create_account(
        &self,
        state: &ServiceState,
        account: AccountCreate,
    ) -> Result<Account, AccountProviderError> {
        let mut mod_account = account;
        if mod_account.id.is_empty() {
            mod_account.id = Uuid::new_v4().simple().to_string();
        }

        self.backend_driver.create_account(state, mod_account).await
    }

    /// Link an identity provider persona to an account.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn create_external_identity(
        &self,
        state: &ServiceState,
        identity: ExternalIdentityCreate,
    ) -> Result<ExternalIdentity, AccountProviderError> {
        self.backend_driver
            .create_external_identity(state, identity)
            .await
    }

    /// Find an identity linkage by (provider_type, external_id).
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn find_external_identity<'a>(
        &self,
        state: &ServiceState,
        provider_type: &'a str,
        external_id: &'a str,
    ) -> Result<Option<ExternalIdentity>, AccountProviderError> {
        self.backend_driver
            .find_external_identity(state, provider_type, external_id)
            .await
    }

    /// Get single account by ID.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn get_account<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
    ) -> Result<Option<Account>, AccountProviderError> {
        self.backend_driver.get_account(state, id).await
    }

    /// Get single account by its primary email.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn get_account_by_email<'a>(
        &self,
        state: &ServiceState,
        email: &'a str,
    ) -> Result<Option<Account>, AccountProviderError> {
        self.backend_driver.get_account_by_email(state, email).await
    }

    /// Record a successful login on the account.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn record_login<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
        login_at: DateTime<Utc>,
    ) -> Result<(), AccountProviderError> {
        self.backend_driver.record_login(state, id, login_at).await
    }

    /// Update account profile attributes.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn update_account_profile<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
        profile: AccountProfileUpdate,
    ) -> Result<Account, AccountProviderError> {
        self.backend_driver
            .update_account_profile(state, id, profile)
            .await
    }

    /// Refresh the cached attributes of an identity linkage.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn update_external_identity<'a>(
        &self,
        state: &ServiceState,
        provider_type: &'a str,
        external_id: &'a str,
        identity: ExternalIdentityUpdate,
    ) -> Result<ExternalIdentity, AccountProviderError> {
        self.backend_driver
            .update_external_identity(state, provider_type, external_id, identity)
            .await
    }
}
