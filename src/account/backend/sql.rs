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
//! # Account SQL driver
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::super::types::*;
use crate::account::{AccountProviderError, backend::AccountBackend};
use crate::config::Config;
use crate::gatehouse::ServiceState;

mod account;
mod external_identity;

/// SQL backend provider implementing the AccountBackend interface.
#[derive(Clone, Debug, Default)]
pub struct SqlBackend {
    /// Config.
    pub config: Config,
}

#[async_trait]
impl AccountBackend for SqlBackend {
    /// Set config
    fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    /// Create a new account.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn create_account(
        &self,
        state: &ServiceState,
        rec: AccountCreate,
    ) -> Result<Account, AccountProviderError> {
        Ok(account::create(&state.db, rec).await?)
    }

    /// Create a new identity linkage.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn create_external_identity(
        &self,
        state: &ServiceState,
        rec: ExternalIdentityCreate,
    ) -> Result<ExternalIdentity, AccountProviderError> {
        Ok(external_identity::create(&state.db, rec).await?)
    }

    /// Find an identity linkage by (provider_type, external_id).
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn find_external_identity<'a>(
        &self,
        state: &ServiceState,
        provider_type: &'a str,
        external_id: &'a str,
    ) -> Result<Option<ExternalIdentity>, AccountProviderError> {
        Ok(external_identity::find(&state.db, provider_type, external_id).await?)
    }

    /// Get single account by ID.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn get_account<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
    ) -> Result<Option<Account>, AccountProviderError> {
        Ok(account::get(&state.db, id).await?)
    }

    /// Get single account by its primary email.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn get_account_by_email<'a>(
        &self,
        state: &ServiceState,
        email: &'a str,
    ) -> Result<Option<Account>, AccountProviderError> {
        Ok(account::get_by_email(&state.db, email).await?)
    }

    /// Record a successful login on the account.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn record_login<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
        login_at: DateTime<Utc>,
    ) -> Result<(), AccountProviderError> {
        Ok(account::record_login(&state.db, id, login_at).await?)
    }

    /// Update account profile attributes.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn update_account_profile<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
        profile: AccountProfileUpdate,
    ) -> Result<Account, AccountProviderError> {
        Ok(account::update_profile(&state.db, id, profile).await?)
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
        Ok(external_identity::update(&state.db, provider_type, external_id, identity).await?)
    }
}
