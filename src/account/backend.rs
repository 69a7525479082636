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

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dyn_clone::DynClone;

use crate::account::AccountProviderError;
use crate::account::types::*;
use crate::config::Config;
use crate::gatehouse::ServiceState;

pub mod error;
pub mod sql;

pub use sql::SqlBackend;

/// Backend driver interface for the Account Provider.
#[async_trait]
pub trait AccountBackend: DynClone + Send + Sync + std::fmt::Debug {
    /// Set config.
    fn set_config(&mut self, config: Config);

    /// Create a new account.
    async fn create_account(
        &self,
        state: &ServiceState,
        account: AccountCreate,
    ) -> Result<Account, AccountProviderError>;

    /// Create a new identity linkage.
    async fn create_external_identity(
        &self,
        state: &ServiceState,
        identity: ExternalIdentityCreate,
    ) -> Result<ExternalIdentity, AccountProviderError>;

    /// Find an identity linkage by (provider_type, external_id).
    async fn find_external_identity<'a>(
        &self,
        state: &ServiceState,
        provider_type: &'a str,
        external_id: &'a str,
    ) -> Result<Option<ExternalIdentity>, AccountProviderError>;

    /// Get single account by ID.
    async fn get_account<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
    ) -> Result<Option<Account>, AccountProviderError>;

    /// Get single account by its primary email.
    async fn get_account_by_email<'a>(
        &self,
        state: &ServiceState,
        email: &'a str,
    ) -> Result<Option<Account>, AccountProviderError>;

    /// Record a successful login on the account.
    async fn record_login<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
        login_at: DateTime<Utc>,
    ) -> Result<(), AccountProviderError>;

    /// Update account profile attributes.
    async fn update_account_profile<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
        profile: AccountProfileUpdate,
    ) -> Result<Account, AccountProviderError>;

    /// Refresh the cached attributes of an identity linkage.
    async fn update_external_identity<'a>(
        &self,
        state: &ServiceState,
        provider_type: &'a str,
        external_id: &'a str,
        identity: ExternalIdentityUpdate,
    ) -> Result<ExternalIdentity, AccountProviderError>;
}

dyn_clone::clone_trait_object!(AccountBackend);
