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

use crate::config::Config;
use crate::federation::FederationProviderError;
use crate::federation::types::*;
use crate::gatehouse::ServiceState;

pub mod error;
pub mod sql;

pub use sql::SqlBackend;

/// Backend driver interface for the federation login state store.
#[async_trait]
pub trait LoginStateBackend: DynClone + Send + Sync + std::fmt::Debug {
    /// Set config.
    fn set_config(&mut self, config: Config);

    /// Persist a new pending login.
    async fn create_login_state(
        &self,
        state: &ServiceState,
        rec: LoginState,
    ) -> Result<LoginState, FederationProviderError>;

    /// Get a pending login by its state tag.
    async fn get_login_state<'a>(
        &self,
        state: &ServiceState,
        tag: &'a str,
    ) -> Result<Option<LoginState>, FederationProviderError>;

    /// Delete a pending login.
    async fn delete_login_state<'a>(
        &self,
        state: &ServiceState,
        tag: &'a str,
    ) -> Result<(), FederationProviderError>;

    /// Delete pending logins that expired before the given point in time.
    async fn delete_expired_login_states(
        &self,
        state: &ServiceState,
        before: DateTime<Utc>,
    ) -> Result<u64, FederationProviderError>;
}

dyn_clone::clone_trait_object!(LoginStateBackend);
