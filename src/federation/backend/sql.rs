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
//! # Federation login state SQL driver
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::super::types::*;
use crate::config::Config;
use crate::federation::{FederationProviderError, backend::LoginStateBackend};
use crate::gatehouse::ServiceState;

mod login_state;

/// SQL backend provider implementing the LoginStateBackend interface.
#[derive(Clone, Debug, Default)]
pub struct SqlBackend {
    /// Config.
    pub config: Config,
}

#[async_trait]
impl LoginStateBackend for SqlBackend {
    /// Set config
    fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    /// Persist a new pending login.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn create_login_state(
        &self,
        state: &ServiceState,
        rec: LoginState,
    ) -> Result<LoginState, FederationProviderError> {
        Ok(login_state::create(&state.db, rec).await?)
    }

    /// Get a pending login by its state tag.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn get_login_state<'a>(
        &self,
        state: &ServiceState,
        tag: &'a str,
    ) -> Result<Option<LoginState>, FederationProviderError> {
        Ok(login_state::get(&state.db, tag).await?)
    }

    /// Delete a pending login.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn delete_login_state<'a>(
        &self,
        state: &ServiceState,
        tag: &'a str,
    ) -> Result<(), FederationProviderError> {
        Ok(login_state::delete(&state.db, tag).await?)
    }

    /// Delete pending logins that expired before the given point in time.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn delete_expired_login_states(
        &self,
        state: &ServiceState,
        before: DateTime<Utc>,
    ) -> Result<u64, FederationProviderError> {
        Ok(login_state::delete_expired(&state.db, before).await?)
    }
}
