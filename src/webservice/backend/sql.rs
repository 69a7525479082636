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
//! # Webservice SQL driver
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::super::types::*;
use crate::config::Config;
use crate::gatehouse::ServiceState;
use crate::webservice::{WebserviceProviderError, backend::WebserviceBackend};

mod bundle;
mod client;
mod credential;
mod ip_rule;

/// SQL backend provider implementing the WebserviceBackend interface.
#[derive(Clone, Debug, Default)]
pub struct SqlBackend {
    /// Config.
    pub config: Config,
}

#[async_trait]
impl WebserviceBackend for SqlBackend {
    /// Set config
    fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    /// Find a credential by its public lookup key.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn find_credential<'a>(
        &self,
        state: &ServiceState,
        api_key: &'a str,
    ) -> Result<Option<Credential>, WebserviceProviderError> {
        Ok(credential::find(&state.db, api_key).await?)
    }

    /// Get single bundle by ID.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn get_bundle<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
    ) -> Result<Option<Bundle>, WebserviceProviderError> {
        Ok(bundle::get(&state.db, id).await?)
    }

    /// Get single client by ID.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn get_client<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
    ) -> Result<Option<Client>, WebserviceProviderError> {
        Ok(client::get(&state.db, id).await?)
    }

    /// List the IP allow-list rules of a client.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn list_ip_rules<'a>(
        &self,
        state: &ServiceState,
        client_id: &'a str,
    ) -> Result<Vec<IpRule>, WebserviceProviderError> {
        Ok(ip_rule::list(&state.db, client_id).await?)
    }

    /// Record a successful authentication on the credential.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn record_credential_usage<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
        used_at: DateTime<Utc>,
    ) -> Result<(), WebserviceProviderError> {
        Ok(credential::record_usage(&state.db, id, used_at).await?)
    }
}
