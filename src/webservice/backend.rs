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
use crate::gatehouse::ServiceState;
use crate::webservice::WebserviceProviderError;
use crate::webservice::types::*;

pub mod error;
pub mod sql;

pub use sql::SqlBackend;

/// Backend driver interface for the Webservice Provider.
#[async_trait]
pub trait WebserviceBackend: DynClone + Send + Sync + std::fmt::Debug {
    /// Set config.
    fn set_config(&mut self, config: Config);

    /// Find a credential by its public lookup key.
    async fn find_credential<'a>(
        &self,
        state: &ServiceState,
        api_key: &'a str,
    ) -> Result<Option<Credential>, WebserviceProviderError>;

    /// Get single bundle by ID.
    async fn get_bundle<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
    ) -> Result<Option<Bundle>, WebserviceProviderError>;

    /// Get single client by ID.
    async fn get_client<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
    ) -> Result<Option<Client>, WebserviceProviderError>;

    /// List the IP allow-list rules of a client.
    async fn list_ip_rules<'a>(
        &self,
        state: &ServiceState,
        client_id: &'a str,
    ) -> Result<Vec<IpRule>, WebserviceProviderError>;

    /// Record a successful authentication on the credential.
    async fn record_credential_usage<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
        used_at: DateTime<Utc>,
    ) -> Result<(), WebserviceProviderError>;
}

dyn_clone::clone_trait_object!(WebserviceBackend);
