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
//! # Provider manager
//!
//! Provider manager provides access to the individual service providers. This
//! gives an easy interface for passing overall manager down to the individual
//! providers that might need to call other providers while also allowing an
//! easy injection of mocked providers.
use derive_builder::Builder;
use mockall_double::double;

use crate::account::AccountApi;
#[double]
use crate::account::AccountProvider;
use crate::audit::AuditApi;
#[double]
use crate::audit::AuditProvider;
use crate::config::Config;
use crate::error::GatehouseError;
use crate::federation::FederationApi;
#[double]
use crate::federation::FederationProvider;
use crate::plugin_manager::PluginManager;
use crate::session::SessionApi;
#[double]
use crate::session::SessionProvider;
use crate::webservice::WebserviceApi;
#[double]
use crate::webservice::WebserviceProvider;

/// Global provider manager.
#[derive(Builder, Clone)]
// It is necessary to use the owned pattern since otherwise builder invokes clone which immediately
// confuses mockall used in tests
#[builder(pattern = "owned")]
pub struct Provider {
    /// Configuration.
    pub config: Config,
    /// Account provider.
    account: AccountProvider,
    /// Audit provider.
    audit: AuditProvider,
    /// Federation provider.
    federation: FederationProvider,
    /// Session provider.
    session: SessionProvider,
    /// Webservice provider.
    webservice: WebserviceProvider,
}

impl Provider {
    pub fn new(cfg: Config, plugin_manager: PluginManager) -> Result<Self, GatehouseError> {
        let account_provider = AccountProvider::new(&cfg, &plugin_manager)?;
        let audit_provider = AuditProvider::new(&cfg, &plugin_manager)?;
        let federation_provider = FederationProvider::new(&cfg, &plugin_manager)?;
        let session_provider = SessionProvider::new(&cfg, &plugin_manager)?;
        let webservice_provider = WebserviceProvider::new(&cfg, &plugin_manager)?;

        Ok(Self {
            config: cfg,
            account: account_provider,
            audit: audit_provider,
            federation: federation_provider,
            session: session_provider,
            webservice: webservice_provider,
        })
    }

    /// Get the account provider.
    pub fn get_account_provider(&self) -> &impl AccountApi {
        &self.account
    }

    /// Get the audit provider.
    pub fn get_audit_provider(&self) -> &impl AuditApi {
        &self.audit
    }

    /// Get the federation provider.
    pub fn get_federation_provider(&self) -> &impl FederationApi {
        &self.federation
    }

    /// Get the session provider.
    pub fn get_session_provider(&self) -> &impl SessionApi {
        &self.session
    }

    /// Get the webservice provider.
    pub fn get_webservice_provider(&self) -> &impl WebserviceApi {
        &self.webservice
    }
}

#[cfg(test)]
impl Provider {
    pub fn mocked_builder() -> ProviderBuilder {
        let config = Config::default();
        let account_mock = crate::account::MockAccountProvider::default();
        let audit_mock = crate::audit::MockAuditProvider::default();
        let federation_mock = crate::federation::MockFederationProvider::default();
        let session_mock = crate::session::MockSessionProvider::default();
        let webservice_mock = crate::webservice::MockWebserviceProvider::default();

        ProviderBuilder::default()
            .config(config.clone())
            .account(account_mock)
            .audit(audit_mock)
            .federation(federation_mock)
            .session(session_mock)
            .webservice(webservice_mock)
    }
}
