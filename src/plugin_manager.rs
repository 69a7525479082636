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
//! # Plugin manager
//!
//! A driver, also known as a backend, is an abstraction around the data access
//! needed by a particular subsystem. The [PluginManager] allows embedding
//! applications to register custom backend drivers before the service starts;
//! the providers consult it before falling back to the built-in drivers.
use std::collections::HashMap;

use crate::account::backend::AccountBackend;
use crate::audit::backend::AuditBackend;
use crate::federation::backend::LoginStateBackend;
use crate::session::backend::SessionBackend;
use crate::webservice::backend::WebserviceBackend;

/// Plugin manager allowing to pass custom backend plugins implementing required
/// trait during the service start.
#[derive(Clone, Default)]
pub struct PluginManager {
    /// Account backend plugins.
    account_backends: HashMap<String, Box<dyn AccountBackend>>,
    /// Audit backend plugins.
    audit_backends: HashMap<String, Box<dyn AuditBackend>>,
    /// Federation login state backend plugins.
    login_state_backends: HashMap<String, Box<dyn LoginStateBackend>>,
    /// Session backend plugins.
    session_backends: HashMap<String, Box<dyn SessionBackend>>,
    /// Webservice backend plugins.
    webservice_backends: HashMap<String, Box<dyn WebserviceBackend>>,
}

impl PluginManager {
    /// Register account backend.
    pub fn register_account_backend<S: AsRef<str>>(
        &mut self,
        name: S,
        plugin: Box<dyn AccountBackend>,
    ) {
        self.account_backends
            .insert(name.as_ref().to_string(), plugin);
    }

    /// Register audit backend.
    pub fn register_audit_backend<S: AsRef<str>>(
        &mut self,
        name: S,
        plugin: Box<dyn AuditBackend>,
    ) {
        self.audit_backends
            .insert(name.as_ref().to_string(), plugin);
    }

    /// Register federation login state backend.
    pub fn register_login_state_backend<S: AsRef<str>>(
        &mut self,
        name: S,
        plugin: Box<dyn LoginStateBackend>,
    ) {
        self.login_state_backends
            .insert(name.as_ref().to_string(), plugin);
    }

    /// Register session backend.
    pub fn register_session_backend<S: AsRef<str>>(
        &mut self,
        name: S,
        plugin: Box<dyn SessionBackend>,
    ) {
        self.session_backends
            .insert(name.as_ref().to_string(), plugin);
    }

    /// Register webservice backend.
    pub fn register_webservice_backend<S: AsRef<str>>(
        &mut self,
        name: S,
        plugin: Box<dyn WebserviceBackend>,
    ) {
        self.webservice_backends
            .insert(name.as_ref().to_string(), plugin);
    }

    /// Get registered account backend.
    #[allow(clippy::borrowed_box)]
    pub fn get_account_backend<S: AsRef<str>>(&self, name: S) -> Option<&Box<dyn AccountBackend>> {
        self.account_backends.get(name.as_ref())
    }

    /// Get registered audit backend.
    #[allow(clippy::borrowed_box)]
    pub fn get_audit_backend<S: AsRef<str>>(&self, name: S) -> Option<&Box<dyn AuditBackend>> {
        self.audit_backends.get(name.as_ref())
    }

    /// Get registered federation login state backend.
    #[allow(clippy::borrowed_box)]
    pub fn get_login_state_backend<S: AsRef<str>>(
        &self,
        name: S,
    ) -> Option<&Box<dyn LoginStateBackend>> {
        self.login_state_backends.get(name.as_ref())
    }

    /// Get registered session backend.
    #[allow(clippy::borrowed_box)]
    pub fn get_session_backend<S: AsRef<str>>(&self, name: S) -> Option<&Box<dyn SessionBackend>> {
        self.session_backends.get(name.as_ref())
    }

    /// Get registered webservice backend.
    #[allow(clippy::borrowed_box)]
    pub fn get_webservice_backend<S: AsRef<str>>(
        &self,
        name: S,
    ) -> Option<&Box<dyn WebserviceBackend>> {
        self.webservice_backends.get(name.as_ref())
    }
}
