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
//! # Session provider
//!
//! Server-side login sessions. The browser cookie carries only the opaque
//! session id; the claim bundle, the IdP tokens and the account snapshot live
//! behind this provider.
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
#[cfg(test)]
use mockall::mock;
use rand::RngCore;

pub mod backend;
pub mod error;
pub mod types;

use crate::config::Config;
use crate::gatehouse::ServiceState;
use crate::plugin_manager::PluginManager;
use crate::session::backend::SqlBackend;
use crate::session::error::SessionProviderError;
use crate::session::types::*;

#[derive(Clone, Debug)]
pub struct SessionProvider {
    backend_driver: Box<dyn backend::SessionBackend>,
    /// Hard session lifetime in seconds.
    ttl: i64,
}

#[async_trait]
pub trait SessionApi: Send + Sync + Clone {
    /// Cleanup expired sessions.
    async fn cleanup(&self, state: &ServiceState) -> Result<(), SessionProviderError>;

    async fn create_session(
        &self,
        state: &ServiceState,
        session: SessionCreate,
    ) -> Result<Session, SessionProviderError>;

    async fn delete_session<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
    ) -> Result<(), SessionProviderError>;

    async fn get_session<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
    ) -> Result<Option<Session>, SessionProviderError>;

    async fn update_session_tokens<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
        tokens: SessionTokenUpdate,
    ) -> Result<Session, SessionProviderError>;
}

#[cfg(test)]
mock! {
    pub SessionProvider {
        pub fn new(cfg: &Config, plugin_manager: &PluginManager) -> Result<Self, SessionProviderError>;
    }

    #[async_trait]
    impl SessionApi for SessionProvider {
        async fn cleanup(&self, state: &ServiceState) -> Result<(), SessionProviderError>;

        async fn create_session(
            &self,
            state: &ServiceState,
            session: SessionCreate,
        ) -> Result<Session, SessionProviderError>;

        async fn delete_session<'a>(
            &self,
            state: &ServiceState,
            id: &'a str,
        ) -> Result<(), SessionProviderError>;

        async fn get_session<'a>(
            &self,
            state: &ServiceState,
            id: &'a str,
        ) -> Result<Option<Session>, SessionProviderError>;

        async fn update_session_tokens<'a>(
            &self,
            state: &ServiceState,
            id: &'a str,
            tokens: SessionTokenUpdate,
        ) -> Result<Session, SessionProviderError>;
    }

    impl Clone for SessionProvider {
        fn clone(&self) -> Self;
    }
}

/// Generate an opaque high-entropy session id.
fn generate_session_id() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

impl SessionProvider {
    pub fn new(
        config: &Config,
        plugin_manager: &PluginManager,
    ) -> Result<Self, SessionProviderError> {
        let mut backend_driver = if let Some(driver) =
            plugin_manager.get_session_backend(config.session.driver.clone())
        {
            driver.clone()
        } else {
            match config.session.driver.as_str() {
                "sql" => Box::new(SqlBackend::default()) as Box<dyn backend::SessionBackend>,
                _ => {
                    return Err(SessionProviderError::UnsupportedDriver(
                        config.session.driver.clone(),
                    ));
                }
            }
        };
        backend_driver.set_config(config.clone());
        Ok(Self {
            backend_driver,
            ttl: config.session.ttl,
        })
    }
}

#[async_trait]
impl SessionApi for SessionProvider {
    /// Cleanup expired sessions.
    #[tracing::instrument(level = "info", skip(self, state))]
    async fn cleanup(&self, state: &ServiceState) -> Result<(), SessionProviderError> {
        self.backend_driver.cleanup(state).await
    }

    /// Create a new session with a generated id and the configured lifetime.
    #[tracing::instrument(level = "debug", skip(self, state, session))]
    async fn create_session(
        &self,
        state: &ServiceState,
        session: SessionCreate,
    ) -> Result<Session, SessionProviderError> {
        let id = if session.id.is_empty() {
            generate_session_id()
        } else {
            session.id.clone()
        };
        let expires_at = session
            .expires_at
            .unwrap_or_else(|| Utc::now() + Duration::seconds(self.ttl));

        let rec = Session {
            id,
            provider_type: session.provider_type,
            external_id: session.external_id,
            email: session.email,
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            token_expires_at: session.token_expires_at,
            account_snapshot: session.account_snapshot,
            expires_at,
            ..Default::default()
        };

        self.backend_driver.create_session(state, rec).await
    }

    /// Delete a session by ID.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn delete_session<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
    ) -> Result<(), SessionProviderError> {
        self.backend_driver.delete_session(state, id).await
    }

    /// Get single session by ID. Expired sessions are reported as absent and
    /// removed on the way.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn get_session<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
    ) -> Result<Option<Session>, SessionProviderError> {
        match self.backend_driver.get_session(state, id).await? {
            Some(session) if session.expires_at <= Utc::now() => {
                self.backend_driver.delete_session(state, id).await?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    /// Replace the token bundle of a session.
    #[tracing::instrument(level = "debug", skip(self, state, tokens))]
    async fn update_session_tokens<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
        tokens: SessionTokenUpdate,
    ) -> Result<Session, SessionProviderError> {
        self.backend_driver
            .update_session_tokens(state, id, tokens)
            .await
    }
}
