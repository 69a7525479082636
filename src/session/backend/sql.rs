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
//! # Session SQL driver
use async_trait::async_trait;

use super::super::types::*;
use crate::config::Config;
use crate::gatehouse::ServiceState;
use crate::session::{SessionProviderError, backend::SessionBackend};

mod session;

/// SQL backend provider implementing the SessionBackend interface.
#[derive(Clone, Debug, Default)]
pub struct SqlBackend {
    /// Config.
    pub config: Config,
}

#[async_trait]
impl SessionBackend for SqlBackend {
    /// Set config
    fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    /// Cleanup expired sessions.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn cleanup(&self, state: &ServiceState) -> Result<(), SessionProviderError> {
        Ok(session::delete_expired(&state.db).await?)
    }

    /// Create a new session.
    #[tracing::instrument(level = "debug", skip(self, state, rec))]
    async fn create_session(
        &self,
        state: &ServiceState,
        rec: Session,
    ) -> Result<Session, SessionProviderError> {
        Ok(session::create(&state.db, rec).await?)
    }

    /// Delete a session by ID.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn delete_session<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
    ) -> Result<(), SessionProviderError> {
        Ok(session::delete(&state.db, id).await?)
    }

    /// Get single session by ID.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn get_session<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
    ) -> Result<Option<Session>, SessionProviderError> {
        Ok(session::get(&state.db, id).await?)
    }

    /// Replace the token bundle of a session.
    #[tracing::instrument(level = "debug", skip(self, state, tokens))]
    async fn update_session_tokens<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
        tokens: SessionTokenUpdate,
    ) -> Result<Session, SessionProviderError> {
        Ok(session::update_tokens(&state.db, id, tokens).await?)
    }
}
