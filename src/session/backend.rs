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
use dyn_clone::DynClone;

use crate::config::Config;
use crate::gatehouse::ServiceState;
use crate::session::SessionProviderError;
use crate::session::types::*;

pub mod error;
pub mod sql;

pub use sql::SqlBackend;

/// Backend driver interface for the Session Provider.
#[async_trait]
pub trait SessionBackend: DynClone + Send + Sync + std::fmt::Debug {
    /// Set config.
    fn set_config(&mut self, config: Config);

    /// Cleanup expired sessions.
    async fn cleanup(&self, state: &ServiceState) -> Result<(), SessionProviderError>;

    /// Create a new session.
    async fn create_session(
        &self,
        state: &ServiceState,
        session: Session,
    ) -> Result<Session, SessionProviderError>;

    /// Delete a session by ID.
    async fn delete_session<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
    ) -> Result<(), SessionProviderError>;

    /// Get single session by ID.
    async fn get_session<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
    ) -> Result<Option<Session>, SessionProviderError>;

    /// Replace the token bundle of a session.
    async fn update_session_tokens<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
        tokens: SessionTokenUpdate,
    ) -> Result<Session, SessionProviderError>;
}

dyn_clone::clone_trait_object!(SessionBackend);
