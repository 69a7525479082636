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

use thiserror::Error;

use crate::federation::backend::error::FederationDatabaseError;

/// Federation provider errors.
///
/// Protocol failures carry only a short description of the failing step; the
/// upstream provider response detail goes into the log, never towards the
/// browser.
#[derive(Debug, Error)]
pub enum FederationProviderError {
    /// Unsupported driver.
    #[error("unsupported driver {0}")]
    UnsupportedDriver(String),

    /// Conflict.
    #[error("{0}")]
    Conflict(String),

    /// No configured provider under the requested name.
    #[error("identity provider {0} is not configured")]
    ProviderNotFound(String),

    /// The state tag has no pending login behind it (unknown, expired or
    /// already consumed).
    #[error("no pending login for state {0}")]
    LoginStateNotFound(String),

    /// Provider metadata discovery failed.
    #[error("provider metadata discovery failed: {0}")]
    Discovery(String),

    /// The code exchange or refresh grant failed.
    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    /// The assertion could not be verified or is missing mandatory claims.
    #[error("invalid identity assertion: {0}")]
    InvalidAssertion(String),

    /// The provider denied the authorization request.
    #[error("authorization denied by the provider: {0}")]
    AuthorizationDenied(String),

    /// The provider does not support refreshing tokens.
    #[error("provider {0} does not support token refresh")]
    RefreshNotSupported(String),

    #[error("outgoing http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    UrlParse(#[from] url::ParseError),

    /// Federation SQL backend error.
    #[error(transparent)]
    FederationDatabaseError {
        /// The source of the error.
        source: FederationDatabaseError,
    },
}

impl From<FederationDatabaseError> for FederationProviderError {
    fn from(source: FederationDatabaseError) -> Self {
        match source {
            ref e @ FederationDatabaseError::Conflict { .. } => Self::Conflict(e.to_string()),
            FederationDatabaseError::LoginStateNotFound(state) => Self::LoginStateNotFound(state),
            _ => Self::FederationDatabaseError { source },
        }
    }
}
