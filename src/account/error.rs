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
//! # Account provider error.
use thiserror::Error;

use crate::account::backend::error::*;

/// Account provider error.
#[derive(Error, Debug)]
pub enum AccountProviderError {
    /// Unsupported driver.
    #[error("unsupported driver {0}")]
    UnsupportedDriver(String),

    /// Conflict.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Account not found.
    #[error("account {0} not found")]
    AccountNotFound(String),

    /// Identity linkage not found.
    #[error("identity {1} of provider {0} not found")]
    ExternalIdentityNotFound(String, String),

    /// Account SQL backend error.
    #[error(transparent)]
    AccountDatabaseError {
        /// The source of the error.
        source: AccountDatabaseError,
    },
}

impl From<AccountDatabaseError> for AccountProviderError {
    fn from(source: AccountDatabaseError) -> Self {
        match source {
            ref e @ AccountDatabaseError::Conflict { .. } => Self::Conflict(e.to_string()),
            _ => Self::AccountDatabaseError { source },
        }
    }
}
