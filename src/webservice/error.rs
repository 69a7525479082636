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
//! # Webservice provider error.
use thiserror::Error;

use crate::webservice::backend::error::*;

/// Webservice provider error.
#[derive(Error, Debug)]
pub enum WebserviceProviderError {
    /// Unsupported driver.
    #[error("unsupported driver {0}")]
    UnsupportedDriver(String),

    /// Conflict.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Secret hashing error.
    #[error("secret hashing error: {}", source)]
    SecretHash {
        /// The source of the error.
        #[from]
        source: bcrypt::BcryptError,
    },

    /// Blocking task join error.
    #[error("error joining the blocking task: {}", source)]
    Join {
        /// The source of the error.
        #[from]
        source: tokio::task::JoinError,
    },

    /// Webservice SQL backend error.
    #[error(transparent)]
    WebserviceDatabaseError {
        /// The source of the error.
        source: WebserviceDatabaseError,
    },
}

impl From<WebserviceDatabaseError> for WebserviceProviderError {
    fn from(source: WebserviceDatabaseError) -> Self {
        match source {
            ref e @ WebserviceDatabaseError::Conflict { .. } => Self::Conflict(e.to_string()),
            _ => Self::WebserviceDatabaseError { source },
        }
    }
}
