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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::account::types::Account;
use crate::federation::types::ProviderDescription;

/// Query parameters of the login initiation endpoint.
#[derive(Debug, Deserialize, IntoParams)]
pub struct LoginQuery {
    /// Identity provider to authenticate against. The configured default is
    /// used when omitted.
    pub provider: Option<String>,

    /// Relative url to land on after a successful login.
    pub return_to: Option<String>,
}

/// The authenticated account as exposed to the browser.
#[derive(Debug, Serialize, ToSchema)]
pub struct AccountResponse {
    /// Account ID.
    pub id: String,

    /// Primary email address.
    pub email: String,

    /// Display name.
    pub name: String,

    /// Profile image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,

    /// Timestamp of the most recent successful login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<Account> for AccountResponse {
    fn from(value: Account) -> Self {
        Self {
            id: value.id,
            email: value.email,
            name: value.name,
            profile_image_url: value.profile_image_url,
            last_login_at: value.last_login_at,
        }
    }
}

/// List of configured identity providers.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProviderListResponse {
    /// Configured providers.
    pub providers: Vec<ProviderDescription>,
}
