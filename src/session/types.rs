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
//! # Session provider types.
use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::account::types::Account;

/// A server-side login session.
///
/// The browser only ever holds the opaque `id`; everything else, including
/// the IdP token bundle, stays on this side of the trust boundary.
#[derive(Builder, Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[builder(setter(strip_option, into))]
pub struct Session {
    /// Opaque session id (cookie value).
    pub id: String,

    /// Provider type that authenticated the session.
    pub provider_type: String,

    /// Subject identifier asserted by the provider.
    pub external_id: String,

    /// Email asserted by the provider.
    pub email: String,

    /// Provider access token.
    pub access_token: String,

    /// Provider refresh token, when the provider issued one.
    #[builder(default)]
    pub refresh_token: Option<String>,

    /// Expiry of the provider access token.
    #[builder(default)]
    pub token_expires_at: Option<DateTime<Utc>>,

    /// Opportunistic snapshot of the resolved account.
    #[builder(default)]
    pub account_snapshot: Option<Account>,

    /// Hard session expiry.
    #[builder(default)]
    pub expires_at: DateTime<Utc>,

    /// Creation timestamp.
    #[builder(default)]
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp.
    #[builder(default)]
    pub updated_at: DateTime<Utc>,
}

/// New session data. The id and the hard expiry are assigned by the provider.
#[derive(Builder, Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[builder(setter(strip_option, into))]
pub struct SessionCreate {
    /// Session id (generated when empty).
    #[builder(default)]
    pub id: String,

    /// Provider type that authenticated the session.
    pub provider_type: String,

    /// Subject identifier asserted by the provider.
    pub external_id: String,

    /// Email asserted by the provider.
    pub email: String,

    /// Provider access token.
    pub access_token: String,

    /// Provider refresh token.
    #[builder(default)]
    pub refresh_token: Option<String>,

    /// Expiry of the provider access token.
    #[builder(default)]
    pub token_expires_at: Option<DateTime<Utc>>,

    /// Snapshot of the resolved account.
    #[builder(default)]
    pub account_snapshot: Option<Account>,

    /// Hard session expiry (filled by the provider from config when unset).
    #[builder(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Replacement token bundle after a successful refresh.
#[derive(Builder, Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[builder(setter(strip_option, into))]
pub struct SessionTokenUpdate {
    /// New access token.
    pub access_token: String,

    /// New refresh token (providers may rotate it).
    #[builder(default)]
    pub refresh_token: Option<String>,

    /// Expiry of the new access token.
    #[builder(default)]
    pub token_expires_at: Option<DateTime<Utc>>,
}
