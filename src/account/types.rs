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
//! # Account provider types.
use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// A canonical user account. Exactly one exists per person regardless of how
/// many identity providers can vouch for them.
#[derive(Builder, Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[builder(setter(strip_option, into))]
pub struct Account {
    /// Account ID.
    pub id: String,

    /// Primary email address (unique across the deployment).
    pub email: String,

    /// Display name.
    pub name: String,

    /// Profile image URL.
    #[builder(default)]
    pub profile_image_url: Option<String>,

    /// Whether the account may authenticate.
    #[builder(default = "true")]
    pub enabled: bool,

    /// Creation timestamp.
    #[builder(default)]
    pub created_at: DateTime<Utc>,

    /// Timestamp of the most recent successful login.
    #[builder(default)]
    pub last_login_at: Option<DateTime<Utc>>,
}

/// New account data.
#[derive(Builder, Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[builder(setter(strip_option, into))]
pub struct AccountCreate {
    /// Account ID (generated when empty).
    #[builder(default)]
    pub id: String,

    /// Primary email address.
    pub email: String,

    /// Display name.
    pub name: String,

    /// Profile image URL.
    #[builder(default)]
    pub profile_image_url: Option<String>,

    /// Whether the account may authenticate.
    #[builder(default = "true")]
    pub enabled: bool,
}

/// Profile attributes refreshed from an identity provider assertion.
#[derive(Builder, Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[builder(setter(strip_option, into))]
pub struct AccountProfileUpdate {
    /// New display name.
    #[builder(default)]
    pub name: Option<String>,

    /// New profile image URL.
    #[builder(default)]
    pub profile_image_url: Option<String>,
}

/// A linkage between a canonical account and one identity provider persona.
/// Keyed by (provider_type, external_id); the cached attributes are refreshed
/// on every login through that provider.
#[derive(Builder, Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[builder(setter(strip_option, into))]
pub struct ExternalIdentity {
    /// Provider type the identity belongs to.
    pub provider_type: String,

    /// Subject identifier issued by the provider.
    pub external_id: String,

    /// Canonical account the identity is linked to.
    pub account_id: String,

    /// Email as last asserted by the provider.
    #[builder(default)]
    pub email: Option<String>,

    /// Display name as last asserted by the provider.
    #[builder(default)]
    pub display_name: Option<String>,

    /// Profile image URL as last asserted by the provider.
    #[builder(default)]
    pub profile_image_url: Option<String>,

    /// Timestamp the linkage was established.
    #[builder(default)]
    pub created_at: DateTime<Utc>,

    /// Timestamp of the most recent login through this identity.
    #[builder(default)]
    pub last_used_at: Option<DateTime<Utc>>,
}

/// New identity linkage data.
#[derive(Builder, Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[builder(setter(strip_option, into))]
pub struct ExternalIdentityCreate {
    /// Provider type the identity belongs to.
    pub provider_type: String,

    /// Subject identifier issued by the provider.
    pub external_id: String,

    /// Canonical account to link to.
    pub account_id: String,

    /// Asserted email.
    #[builder(default)]
    pub email: Option<String>,

    /// Asserted display name.
    #[builder(default)]
    pub display_name: Option<String>,

    /// Asserted profile image URL.
    #[builder(default)]
    pub profile_image_url: Option<String>,
}

/// Cached attribute refresh for an existing identity linkage.
#[derive(Builder, Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[builder(setter(strip_option, into))]
pub struct ExternalIdentityUpdate {
    /// Asserted email.
    #[builder(default)]
    pub email: Option<String>,

    /// Asserted display name.
    #[builder(default)]
    pub display_name: Option<String>,

    /// Asserted profile image URL.
    #[builder(default)]
    pub profile_image_url: Option<String>,

    /// Login timestamp to record.
    #[builder(default)]
    pub last_used_at: Option<DateTime<Utc>>,
}
