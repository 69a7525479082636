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
//! # Webservice provider types.
use chrono::{DateTime, Utc};
use derive_builder::Builder;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// A logical API product offered to machine clients.
#[derive(Builder, Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[builder(setter(strip_option, into))]
pub struct Bundle {
    /// Bundle ID.
    pub id: String,

    /// Stable code used in URLs (e.g. "payroll").
    pub code: String,

    /// Human readable name.
    pub name: String,

    /// Whether the bundle accepts authentication at all.
    #[builder(default = "true")]
    pub enabled: bool,
}

/// A tenant consuming one bundle.
#[derive(Builder, Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[builder(setter(strip_option, into))]
pub struct Client {
    /// Client ID.
    pub id: String,

    /// Bundle the client is admitted to.
    pub bundle_id: String,

    /// Human readable name.
    pub name: String,

    /// Whether the client may authenticate.
    #[builder(default = "true")]
    pub enabled: bool,

    /// Whether the client is restricted to its IP allow-list.
    #[builder(default)]
    pub ip_restricted: bool,
}

/// An issued key/secret credential. The secret itself is only ever present as
/// a bcrypt hash.
#[derive(Builder, Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[builder(setter(strip_option, into))]
pub struct Credential {
    /// Credential ID.
    pub id: String,

    /// Owning client.
    pub client_id: String,

    /// Public lookup key.
    pub api_key: String,

    /// Bcrypt hash of the secret.
    pub secret_hash: String,

    /// Whether the credential is active.
    #[builder(default = "true")]
    pub enabled: bool,

    /// Optional credential expiry.
    #[builder(default)]
    pub expires_at: Option<DateTime<Utc>>,

    /// Issuance timestamp.
    #[builder(default)]
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last successful authentication.
    #[builder(default)]
    pub last_used_at: Option<DateTime<Utc>>,
}

/// One allow-listed address of an IP-restricted client.
#[derive(Builder, Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[builder(setter(into))]
pub struct IpRule {
    /// Rule ID.
    pub id: String,

    /// Owning client.
    pub client_id: String,

    /// Allow-listed address.
    pub address: String,
}

/// Credentials as presented by the caller.
#[derive(Clone, Debug)]
pub struct PresentedCredentials {
    /// Public lookup key.
    pub api_key: String,

    /// The secret, kept out of debug output.
    pub secret: SecretString,
}

/// The identity attached to a request after successful webservice
/// authentication.
#[derive(Builder, Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[builder(setter(into))]
pub struct TrustContext {
    /// Authenticated client.
    pub client_id: String,

    /// Client name (for logging).
    pub client_name: String,

    /// Credential used.
    pub credential_id: String,

    /// Bundle the request was admitted to.
    pub bundle_id: String,

    /// Bundle code the request was admitted to.
    pub bundle_code: String,
}

/// Why a webservice authentication attempt was denied.
///
/// Exactly this set of codes may surface to callers; everything else
/// (including infrastructure failures) collapses into `InvalidCredentials`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WsDenyReason {
    MissingCredentials,
    InvalidCredentials,
    ClientNotFound,
    ClientInactive,
    BundleInactive,
    BundleMismatch,
    IpNotAllowed,
}

impl WsDenyReason {
    /// The stable wire code of the reason.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "MISSING_CREDENTIALS",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::ClientNotFound => "CLIENT_NOT_FOUND",
            Self::ClientInactive => "CLIENT_INACTIVE",
            Self::BundleInactive => "BUNDLE_INACTIVE",
            Self::BundleMismatch => "BUNDLE_MISMATCH",
            Self::IpNotAllowed => "IP_NOT_ALLOWED",
        }
    }
}

/// Outcome of a webservice authentication attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum WsAuthOutcome {
    /// Authenticated; requests may proceed with this trust context.
    Granted(TrustContext),
    /// Denied for the given reason.
    Denied(WsDenyReason),
}
