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
//! # Audit event types.
use serde::Serialize;

/// A single auditable authentication outcome.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    /// A known identity logged in.
    Login {
        provider_type: String,
        external_id: String,
        account_id: String,
    },
    /// A new identity was linked to an existing account during login.
    LoginLinked {
        provider_type: String,
        external_id: String,
        account_id: String,
    },
    /// A login attempt was rejected. The reason stays server-side.
    LoginRejected {
        provider_type: String,
        external_id: Option<String>,
        reason: String,
    },
    /// A session was terminated on user request.
    Logout {
        account_id: String,
        session_id: String,
    },
    /// A webservice client authenticated successfully.
    WsAuthenticated {
        bundle_code: String,
        client_id: String,
    },
    /// A webservice authentication attempt was rejected.
    WsRejected {
        bundle_code: String,
        reason: String,
    },
}

/// An [`AuditEvent`] stamped with the ambient request data captured at
/// emission time.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AuditRecord {
    /// Request id of the request that produced the event.
    pub request_id: Option<String>,

    /// Originating client address.
    pub client_ip: Option<String>,

    /// The event itself.
    #[serde(flatten)]
    pub event: AuditEvent,
}
