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

use crate::db::entity::ws_credential as db_ws_credential;
use crate::webservice::backend::error::WebserviceDatabaseError;
use crate::webservice::types::*;

mod find;
mod record_usage;

pub use find::find;
pub use record_usage::record_usage;

impl TryFrom<db_ws_credential::Model> for Credential {
    type Error = WebserviceDatabaseError;

    fn try_from(value: db_ws_credential::Model) -> Result<Self, Self::Error> {
        let mut builder = CredentialBuilder::default();
        builder.id(value.id.clone());
        builder.client_id(value.client_id.clone());
        builder.api_key(value.api_key.clone());
        builder.secret_hash(value.secret_hash.clone());
        builder.enabled(value.enabled);
        if let Some(ts) = value.expires_at {
            builder.expires_at(ts.and_utc());
        }
        builder.created_at(value.created_at.and_utc());
        if let Some(ts) = value.last_used_at {
            builder.last_used_at(ts.and_utc());
        }
        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use crate::db::entity::ws_credential as db_ws_credential;

    pub(super) fn get_credential_mock<S: AsRef<str>>(id: S) -> db_ws_credential::Model {
        db_ws_credential::Model {
            id: id.as_ref().into(),
            client_id: "client".into(),
            api_key: "key".into(),
            secret_hash: "$2b$04$hash".into(),
            enabled: true,
            expires_at: None,
            created_at: NaiveDateTime::default(),
            last_used_at: None,
        }
    }
}
