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

use crate::db::entity::session as db_session;
use crate::session::backend::error::SessionDatabaseError;
use crate::session::types::*;

mod create;
mod delete;
mod get;
mod update_tokens;

pub use create::create;
pub use delete::{delete, delete_expired};
pub use get::get;
pub use update_tokens::update_tokens;

impl TryFrom<db_session::Model> for Session {
    type Error = SessionDatabaseError;

    fn try_from(value: db_session::Model) -> Result<Self, Self::Error> {
        let mut builder = SessionBuilder::default();
        builder.id(value.id.clone());
        builder.provider_type(value.provider_type.clone());
        builder.external_id(value.external_id.clone());
        builder.email(value.email.clone());
        builder.access_token(value.access_token.clone());
        if let Some(token) = value.refresh_token {
            builder.refresh_token(token);
        }
        if let Some(ts) = value.token_expires_at {
            builder.token_expires_at(ts.and_utc());
        }
        if let Some(snapshot) = value.account_snapshot {
            builder.account_snapshot(serde_json::from_value::<
                crate::account::types::Account,
            >(snapshot)?);
        }
        builder.expires_at(value.expires_at.and_utc());
        builder.created_at(value.created_at.and_utc());
        builder.updated_at(value.updated_at.and_utc());
        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use crate::db::entity::session as db_session;

    pub(super) fn get_session_mock<S: AsRef<str>>(id: S) -> db_session::Model {
        db_session::Model {
            id: id.as_ref().into(),
            provider_type: "corp-okta".into(),
            external_id: "sub-1".into(),
            email: "user@example.com".into(),
            access_token: "at".into(),
            refresh_token: Some("rt".into()),
            token_expires_at: Some(NaiveDateTime::default()),
            account_snapshot: None,
            expires_at: NaiveDateTime::default(),
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        }
    }
}
