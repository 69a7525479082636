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

use crate::account::backend::error::AccountDatabaseError;
use crate::account::types::*;
use crate::db::entity::account as db_account;

mod create;
mod get;
mod record_login;
mod update_profile;

pub use create::create;
pub use get::{get, get_by_email};
pub use record_login::record_login;
pub use update_profile::update_profile;

impl TryFrom<db_account::Model> for Account {
    type Error = AccountDatabaseError;

    fn try_from(value: db_account::Model) -> Result<Self, Self::Error> {
        let mut builder = AccountBuilder::default();
        builder.id(value.id.clone());
        builder.email(value.email.clone());
        builder.name(value.name.clone());
        if let Some(url) = value.profile_image_url {
            builder.profile_image_url(url);
        }
        builder.enabled(value.enabled);
        builder.created_at(value.created_at.and_utc());
        if let Some(ts) = value.last_login_at {
            builder.last_login_at(ts.and_utc());
        }
        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use crate::db::entity::account as db_account;

    pub(super) fn get_account_mock<S: AsRef<str>>(id: S) -> db_account::Model {
        db_account::Model {
            id: id.as_ref().into(),
            email: "user@example.com".into(),
            name: "User".into(),
            profile_image_url: None,
            enabled: true,
            created_at: NaiveDateTime::default(),
            last_login_at: None,
        }
    }
}
