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

use chrono::Utc;
use sea_orm::DatabaseConnection;
use sea_orm::entity::*;

use crate::account::backend::error::{AccountDatabaseError, db_err};
use crate::account::types::*;
use crate::db::entity::account as db_account;

pub async fn create(
    db: &DatabaseConnection,
    rec: AccountCreate,
) -> Result<Account, AccountDatabaseError> {
    let entry = db_account::ActiveModel {
        id: Set(rec.id.clone()),
        email: Set(rec.email.clone()),
        name: Set(rec.name.clone()),
        profile_image_url: Set(rec.profile_image_url.clone()),
        enabled: Set(rec.enabled),
        created_at: Set(Utc::now().naive_utc()),
        last_login_at: NotSet,
    };

    let db_entry: db_account::Model = entry
        .insert(db)
        .await
        .map_err(|err| db_err(err, "persisting account"))?;

    db_entry.try_into()
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::super::tests::get_account_mock;
    use super::*;

    #[tokio::test]
    async fn test_create() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![get_account_mock("acc")]])
            .into_connection();

        let req = AccountCreate {
            id: "acc".into(),
            email: "user@example.com".into(),
            name: "User".into(),
            profile_image_url: None,
            enabled: true,
        };

        assert_eq!(
            create(&db, req).await.unwrap(),
            get_account_mock("acc").try_into().unwrap()
        );
    }
}
