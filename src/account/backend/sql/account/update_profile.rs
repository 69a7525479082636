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

use sea_orm::DatabaseConnection;
use sea_orm::entity::*;

use crate::account::backend::error::{AccountDatabaseError, db_err};
use crate::account::types::*;
use crate::db::entity::{account as db_account, prelude::Account as DbAccount};

pub async fn update_profile<I: AsRef<str>>(
    db: &DatabaseConnection,
    id: I,
    profile: AccountProfileUpdate,
) -> Result<Account, AccountDatabaseError> {
    let current = DbAccount::find_by_id(id.as_ref())
        .one(db)
        .await
        .map_err(|err| db_err(err, "fetching account for profile update"))?
        .ok_or_else(|| AccountDatabaseError::AccountNotFound(id.as_ref().to_string()))?;

    let mut entry: db_account::ActiveModel = current.into();
    if let Some(name) = profile.name {
        entry.name = Set(name);
    }
    if let Some(url) = profile.profile_image_url {
        entry.profile_image_url = Set(Some(url));
    }

    let db_entry: db_account::Model = entry
        .update(db)
        .await
        .map_err(|err| db_err(err, "updating account profile"))?;

    db_entry.try_into()
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::super::tests::get_account_mock;
    use super::*;

    #[tokio::test]
    async fn test_update_profile() {
        let mut updated = get_account_mock("acc");
        updated.name = "Renamed".into();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![get_account_mock("acc")], vec![updated.clone()]])
            .into_connection();

        let req = AccountProfileUpdate {
            name: Some("Renamed".into()),
            profile_image_url: None,
        };

        assert_eq!(
            update_profile(&db, "acc", req).await.unwrap(),
            updated.try_into().unwrap()
        );
    }

    #[tokio::test]
    async fn test_update_profile_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<db_account::Model>::new()])
            .into_connection();

        let req = AccountProfileUpdate::default();
        assert!(matches!(
            update_profile(&db, "missing", req).await.unwrap_err(),
            AccountDatabaseError::AccountNotFound(..)
        ));
    }
}
