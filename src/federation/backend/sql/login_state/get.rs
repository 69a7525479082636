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

use crate::db::entity::{login_state as db_login_state, prelude::LoginState as DbLoginState};
use crate::federation::backend::error::{FederationDatabaseError, db_err};
use crate::federation::types::*;

pub async fn get<T: AsRef<str>>(
    db: &DatabaseConnection,
    tag: T,
) -> Result<Option<LoginState>, FederationDatabaseError> {
    let select = DbLoginState::find_by_id(tag.as_ref());

    let entry: Option<db_login_state::Model> = select
        .one(db)
        .await
        .map_err(|err| db_err(err, "fetching pending login state by tag"))?;
    entry.map(TryInto::try_into).transpose()
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, Transaction};

    use super::super::tests::get_login_state_mock;
    use super::*;

    #[tokio::test]
    async fn test_get() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![get_login_state_mock("state")]])
            .into_connection();
        assert_eq!(
            get(&db, "state").await.unwrap().unwrap(),
            get_login_state_mock("state").try_into().unwrap()
        );

        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"SELECT "login_state"."state", "login_state"."provider_type", "login_state"."nonce", "login_state"."pkce_verifier", "login_state"."redirect_uri", "login_state"."return_to", "login_state"."expires_at" FROM "login_state" WHERE "login_state"."state" = $1 LIMIT $2"#,
                ["state".into(), 1u64.into()]
            ),]
        );
    }

    #[tokio::test]
    async fn test_get_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<db_login_state::Model>::new()])
            .into_connection();
        assert!(get(&db, "ghost").await.unwrap().is_none());
    }
}
