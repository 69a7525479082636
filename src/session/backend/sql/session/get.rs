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

use crate::db::entity::{prelude::Session as DbSession, session as db_session};
use crate::session::backend::error::{SessionDatabaseError, db_err};
use crate::session::types::*;

pub async fn get<I: AsRef<str>>(
    db: &DatabaseConnection,
    id: I,
) -> Result<Option<Session>, SessionDatabaseError> {
    let select = DbSession::find_by_id(id.as_ref());

    let entry: Option<db_session::Model> = select
        .one(db)
        .await
        .map_err(|err| db_err(err, "fetching session by id"))?;
    entry.map(TryInto::try_into).transpose()
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, Transaction};

    use super::super::tests::get_session_mock;
    use super::*;

    #[tokio::test]
    async fn test_get() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![get_session_mock("sess")]])
            .into_connection();
        assert_eq!(
            get(&db, "sess").await.unwrap().unwrap(),
            get_session_mock("sess").try_into().unwrap()
        );

        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"SELECT "session"."id", "session"."provider_type", "session"."external_id", "session"."email", "session"."access_token", "session"."refresh_token", "session"."token_expires_at", "session"."account_snapshot", "session"."expires_at", "session"."created_at", "session"."updated_at" FROM "session" WHERE "session"."id" = $1 LIMIT $2"#,
                ["sess".into(), 1u64.into()]
            ),]
        );
    }

    #[tokio::test]
    async fn test_get_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<db_session::Model>::new()])
            .into_connection();
        assert!(get(&db, "ghost").await.unwrap().is_none());
    }
}
