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
use sea_orm::query::*;

use crate::db::entity::{prelude::Session as DbSession, session as db_session};
use crate::session::backend::error::{SessionDatabaseError, db_err};

pub async fn delete<I: AsRef<str>>(
    db: &DatabaseConnection,
    id: I,
) -> Result<(), SessionDatabaseError> {
    DbSession::delete_by_id(id.as_ref())
        .exec(db)
        .await
        .map_err(|err| db_err(err, "deleting session"))?;
    Ok(())
}

pub async fn delete_expired(db: &DatabaseConnection) -> Result<(), SessionDatabaseError> {
    DbSession::delete_many()
        .filter(db_session::Column::ExpiresAt.lt(Utc::now().naive_utc()))
        .exec(db)
        .await
        .map_err(|err| db_err(err, "deleting expired sessions"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Transaction};

    use super::*;

    #[tokio::test]
    async fn test_delete() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        delete(&db, "sess").await.unwrap();

        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"DELETE FROM "session" WHERE "session"."id" = $1"#,
                ["sess".into()]
            ),]
        );
    }

    #[tokio::test]
    async fn test_delete_expired() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 3,
            }])
            .into_connection();

        delete_expired(&db).await.unwrap();
    }
}
