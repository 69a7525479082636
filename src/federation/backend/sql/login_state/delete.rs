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

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use sea_orm::entity::*;
use sea_orm::query::*;

use crate::db::entity::{login_state as db_login_state, prelude::LoginState as DbLoginState};
use crate::federation::backend::error::{FederationDatabaseError, db_err};

pub async fn delete<T: AsRef<str>>(
    db: &DatabaseConnection,
    tag: T,
) -> Result<(), FederationDatabaseError> {
    let res = DbLoginState::delete_by_id(tag.as_ref())
        .exec(db)
        .await
        .map_err(|err| db_err(err, "deleting pending login state"))?;
    if res.rows_affected == 0 {
        return Err(FederationDatabaseError::LoginStateNotFound(
            tag.as_ref().to_string(),
        ));
    }
    Ok(())
}

pub async fn delete_expired(
    db: &DatabaseConnection,
    before: DateTime<Utc>,
) -> Result<u64, FederationDatabaseError> {
    let res = DbLoginState::delete_many()
        .filter(db_login_state::Column::ExpiresAt.lt(before.naive_utc()))
        .exec(db)
        .await
        .map_err(|err| db_err(err, "deleting expired login states"))?;
    Ok(res.rows_affected)
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

        delete(&db, "state").await.unwrap();

        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"DELETE FROM "login_state" WHERE "login_state"."state" = $1"#,
                ["state".into()]
            ),]
        );
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        assert!(matches!(
            delete(&db, "ghost").await.unwrap_err(),
            FederationDatabaseError::LoginStateNotFound(..)
        ));
    }

    #[tokio::test]
    async fn test_delete_expired() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 3,
            }])
            .into_connection();

        let ts = DateTime::<Utc>::default();
        assert_eq!(3, delete_expired(&db, ts).await.unwrap());

        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"DELETE FROM "login_state" WHERE "login_state"."expires_at" < $1"#,
                [ts.naive_utc().into()]
            ),]
        );
    }
}
