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
use sea_orm::sea_query::Expr;

use crate::account::backend::error::{AccountDatabaseError, db_err};
use crate::db::entity::{account as db_account, prelude::Account as DbAccount};

pub async fn record_login<I: AsRef<str>>(
    db: &DatabaseConnection,
    id: I,
    login_at: DateTime<Utc>,
) -> Result<(), AccountDatabaseError> {
    DbAccount::update_many()
        .col_expr(
            db_account::Column::LastLoginAt,
            Expr::value(login_at.naive_utc()),
        )
        .filter(db_account::Column::Id.eq(id.as_ref()))
        .exec(db)
        .await
        .map_err(|err| db_err(err, "recording account login"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Transaction};

    use super::*;

    #[tokio::test]
    async fn test_record_login() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let ts = DateTime::<Utc>::default();
        record_login(&db, "acc", ts).await.unwrap();

        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"UPDATE "account" SET "last_login_at" = $1 WHERE "account"."id" = $2"#,
                [ts.naive_utc().into(), "acc".into()]
            ),]
        );
    }
}
