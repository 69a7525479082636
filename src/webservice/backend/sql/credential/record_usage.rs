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

use crate::db::entity::{
    prelude::WsCredential as DbWsCredential, ws_credential as db_ws_credential,
};
use crate::webservice::backend::error::{WebserviceDatabaseError, db_err};

pub async fn record_usage<I: AsRef<str>>(
    db: &DatabaseConnection,
    id: I,
    used_at: DateTime<Utc>,
) -> Result<(), WebserviceDatabaseError> {
    DbWsCredential::update_many()
        .col_expr(
            db_ws_credential::Column::LastUsedAt,
            Expr::value(used_at.naive_utc()),
        )
        .filter(db_ws_credential::Column::Id.eq(id.as_ref()))
        .exec(db)
        .await
        .map_err(|err| db_err(err, "recording credential usage"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Transaction};

    use super::*;

    #[tokio::test]
    async fn test_record_usage() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let ts = DateTime::<Utc>::default();
        record_usage(&db, "cred", ts).await.unwrap();

        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"UPDATE "ws_credential" SET "last_used_at" = $1 WHERE "ws_credential"."id" = $2"#,
                [ts.naive_utc().into(), "cred".into()]
            ),]
        );
    }
}
