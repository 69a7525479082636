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
use sea_orm::query::*;

use crate::db::entity::{prelude::WsIpRule as DbWsIpRule, ws_ip_rule as db_ws_ip_rule};
use crate::webservice::backend::error::{WebserviceDatabaseError, db_err};
use crate::webservice::types::*;

pub async fn list<C: AsRef<str>>(
    db: &DatabaseConnection,
    client_id: C,
) -> Result<Vec<IpRule>, WebserviceDatabaseError> {
    let select =
        DbWsIpRule::find().filter(db_ws_ip_rule::Column::ClientId.eq(client_id.as_ref()));

    let entries: Vec<db_ws_ip_rule::Model> = select
        .all(db)
        .await
        .map_err(|err| db_err(err, "listing client ip rules"))?;
    entries.into_iter().map(TryInto::try_into).collect()
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, Transaction};

    use super::super::tests::get_ip_rule_mock;
    use super::*;

    #[tokio::test]
    async fn test_list() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![get_ip_rule_mock("203.0.113.7")]])
            .into_connection();
        assert_eq!(
            list(&db, "client").await.unwrap(),
            vec![get_ip_rule_mock("203.0.113.7").try_into().unwrap()]
        );

        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"SELECT "ws_ip_rule"."id", "ws_ip_rule"."client_id", "ws_ip_rule"."address" FROM "ws_ip_rule" WHERE "ws_ip_rule"."client_id" = $1"#,
                ["client".into()]
            ),]
        );
    }
}
