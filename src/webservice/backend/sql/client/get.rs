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

use crate::db::entity::{prelude::WsClient as DbWsClient, ws_client as db_ws_client};
use crate::webservice::backend::error::{WebserviceDatabaseError, db_err};
use crate::webservice::types::*;

pub async fn get<I: AsRef<str>>(
    db: &DatabaseConnection,
    id: I,
) -> Result<Option<Client>, WebserviceDatabaseError> {
    let select = DbWsClient::find_by_id(id.as_ref());

    let entry: Option<db_ws_client::Model> = select
        .one(db)
        .await
        .map_err(|err| db_err(err, "fetching client by id"))?;
    entry.map(TryInto::try_into).transpose()
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, Transaction};

    use super::super::tests::get_client_mock;
    use super::*;

    #[tokio::test]
    async fn test_get() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![get_client_mock("client")]])
            .into_connection();
        assert_eq!(
            get(&db, "client").await.unwrap().unwrap(),
            get_client_mock("client").try_into().unwrap()
        );

        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"SELECT "ws_client"."id", "ws_client"."bundle_id", "ws_client"."name", "ws_client"."enabled", "ws_client"."ip_restricted" FROM "ws_client" WHERE "ws_client"."id" = $1 LIMIT $2"#,
                ["client".into(), 1u64.into()]
            ),]
        );
    }
}
