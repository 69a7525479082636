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
use crate::db::entity::{
    external_identity as db_external_identity, prelude::ExternalIdentity as DbExternalIdentity,
};

pub async fn find<P: AsRef<str>, E: AsRef<str>>(
    db: &DatabaseConnection,
    provider_type: P,
    external_id: E,
) -> Result<Option<ExternalIdentity>, AccountDatabaseError> {
    let select =
        DbExternalIdentity::find_by_id((provider_type.as_ref().into(), external_id.as_ref().into()));

    let entry: Option<db_external_identity::Model> = select
        .one(db)
        .await
        .map_err(|err| db_err(err, "fetching identity linkage"))?;
    entry.map(TryInto::try_into).transpose()
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, Transaction};

    use super::super::tests::get_external_identity_mock;
    use super::*;

    #[tokio::test]
    async fn test_find() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![get_external_identity_mock("sub-1")]])
            .into_connection();
        assert_eq!(
            find(&db, "corp-okta", "sub-1").await.unwrap().unwrap(),
            get_external_identity_mock("sub-1").try_into().unwrap()
        );

        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"SELECT "external_identity"."provider_type", "external_identity"."external_id", "external_identity"."account_id", "external_identity"."email", "external_identity"."display_name", "external_identity"."profile_image_url", "external_identity"."created_at", "external_identity"."last_used_at" FROM "external_identity" WHERE "external_identity"."provider_type" = $1 AND "external_identity"."external_id" = $2 LIMIT $3"#,
                ["corp-okta".into(), "sub-1".into(), 1u64.into()]
            ),]
        );
    }

    #[tokio::test]
    async fn test_find_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<db_external_identity::Model>::new()])
            .into_connection();
        assert!(find(&db, "corp-okta", "ghost").await.unwrap().is_none());
    }
}
