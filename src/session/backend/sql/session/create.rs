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

use crate::db::entity::session as db_session;
use crate::session::backend::error::{SessionDatabaseError, db_err};
use crate::session::types::*;

pub async fn create(
    db: &DatabaseConnection,
    rec: Session,
) -> Result<Session, SessionDatabaseError> {
    let snapshot: Option<serde_json::Value> = if let Some(account) = &rec.account_snapshot {
        Some(serde_json::to_value(account)?)
    } else {
        None
    };
    let now = Utc::now().naive_utc();
    let entry = db_session::ActiveModel {
        id: Set(rec.id.clone()),
        provider_type: Set(rec.provider_type.clone()),
        external_id: Set(rec.external_id.clone()),
        email: Set(rec.email.clone()),
        access_token: Set(rec.access_token.clone()),
        refresh_token: Set(rec.refresh_token.clone()),
        token_expires_at: Set(rec.token_expires_at.map(|ts| ts.naive_utc())),
        account_snapshot: Set(snapshot),
        expires_at: Set(rec.expires_at.naive_utc()),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let db_entry: db_session::Model = entry
        .insert(db)
        .await
        .map_err(|err| db_err(err, "persisting session"))?;

    db_entry.try_into()
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::super::tests::get_session_mock;
    use super::*;

    #[tokio::test]
    async fn test_create() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![get_session_mock("sess")]])
            .into_connection();

        let req: Session = get_session_mock("sess").try_into().unwrap();
        assert_eq!(
            create(&db, req).await.unwrap(),
            get_session_mock("sess").try_into().unwrap()
        );
    }
}
