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

use crate::db::entity::{prelude::Session as DbSession, session as db_session};
use crate::session::backend::error::{SessionDatabaseError, db_err};
use crate::session::types::*;

pub async fn update_tokens<I: AsRef<str>>(
    db: &DatabaseConnection,
    id: I,
    tokens: SessionTokenUpdate,
) -> Result<Session, SessionDatabaseError> {
    let current = DbSession::find_by_id(id.as_ref())
        .one(db)
        .await
        .map_err(|err| db_err(err, "fetching session for token update"))?
        .ok_or_else(|| SessionDatabaseError::SessionNotFound(id.as_ref().to_string()))?;

    let mut entry: db_session::ActiveModel = current.into();
    entry.access_token = Set(tokens.access_token.clone());
    if let Some(token) = tokens.refresh_token {
        entry.refresh_token = Set(Some(token));
    }
    entry.token_expires_at = Set(tokens.token_expires_at.map(|ts| ts.naive_utc()));
    entry.updated_at = Set(Utc::now().naive_utc());

    let db_entry: db_session::Model = entry
        .update(db)
        .await
        .map_err(|err| db_err(err, "updating session tokens"))?;

    db_entry.try_into()
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::super::tests::get_session_mock;
    use super::*;

    #[tokio::test]
    async fn test_update_tokens() {
        let mut updated = get_session_mock("sess");
        updated.access_token = "at2".into();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![get_session_mock("sess")], vec![updated.clone()]])
            .into_connection();

        let req = SessionTokenUpdate {
            access_token: "at2".into(),
            refresh_token: None,
            token_expires_at: None,
        };

        assert_eq!(
            update_tokens(&db, "sess", req).await.unwrap(),
            updated.try_into().unwrap()
        );
    }

    #[tokio::test]
    async fn test_update_tokens_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<db_session::Model>::new()])
            .into_connection();

        assert!(matches!(
            update_tokens(&db, "ghost", SessionTokenUpdate::default())
                .await
                .unwrap_err(),
            SessionDatabaseError::SessionNotFound(..)
        ));
    }
}
