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

use crate::db::entity::login_state as db_login_state;
use crate::federation::backend::error::{FederationDatabaseError, db_err};
use crate::federation::types::*;

pub async fn create(
    db: &DatabaseConnection,
    rec: LoginState,
) -> Result<LoginState, FederationDatabaseError> {
    let entry = db_login_state::ActiveModel {
        state: Set(rec.state.clone()),
        provider_type: Set(rec.provider_type.clone()),
        nonce: Set(rec.nonce.clone()),
        pkce_verifier: Set(rec.pkce_verifier.clone()),
        redirect_uri: Set(rec.redirect_uri.clone()),
        return_to: Set(rec.return_to.clone()),
        expires_at: Set(rec.expires_at.naive_utc()),
    };

    let db_entry: db_login_state::Model = entry
        .insert(db)
        .await
        .map_err(|err| db_err(err, "persisting pending login state"))?;

    db_entry.try_into()
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase, Transaction};

    use super::super::tests::get_login_state_mock;
    use super::*;

    #[tokio::test]
    async fn test_create() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![get_login_state_mock("state")]])
            .into_connection();

        let req = LoginState {
            state: "state".into(),
            provider_type: "okta".into(),
            nonce: Some("nonce".into()),
            pkce_verifier: Some("pkce_verifier".into()),
            redirect_uri: "https://gh.example.com/auth/callback".into(),
            return_to: Some("/dashboard".into()),
            expires_at: DateTime::<Utc>::default(),
        };

        assert_eq!(
            create(&db, req).await.unwrap(),
            get_login_state_mock("state").try_into().unwrap()
        );
        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"INSERT INTO "login_state" ("state", "provider_type", "nonce", "pkce_verifier", "redirect_uri", "return_to", "expires_at") VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING "state", "provider_type", "nonce", "pkce_verifier", "redirect_uri", "return_to", "expires_at""#,
                [
                    "state".into(),
                    "okta".into(),
                    Some("nonce".to_string()).into(),
                    Some("pkce_verifier".to_string()).into(),
                    "https://gh.example.com/auth/callback".into(),
                    Some("/dashboard".to_string()).into(),
                    NaiveDateTime::default().into(),
                ]
            ),]
        );
    }
}
