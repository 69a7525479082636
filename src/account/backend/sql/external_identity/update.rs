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

pub async fn update<P: AsRef<str>, E: AsRef<str>>(
    db: &DatabaseConnection,
    provider_type: P,
    external_id: E,
    rec: ExternalIdentityUpdate,
) -> Result<ExternalIdentity, AccountDatabaseError> {
    let current = DbExternalIdentity::find_by_id((
        provider_type.as_ref().into(),
        external_id.as_ref().into(),
    ))
    .one(db)
    .await
    .map_err(|err| db_err(err, "fetching identity linkage for update"))?
    .ok_or_else(|| {
        AccountDatabaseError::ExternalIdentityNotFound(
            provider_type.as_ref().to_string(),
            external_id.as_ref().to_string(),
        )
    })?;

    let mut entry: db_external_identity::ActiveModel = current.into();
    if let Some(email) = rec.email {
        entry.email = Set(Some(email));
    }
    if let Some(name) = rec.display_name {
        entry.display_name = Set(Some(name));
    }
    if let Some(url) = rec.profile_image_url {
        entry.profile_image_url = Set(Some(url));
    }
    if let Some(ts) = rec.last_used_at {
        entry.last_used_at = Set(Some(ts.naive_utc()));
    }

    let db_entry: db_external_identity::Model = entry
        .update(db)
        .await
        .map_err(|err| db_err(err, "updating identity linkage"))?;

    db_entry.try_into()
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::super::tests::get_external_identity_mock;
    use super::*;

    #[tokio::test]
    async fn test_update() {
        let mut updated = get_external_identity_mock("sub-1");
        updated.display_name = Some("Renamed".into());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![get_external_identity_mock("sub-1")],
                vec![updated.clone()],
            ])
            .into_connection();

        let req = ExternalIdentityUpdate {
            display_name: Some("Renamed".into()),
            ..Default::default()
        };

        assert_eq!(
            update(&db, "corp-okta", "sub-1", req).await.unwrap(),
            updated.try_into().unwrap()
        );
    }

    #[tokio::test]
    async fn test_update_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<db_external_identity::Model>::new()])
            .into_connection();

        assert!(matches!(
            update(&db, "corp-okta", "ghost", ExternalIdentityUpdate::default())
                .await
                .unwrap_err(),
            AccountDatabaseError::ExternalIdentityNotFound(..)
        ));
    }
}
