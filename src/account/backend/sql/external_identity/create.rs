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

use crate::account::backend::error::{AccountDatabaseError, db_err};
use crate::account::types::*;
use crate::db::entity::external_identity as db_external_identity;

pub async fn create(
    db: &DatabaseConnection,
    rec: ExternalIdentityCreate,
) -> Result<ExternalIdentity, AccountDatabaseError> {
    let now = Utc::now();
    let entry = db_external_identity::ActiveModel {
        provider_type: Set(rec.provider_type.clone()),
        external_id: Set(rec.external_id.clone()),
        account_id: Set(rec.account_id.clone()),
        email: Set(rec.email.clone()),
        display_name: Set(rec.display_name.clone()),
        profile_image_url: Set(rec.profile_image_url.clone()),
        created_at: Set(now.naive_utc()),
        last_used_at: Set(Some(now.naive_utc())),
    };

    let db_entry: db_external_identity::Model = entry
        .insert(db)
        .await
        .map_err(|err| db_err(err, "persisting identity linkage"))?;

    db_entry.try_into()
}
