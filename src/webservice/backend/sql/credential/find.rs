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

use crate::db::entity::{
    prelude::WsCredential as DbWsCredential, ws_credential as db_ws_credential,
};
use crate::webservice::backend::error::{WebserviceDatabaseError, db_err};
use crate::webservice::types::*;

pub async fn find<K: AsRef<str>>(
    db: &DatabaseConnection,
    api_key: K,
) -> Result<Option<Credential>, WebserviceDatabaseError> {
    let select =
        DbWsCredential::find().filter(db_ws_credential::Column::ApiKey.eq(api_key.as_ref()));

    let entry: Option<db_ws_credential::Model> = select
        .one(db)
        .await
        .map_err(|err| db_err(err, "fetching credential by api key"))?;
    entry.map(TryInto::try_into).transpose()
}
