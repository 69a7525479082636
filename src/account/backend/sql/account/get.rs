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

use crate::account::backend::error::{AccountDatabaseError, db_err};
use crate::account::types::*;
use crate::db::entity::{account as db_account, prelude::Account as DbAccount};

pub async fn get<I: AsRef<str>>(
    db: &DatabaseConnection,
    id: I,
) -> Result<Option<Account>, AccountDatabaseError> {
    let select = DbAccount::find_by_id(id.as_ref());

    let entry: Option<db_account::Model> = select
        .one(db)
        .await
        .map_err(|err| db_err(err, "fetching account by id"))?;
    entry.map(TryInto::try_into).transpose()
}

pub async fn get_by_email<E: AsRef<str>>(
    db: &DatabaseConnection,
    email: E,
) -> Result<Option<Account>, AccountDatabaseError> {
    let select = DbAccount::find().filter(db_account::Column::Email.eq(email.as_ref()));

    let entry: Option<db_account::Model> = select
        .one(db)
        .await
        .map_err(|err| db_err(err, "fetching account by email"))?;
    entry.map(TryInto::try_into).transpose()
}
