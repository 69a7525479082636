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

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;

/// An issued key/secret pair. The secret is stored only as a salted hash and
/// is never retrievable after issuance; rows are mutated only in the
/// status/usage fields so the issuance audit trail stays intact.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ws_credential")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub client_id: String,
    #[sea_orm(unique)]
    pub api_key: String,
    pub secret_hash: String,
    pub enabled: bool,
    pub expires_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub last_used_at: Option<NaiveDateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ws_client::Entity",
        from = "Column::ClientId",
        to = "super::ws_client::Column::Id"
    )]
    WsClient,
}

impl Related<super::ws_client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WsClient.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
