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

use sea_orm::entity::prelude::*;

/// A tenant consuming one API bundle.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ws_client")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub bundle_id: String,
    pub name: String,
    pub enabled: bool,
    pub ip_restricted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ws_bundle::Entity",
        from = "Column::BundleId",
        to = "super::ws_bundle::Column::Id"
    )]
    WsBundle,
    #[sea_orm(has_many = "super::ws_credential::Entity")]
    WsCredential,
    #[sea_orm(has_many = "super::ws_ip_rule::Entity")]
    WsIpRule,
}

impl Related<super::ws_bundle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WsBundle.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
