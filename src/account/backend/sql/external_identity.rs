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

use crate::account::backend::error::AccountDatabaseError;
use crate::account::types::*;
use crate::db::entity::external_identity as db_external_identity;

mod create;
mod find;
mod update;

pub use create::create;
pub use find::find;
pub use update::update;

impl TryFrom<db_external_identity::Model> for ExternalIdentity {
    type Error = AccountDatabaseError;

    fn try_from(value: db_external_identity::Model) -> Result<Self, Self::Error> {
        let mut builder = ExternalIdentityBuilder::default();
        builder.provider_type(value.provider_type.clone());
        builder.external_id(value.external_id.clone());
        builder.account_id(value.account_id.clone());
        if let Some(email) = value.email {
            builder.email(email);
        }
        if let Some(name) = value.display_name {
            builder.display_name(name);
        }
        if let Some(url) = value.profile_image_url {
            builder.profile_image_url(url);
        }
        builder.created_at(value.created_at.and_utc());
        if let Some(ts) = value.last_used_at {
            builder.last_used_at(ts.and_utc());
        }
        Ok(builder.build()?)
    }
}
