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

use crate::db::entity::ws_client as db_ws_client;
use crate::webservice::backend::error::WebserviceDatabaseError;
use crate::webservice::types::*;

mod get;

pub use get::get;

impl TryFrom<db_ws_client::Model> for Client {
    type Error = WebserviceDatabaseError;

    fn try_from(value: db_ws_client::Model) -> Result<Self, Self::Error> {
        let mut builder = ClientBuilder::default();
        builder.id(value.id.clone());
        builder.bundle_id(value.bundle_id.clone());
        builder.name(value.name.clone());
        builder.enabled(value.enabled);
        builder.ip_restricted(value.ip_restricted);
        Ok(builder.build()?)
    }
}
