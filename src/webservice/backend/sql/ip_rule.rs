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

use crate::db::entity::ws_ip_rule as db_ws_ip_rule;
use crate::webservice::backend::error::WebserviceDatabaseError;
use crate::webservice::types::*;

mod list;

pub use list::list;

impl TryFrom<db_ws_ip_rule::Model> for IpRule {
    type Error = WebserviceDatabaseError;

    fn try_from(value: db_ws_ip_rule::Model) -> Result<Self, Self::Error> {
        let mut builder = IpRuleBuilder::default();
        builder.id(value.id.clone());
        builder.client_id(value.client_id.clone());
        builder.address(value.address.clone());
        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::entity::ws_ip_rule as db_ws_ip_rule;

    pub(super) fn get_ip_rule_mock<S: AsRef<str>>(address: S) -> db_ws_ip_rule::Model {
        db_ws_ip_rule::Model {
            id: "rule".into(),
            client_id: "client".into(),
            address: address.as_ref().into(),
        }
    }
}
