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

use crate::db::entity::login_state as db_login_state;
use crate::federation::backend::error::FederationDatabaseError;
use crate::federation::types::*;

mod create;
mod delete;
mod get;

pub use create::create;
pub use delete::{delete, delete_expired};
pub use get::get;

impl TryFrom<db_login_state::Model> for LoginState {
    type Error = FederationDatabaseError;

    fn try_from(value: db_login_state::Model) -> Result<Self, Self::Error> {
        let mut builder = LoginStateBuilder::default();
        builder.state(value.state.clone());
        builder.provider_type(value.provider_type.clone());
        if let Some(nonce) = &value.nonce {
            builder.nonce(nonce.clone());
        }
        if let Some(pkce_verifier) = &value.pkce_verifier {
            builder.pkce_verifier(pkce_verifier.clone());
        }
        builder.redirect_uri(value.redirect_uri.clone());
        if let Some(return_to) = &value.return_to {
            builder.return_to(return_to.clone());
        }
        builder.expires_at(value.expires_at.and_utc());
        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use crate::db::entity::login_state as db_login_state;

    pub(super) fn get_login_state_mock<S: AsRef<str>>(state: S) -> db_login_state::Model {
        db_login_state::Model {
            state: state.as_ref().into(),
            provider_type: "okta".into(),
            nonce: Some("nonce".into()),
            pkce_verifier: Some("pkce_verifier".into()),
            redirect_uri: "https://gh.example.com/auth/callback".into(),
            return_to: Some("/dashboard".into()),
            expires_at: NaiveDateTime::default(),
        }
    }
}
