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

pub use super::account::Entity as Account;
pub use super::external_identity::Entity as ExternalIdentity;
pub use super::login_state::Entity as LoginState;
pub use super::session::Entity as Session;
pub use super::ws_bundle::Entity as WsBundle;
pub use super::ws_client::Entity as WsClient;
pub use super::ws_credential::Entity as WsCredential;
pub use super::ws_ip_rule::Entity as WsIpRule;
