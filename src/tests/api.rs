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
use std::sync::Arc;

use crate::config::Config;
use crate::federation::registry::ProviderRegistry;
use crate::gatehouse::{Service, ServiceState};
use crate::provider::Provider;
use crate::session::MockSessionProvider;

/// Service state over mocked providers and a disconnected database.
pub(crate) fn get_mocked_state(provider: Provider) -> ServiceState {
    get_mocked_state_with_registry(provider, ProviderRegistry::default())
}

/// Same, with a caller-assembled adapter registry.
pub(crate) fn get_mocked_state_with_registry(
    provider: Provider,
    registry: ProviderRegistry,
) -> ServiceState {
    Arc::new(
        Service::new(
            Config::default(),
            DatabaseConnection::Disconnected,
            provider,
            registry,
        )
        .unwrap(),
    )
}

/// Service state where every session lookup misses.
pub(crate) fn get_mocked_state_unauthed() -> ServiceState {
    let mut session_mock = MockSessionProvider::default();
    session_mock.expect_get_session().returning(|_, _| Ok(None));

    let provider = Provider::mocked_builder()
        .session(session_mock)
        .build()
        .unwrap();

    get_mocked_state(provider)
}
