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

use async_trait::async_trait;
use dyn_clone::DynClone;

use crate::audit::error::AuditProviderError;
use crate::audit::types::AuditRecord;
use crate::config::Config;

pub mod tracing;

pub use self::tracing::TracingBackend;

/// Backend driver interface for the Audit Provider.
#[async_trait]
pub trait AuditBackend: DynClone + Send + Sync + std::fmt::Debug {
    /// Set config.
    fn set_config(&mut self, config: Config);

    /// Persist a single audit record.
    async fn record(&self, record: AuditRecord) -> Result<(), AuditProviderError>;
}

dyn_clone::clone_trait_object!(AuditBackend);
