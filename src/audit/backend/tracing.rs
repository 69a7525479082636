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
//! # Tracing audit driver
//!
//! Emits audit records as structured log events. Durable storage of the log
//! stream is the responsibility of the log pipeline.
use async_trait::async_trait;

use crate::audit::backend::AuditBackend;
use crate::audit::error::AuditProviderError;
use crate::audit::types::AuditRecord;
use crate::config::Config;

#[derive(Clone, Debug, Default)]
pub struct TracingBackend {}

#[async_trait]
impl AuditBackend for TracingBackend {
    fn set_config(&mut self, _config: Config) {}

    async fn record(&self, record: AuditRecord) -> Result<(), AuditProviderError> {
        ::tracing::info!(
            target: "gatehouse::audit",
            request_id = record.request_id.as_deref(),
            client_ip = record.client_ip.as_deref(),
            event = %serde_json::to_string(&record.event)?,
            "audit"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;
    use crate::audit::types::AuditEvent;

    #[traced_test]
    #[tokio::test]
    async fn test_record_logs_event() {
        let backend = TracingBackend::default();
        backend
            .record(AuditRecord {
                request_id: Some("req-1".into()),
                client_ip: None,
                event: AuditEvent::Logout {
                    account_id: "acc".into(),
                    session_id: "sess".into(),
                },
            })
            .await
            .unwrap();

        assert!(logs_contain("audit"));
        assert!(logs_contain("logout"));
    }
}
