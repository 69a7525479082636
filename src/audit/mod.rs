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
//! # Audit provider
//!
//! Fire-and-forget audit trail of authentication outcomes. Events are pushed
//! onto an unbounded channel and drained by a background task into the
//! configured backend, so emission never blocks and never fails the
//! authentication flow that produced the event.
#[cfg(test)]
use mockall::mock;
use tokio::sync::mpsc;
use tracing::warn;

pub mod backend;
pub mod error;
pub mod types;

use crate::audit::backend::TracingBackend;
use crate::audit::error::AuditProviderError;
use crate::audit::types::{AuditEvent, AuditRecord};
use crate::config::Config;
use crate::context::RequestContext;
use crate::plugin_manager::PluginManager;

#[derive(Clone, Debug)]
pub struct AuditProvider {
    sender: mpsc::UnboundedSender<AuditRecord>,
}

pub trait AuditApi: Send + Sync + Clone {
    /// Emit an audit event, stamped with the current request context.
    fn emit(&self, event: AuditEvent);
}

#[cfg(test)]
mock! {
    pub AuditProvider {
        pub fn new(cfg: &Config, plugin_manager: &PluginManager) -> Result<Self, AuditProviderError>;
    }

    impl AuditApi for AuditProvider {
        fn emit(&self, event: AuditEvent);
    }

    impl Clone for AuditProvider {
        fn clone(&self) -> Self;
    }
}

impl AuditProvider {
    pub fn new(
        config: &Config,
        plugin_manager: &PluginManager,
    ) -> Result<Self, AuditProviderError> {
        let mut backend_driver = if let Some(driver) =
            plugin_manager.get_audit_backend(config.audit.driver.clone())
        {
            driver.clone()
        } else {
            match config.audit.driver.as_str() {
                "tracing" => {
                    Box::new(TracingBackend::default()) as Box<dyn backend::AuditBackend>
                }
                _ => {
                    return Err(AuditProviderError::UnsupportedDriver(
                        config.audit.driver.clone(),
                    ));
                }
            }
        };
        backend_driver.set_config(config.clone());

        let (sender, mut receiver) = mpsc::unbounded_channel::<AuditRecord>();
        tokio::spawn(async move {
            while let Some(record) = receiver.recv().await {
                if let Err(err) = backend_driver.record(record).await {
                    warn!("failed to record audit event: {}", err);
                }
            }
        });

        Ok(Self { sender })
    }
}

impl AuditApi for AuditProvider {
    fn emit(&self, event: AuditEvent) {
        let context = RequestContext::try_current();
        let record = AuditRecord {
            request_id: context.as_ref().map(|ctx| ctx.request_id.clone()),
            client_ip: context
                .as_ref()
                .and_then(|ctx| ctx.client_ip.map(|ip| ip.to_string())),
            event,
        };
        if self.sender.send(record).is_err() {
            warn!("audit drain task is gone, event dropped");
        }
    }
}
