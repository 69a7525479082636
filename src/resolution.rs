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
//! # Account resolution
//!
//! The single canonical algorithm mapping an external identity assertion
//! onto an internal account. Every interactive login funnels through
//! [resolve], regardless of which protocol produced the assertion:
//!
//! 1. A known (provider_type, external_id) linkage logs straight in and gets
//!    its cached attributes refreshed.
//! 2. An unknown identity whose email matches an existing account is linked
//!    to it on the spot.
//! 3. Otherwise the login is rejected, unless the provider is configured to
//!    auto-provision fresh accounts.
//!
//! A rejected login tells the browser nothing beyond "rejected"; the precise
//! reason lands in the audit trail only.
use chrono::Utc;
use tracing::debug;

use crate::account::AccountApi;
use crate::account::types::*;
use crate::audit::AuditApi;
use crate::audit::types::AuditEvent;
use crate::error::GatehouseError;
use crate::federation::types::IdentityAssertion;
use crate::gatehouse::ServiceState;

/// Why a login was rejected. Never serialized towards the browser.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RejectReason {
    /// No linkage and no account under the asserted email.
    NoAccount,
    /// The target account is administratively disabled.
    AccountInactive,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoAccount => "no_account",
            Self::AccountInactive => "account_inactive",
        }
    }
}

/// Outcome of resolving an identity assertion.
#[derive(Clone, Debug, PartialEq)]
pub enum ResolutionOutcome {
    /// The assertion maps onto an active account.
    Accepted {
        account: Account,
        /// Whether a new linkage (or account) was established by this login.
        linked: bool,
    },
    /// The login was rejected.
    Rejected(RejectReason),
}

/// Resolve an identity assertion onto an account.
#[tracing::instrument(level = "debug", skip(state, assertion), fields(provider_type = %assertion.provider_type))]
pub async fn resolve(
    state: &ServiceState,
    assertion: &IdentityAssertion,
    auto_provision: bool,
) -> Result<ResolutionOutcome, GatehouseError> {
    let accounts = state.provider.get_account_provider();
    let now = Utc::now();

    if let Some(identity) = accounts
        .find_external_identity(state, &assertion.provider_type, &assertion.external_id)
        .await?
    {
        let account = accounts
            .get_account(state, &identity.account_id)
            .await?
            .ok_or_else(|| {
                GatehouseError::from(crate::account::error::AccountProviderError::AccountNotFound(
                    identity.account_id.clone(),
                ))
            })?;
        if !account.enabled {
            return Ok(reject(state, assertion, RejectReason::AccountInactive));
        }

        accounts
            .update_external_identity(
                state,
                &assertion.provider_type,
                &assertion.external_id,
                ExternalIdentityUpdate {
                    email: Some(assertion.email.clone()),
                    display_name: assertion.display_name.clone(),
                    profile_image_url: assertion.profile_image_url.clone(),
                    last_used_at: Some(now),
                },
            )
            .await?;
        let account = refresh_profile(state, account, assertion).await?;
        accounts.record_login(state, &account.id, now).await?;

        state.provider.get_audit_provider().emit(AuditEvent::Login {
            provider_type: assertion.provider_type.clone(),
            external_id: assertion.external_id.clone(),
            account_id: account.id.clone(),
        });
        return Ok(ResolutionOutcome::Accepted {
            account,
            linked: false,
        });
    }

    let account = match accounts.get_account_by_email(state, &assertion.email).await? {
        Some(account) if !account.enabled => {
            return Ok(reject(state, assertion, RejectReason::AccountInactive));
        }
        Some(account) => account,
        None if auto_provision => {
            debug!("provisioning a fresh account for {}", assertion.provider_type);
            accounts
                .create_account(
                    state,
                    AccountCreate {
                        id: String::new(),
                        email: assertion.email.clone(),
                        name: assertion
                            .display_name
                            .clone()
                            .unwrap_or_else(|| local_part(&assertion.email).to_string()),
                        profile_image_url: assertion.profile_image_url.clone(),
                        enabled: true,
                    },
                )
                .await?
        }
        None => {
            return Ok(reject(state, assertion, RejectReason::NoAccount));
        }
    };

    accounts
        .create_external_identity(
            state,
            ExternalIdentityCreate {
                provider_type: assertion.provider_type.clone(),
                external_id: assertion.external_id.clone(),
                account_id: account.id.clone(),
                email: Some(assertion.email.clone()),
                display_name: assertion.display_name.clone(),
                profile_image_url: assertion.profile_image_url.clone(),
            },
        )
        .await?;
    accounts.record_login(state, &account.id, now).await?;

    state
        .provider
        .get_audit_provider()
        .emit(AuditEvent::LoginLinked {
            provider_type: assertion.provider_type.clone(),
            external_id: assertion.external_id.clone(),
            account_id: account.id.clone(),
        });
    Ok(ResolutionOutcome::Accepted {
        account,
        linked: true,
    })
}

/// Push refreshed profile attributes onto the account when the provider
/// asserts different ones.
async fn refresh_profile(
    state: &ServiceState,
    account: Account,
    assertion: &IdentityAssertion,
) -> Result<Account, GatehouseError> {
    let name = assertion
        .display_name
        .clone()
        .filter(|name| *name != account.name);
    let profile_image_url = assertion
        .profile_image_url
        .clone()
        .filter(|url| Some(url) != account.profile_image_url.as_ref());
    if name.is_none() && profile_image_url.is_none() {
        return Ok(account);
    }
    Ok(state
        .provider
        .get_account_provider()
        .update_account_profile(
            state,
            &account.id,
            AccountProfileUpdate {
                name,
                profile_image_url,
            },
        )
        .await?)
}

fn reject(
    state: &ServiceState,
    assertion: &IdentityAssertion,
    reason: RejectReason,
) -> ResolutionOutcome {
    state
        .provider
        .get_audit_provider()
        .emit(AuditEvent::LoginRejected {
            provider_type: assertion.provider_type.clone(),
            external_id: Some(assertion.external_id.clone()),
            reason: reason.as_str().to_string(),
        });
    ResolutionOutcome::Rejected(reason)
}

fn local_part(email: &str) -> &str {
    email.split_once('@').map_or(email, |(local, _)| local)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sea_orm::DatabaseConnection;

    use super::*;
    use crate::account::MockAccountProvider;
    use crate::audit::MockAuditProvider;
    use crate::config::Config;
    use crate::federation::registry::ProviderRegistry;
    use crate::gatehouse::Service;
    use crate::provider::Provider;

    fn assertion() -> IdentityAssertion {
        IdentityAssertion {
            provider_type: "okta".into(),
            external_id: "subj-1".into(),
            email: "ada@example.com".into(),
            display_name: Some("Ada".into()),
            profile_image_url: None,
            access_token: "at".into(),
            refresh_token: None,
            token_expires_at: None,
        }
    }

    fn account(enabled: bool) -> Account {
        Account {
            id: "acc-1".into(),
            email: "ada@example.com".into(),
            name: "Ada".into(),
            profile_image_url: None,
            enabled,
            created_at: Utc::now(),
            last_login_at: None,
        }
    }

    fn identity() -> ExternalIdentity {
        ExternalIdentity {
            provider_type: "okta".into(),
            external_id: "subj-1".into(),
            account_id: "acc-1".into(),
            email: Some("ada@example.com".into()),
            display_name: Some("Ada".into()),
            profile_image_url: None,
            created_at: Utc::now(),
            last_used_at: None,
        }
    }

    fn service_state(
        account_mock: MockAccountProvider,
        audit_mock: MockAuditProvider,
    ) -> ServiceState {
        Arc::new(
            Service::new(
                Config::default(),
                DatabaseConnection::Disconnected,
                Provider::mocked_builder()
                    .account(account_mock)
                    .audit(audit_mock)
                    .build()
                    .unwrap(),
                ProviderRegistry::default(),
            )
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_known_identity_logs_in() {
        let mut account_mock = MockAccountProvider::default();
        account_mock
            .expect_find_external_identity()
            .returning(|_, _, _| Ok(Some(identity())));
        account_mock
            .expect_get_account()
            .returning(|_, _| Ok(Some(account(true))));
        account_mock
            .expect_update_external_identity()
            .times(1)
            .returning(|_, _, _, _| Ok(identity()));
        account_mock
            .expect_record_login()
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut audit_mock = MockAuditProvider::default();
        audit_mock
            .expect_emit()
            .withf(|event| matches!(event, AuditEvent::Login { .. }))
            .times(1)
            .return_const(());

        let state = service_state(account_mock, audit_mock);
        match resolve(&state, &assertion(), false).await.unwrap() {
            ResolutionOutcome::Accepted { account, linked } => {
                assert_eq!("acc-1", account.id);
                assert!(!linked);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_known_identity_inactive_account() {
        let mut account_mock = MockAccountProvider::default();
        account_mock
            .expect_find_external_identity()
            .returning(|_, _, _| Ok(Some(identity())));
        account_mock
            .expect_get_account()
            .returning(|_, _| Ok(Some(account(false))));
        account_mock.expect_update_external_identity().never();
        account_mock.expect_record_login().never();

        let mut audit_mock = MockAuditProvider::default();
        audit_mock
            .expect_emit()
            .withf(|event| {
                matches!(event, AuditEvent::LoginRejected { reason, .. } if reason == "account_inactive")
            })
            .times(1)
            .return_const(());

        let state = service_state(account_mock, audit_mock);
        assert_eq!(
            ResolutionOutcome::Rejected(RejectReason::AccountInactive),
            resolve(&state, &assertion(), false).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_unknown_identity_links_by_email() {
        let mut account_mock = MockAccountProvider::default();
        account_mock
            .expect_find_external_identity()
            .returning(|_, _, _| Ok(None));
        account_mock
            .expect_get_account_by_email()
            .returning(|_, _| Ok(Some(account(true))));
        account_mock
            .expect_create_external_identity()
            .times(1)
            .returning(|_, _| Ok(identity()));
        account_mock
            .expect_record_login()
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut audit_mock = MockAuditProvider::default();
        audit_mock
            .expect_emit()
            .withf(|event| matches!(event, AuditEvent::LoginLinked { .. }))
            .times(1)
            .return_const(());

        let state = service_state(account_mock, audit_mock);
        assert!(matches!(
            resolve(&state, &assertion(), false).await.unwrap(),
            ResolutionOutcome::Accepted { linked: true, .. }
        ));
    }

    #[tokio::test]
    async fn test_email_match_on_inactive_account_makes_no_linkage() {
        let mut account_mock = MockAccountProvider::default();
        account_mock
            .expect_find_external_identity()
            .returning(|_, _, _| Ok(None));
        account_mock
            .expect_get_account_by_email()
            .returning(|_, _| Ok(Some(account(false))));
        account_mock.expect_create_external_identity().never();

        let mut audit_mock = MockAuditProvider::default();
        audit_mock
            .expect_emit()
            .withf(|event| matches!(event, AuditEvent::LoginRejected { .. }))
            .times(1)
            .return_const(());

        let state = service_state(account_mock, audit_mock);
        assert_eq!(
            ResolutionOutcome::Rejected(RejectReason::AccountInactive),
            resolve(&state, &assertion(), false).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_unknown_identity_without_account_is_rejected() {
        let mut account_mock = MockAccountProvider::default();
        account_mock
            .expect_find_external_identity()
            .returning(|_, _, _| Ok(None));
        account_mock
            .expect_get_account_by_email()
            .returning(|_, _| Ok(None));
        account_mock.expect_create_account().never();

        let mut audit_mock = MockAuditProvider::default();
        audit_mock
            .expect_emit()
            .withf(|event| {
                matches!(event, AuditEvent::LoginRejected { reason, .. } if reason == "no_account")
            })
            .times(1)
            .return_const(());

        let state = service_state(account_mock, audit_mock);
        assert_eq!(
            ResolutionOutcome::Rejected(RejectReason::NoAccount),
            resolve(&state, &assertion(), false).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_auto_provision_creates_account_and_linkage() {
        let mut account_mock = MockAccountProvider::default();
        account_mock
            .expect_find_external_identity()
            .returning(|_, _, _| Ok(None));
        account_mock
            .expect_get_account_by_email()
            .returning(|_, _| Ok(None));
        account_mock
            .expect_create_account()
            .withf(|_, rec| rec.email == "ada@example.com" && rec.name == "Ada")
            .times(1)
            .returning(|_, _| Ok(account(true)));
        account_mock
            .expect_create_external_identity()
            .times(1)
            .returning(|_, _| Ok(identity()));
        account_mock
            .expect_record_login()
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut audit_mock = MockAuditProvider::default();
        audit_mock
            .expect_emit()
            .withf(|event| matches!(event, AuditEvent::LoginLinked { .. }))
            .times(1)
            .return_const(());

        let state = service_state(account_mock, audit_mock);
        assert!(matches!(
            resolve(&state, &assertion(), true).await.unwrap(),
            ResolutionOutcome::Accepted { linked: true, .. }
        ));
    }

    #[test]
    fn test_local_part() {
        assert_eq!("ada", local_part("ada@example.com"));
        assert_eq!("not-an-email", local_part("not-an-email"));
    }
}
