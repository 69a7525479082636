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
//! # SAML 2.0 adapter
//!
//! SP-initiated web browser SSO: redirect binding for the authentication
//! request, POST binding for the response on the shared callback endpoint.
//! The state tag rides in `RelayState` and the authentication request id is
//! kept on the pending login for `InResponseTo` validation.
//!
//! Enterprise IdPs disagree on attribute naming, so profile claims are read
//! with an ordered fallback: `NameID`, the schemas.xmlsoap.org claim uris,
//! then plain attribute names.
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use samael::metadata::{EntityDescriptor, HTTP_REDIRECT_BINDING};
use samael::schema::AttributeStatement;
use samael::service_provider::{ServiceProvider, ServiceProviderBuilder};
use url::Url;

use crate::config::{FederationSection, ProviderEntry};
use crate::federation::FederationProviderError;
use crate::federation::adapter::{IdentityAdapter, callback_url, http_client, state_tag};
use crate::federation::types::*;

const EMAIL_NAMEID_FORMAT: &str = "urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress";

const SUBJECT_ATTRIBUTES: &[&str] = &[
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier",
    "uid",
];
const EMAIL_ATTRIBUTES: &[&str] = &[
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/emailaddress",
    "email",
    "mail",
];
const NAME_ATTRIBUTES: &[&str] = &[
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name",
    "displayName",
    "cn",
];

#[derive(Debug)]
pub struct SamlAdapter {
    entry: ProviderEntry,
    callback_scheme: String,
    http_timeout: Duration,
    metadata: RwLock<Option<EntityDescriptor>>,
}

impl SamlAdapter {
    pub fn new(entry: ProviderEntry, section: &FederationSection) -> Self {
        Self {
            entry,
            callback_scheme: section.callback_scheme.clone(),
            http_timeout: Duration::from_secs(section.http_timeout),
            metadata: RwLock::new(None),
        }
    }

    /// Load (or reuse) the IdP metadata document. The document is stable for
    /// the process lifetime.
    async fn idp_metadata(&self) -> Result<EntityDescriptor, FederationProviderError> {
        {
            let guard = self.metadata.read().unwrap_or_else(|p| p.into_inner());
            if let Some(metadata) = guard.as_ref() {
                return Ok(metadata.clone());
            }
        }

        let document = if let Some(path) = &self.entry.idp_metadata_file {
            tokio::fs::read_to_string(path).await.map_err(|err| {
                FederationProviderError::Discovery(format!(
                    "reading idp metadata {}: {err}",
                    path.display()
                ))
            })?
        } else if let Some(metadata_url) = &self.entry.idp_metadata_url {
            http_client(self.http_timeout)?
                .get(metadata_url.clone())
                .send()
                .await?
                .error_for_status()
                .map_err(|err| FederationProviderError::Discovery(err.to_string()))?
                .text()
                .await?
        } else {
            return Err(FederationProviderError::Discovery(format!(
                "provider {} has no idp metadata source",
                self.entry.name
            )));
        };

        let metadata: EntityDescriptor = samael::metadata::de::from_str(&document)
            .map_err(|err| FederationProviderError::Discovery(err.to_string()))?;

        let mut guard = self.metadata.write().unwrap_or_else(|p| p.into_inner());
        *guard = Some(metadata.clone());
        Ok(metadata)
    }

    async fn service_provider(
        &self,
        acs_url: &str,
    ) -> Result<ServiceProvider, FederationProviderError> {
        let metadata = self.idp_metadata().await?;
        let entity_id = self.entry.sp_entity_id.clone().ok_or_else(|| {
            FederationProviderError::Discovery(format!(
                "provider {} has no sp_entity_id",
                self.entry.name
            ))
        })?;
        ServiceProviderBuilder::default()
            .entity_id(entity_id)
            .idp_metadata(metadata)
            .acs_url(acs_url.to_string())
            .build()
            .map_err(|err| FederationProviderError::Discovery(err.to_string()))
    }
}

/// SSO location for the redirect binding out of the IdP metadata.
fn sso_redirect_location(metadata: &EntityDescriptor) -> Option<String> {
    metadata
        .idp_sso_descriptors
        .as_ref()?
        .iter()
        .flat_map(|descriptor| descriptor.single_sign_on_services.iter())
        .find(|endpoint| endpoint.binding == HTTP_REDIRECT_BINDING)
        .map(|endpoint| endpoint.location.clone())
}

/// First value of the first attribute matching any of the given names, in
/// name order.
fn attribute_claim(statements: &[AttributeStatement], names: &[&str]) -> Option<String> {
    for name in names {
        for statement in statements {
            for attribute in &statement.attributes {
                if (attribute.name.as_deref() == Some(*name)
                    || attribute.friendly_name.as_deref() == Some(*name))
                    && let Some(value) = attribute.values.iter().find_map(|v| v.value.clone())
                {
                    return Some(value);
                }
            }
        }
    }
    None
}

#[async_trait]
impl IdentityAdapter for SamlAdapter {
    fn provider_type(&self) -> &str {
        &self.entry.name
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Saml
    }

    fn auto_provision(&self) -> bool {
        self.entry.auto_provision
    }

    fn logout_url(&self) -> Option<Url> {
        self.entry.logout_url.clone()
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn login_start(
        &self,
        host: &str,
        return_to: Option<String>,
    ) -> Result<LoginChallenge, FederationProviderError> {
        let acs_url = callback_url(&self.callback_scheme, host);
        let sp = self.service_provider(&acs_url).await?;

        let sso_url = sso_redirect_location(&sp.idp_metadata).ok_or_else(|| {
            FederationProviderError::Discovery(format!(
                "idp metadata of provider {} has no redirect binding SSO endpoint",
                self.entry.name
            ))
        })?;

        let authn_request = sp
            .make_authentication_request(&sso_url)
            .map_err(|err| FederationProviderError::Discovery(err.to_string()))?;

        let tag = state_tag(&self.entry.name);
        let auth_url = authn_request
            .redirect(&tag)
            .map_err(|err| FederationProviderError::Discovery(err.to_string()))?
            .ok_or_else(|| {
                FederationProviderError::Discovery(
                    "authentication request produced no redirect url".to_string(),
                )
            })?;

        let login_state = LoginState {
            state: tag,
            provider_type: self.entry.name.clone(),
            // Request id, validated against InResponseTo on callback.
            nonce: Some(authn_request.id.clone()),
            pkce_verifier: None,
            redirect_uri: acs_url,
            return_to,
            // Filled by the federation provider on persist.
            expires_at: Utc::now(),
        };

        Ok(LoginChallenge {
            auth_url,
            login_state,
        })
    }

    #[tracing::instrument(level = "debug", skip(self, login_state, params))]
    async fn handle_callback(
        &self,
        login_state: LoginState,
        params: CallbackParams,
    ) -> Result<IdentityAssertion, FederationProviderError> {
        let saml_response = params.saml_response.ok_or_else(|| {
            FederationProviderError::InvalidAssertion(
                "callback carries no SAMLResponse".to_string(),
            )
        })?;

        let sp = self.service_provider(&login_state.redirect_uri).await?;

        let request_id = login_state.nonce.clone().ok_or_else(|| {
            FederationProviderError::InvalidAssertion(
                "pending login carries no request id".to_string(),
            )
        })?;
        let assertion = sp
            .parse_base64_response(&saml_response, Some(&[request_id.as_str()]))
            .map_err(|err| FederationProviderError::InvalidAssertion(err.to_string()))?;

        let name_id = assertion
            .subject
            .as_ref()
            .and_then(|subject| subject.name_id.as_ref());
        let statements = assertion.attribute_statements.as_deref().unwrap_or(&[]);

        let external_id = name_id
            .map(|name_id| name_id.value.clone())
            .or_else(|| attribute_claim(statements, SUBJECT_ATTRIBUTES))
            .ok_or_else(|| {
                FederationProviderError::InvalidAssertion(
                    "assertion carries no subject identifier".to_string(),
                )
            })?;

        let email = attribute_claim(statements, EMAIL_ATTRIBUTES)
            .or_else(|| {
                name_id
                    .filter(|name_id| name_id.format.as_deref() == Some(EMAIL_NAMEID_FORMAT))
                    .map(|name_id| name_id.value.clone())
            })
            .ok_or_else(|| {
                FederationProviderError::InvalidAssertion(
                    "assertion carries no email attribute".to_string(),
                )
            })?;

        let mut result = IdentityAssertionBuilder::default();
        result.provider_type(self.entry.name.clone());
        result.external_id(external_id);
        result.email(email);
        if let Some(name) = attribute_claim(statements, NAME_ATTRIBUTES) {
            result.display_name(name);
        }
        result
            .build()
            .map_err(|err| FederationProviderError::InvalidAssertion(err.to_string()))
    }

    async fn refresh(
        &self,
        _refresh_token: &str,
    ) -> Result<RefreshedTokens, FederationProviderError> {
        Err(FederationProviderError::RefreshNotSupported(
            self.entry.name.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use samael::attribute::{Attribute, AttributeValue};

    use super::*;

    fn attribute(name: &str, value: &str) -> Attribute {
        Attribute {
            friendly_name: None,
            name: Some(name.into()),
            name_format: None,
            values: vec![AttributeValue {
                attribute_type: None,
                value: Some(value.into()),
            }],
        }
    }

    fn statements(attributes: Vec<Attribute>) -> Vec<AttributeStatement> {
        vec![AttributeStatement { attributes }]
    }

    #[test]
    fn test_claim_uri_preferred_over_plain_name() {
        let statements = statements(vec![
            attribute("mail", "plain@example.com"),
            attribute(
                "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/emailaddress",
                "claim@example.com",
            ),
        ]);
        assert_eq!(
            Some("claim@example.com".to_string()),
            attribute_claim(&statements, EMAIL_ATTRIBUTES)
        );
    }

    #[test]
    fn test_plain_attribute_fallback() {
        let statements = statements(vec![attribute("mail", "plain@example.com")]);
        assert_eq!(
            Some("plain@example.com".to_string()),
            attribute_claim(&statements, EMAIL_ATTRIBUTES)
        );
        assert_eq!(None, attribute_claim(&statements, NAME_ATTRIBUTES));
    }
}
