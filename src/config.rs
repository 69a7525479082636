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

//! # Service configuration
//!
//! Configuration is loaded from a TOML file. Identity providers are declared
//! as `[[federation.providers]]` tables with a compile-time-known `kind`; an
//! unknown kind fails deserialization, which makes a misconfigured provider a
//! fatal startup error rather than a runtime surprise.

use config::{File, FileFormat};
use eyre::{Report, WrapErr, eyre};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

use crate::federation::types::ProviderKind;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Global configuration options.
    #[serde(default)]
    pub default: DefaultSection,

    /// Account provider configuration.
    #[serde(default)]
    pub account: AccountSection,

    /// Audit sink configuration.
    #[serde(default)]
    pub audit: AuditSection,

    /// Database configuration.
    pub database: DatabaseSection,

    /// Identity federation configuration.
    #[serde(default)]
    pub federation: FederationSection,

    /// Session manager configuration.
    #[serde(default)]
    pub session: SessionSection,

    /// Webservice credential authentication configuration.
    #[serde(default)]
    pub webservice: WebserviceSection,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct DefaultSection {
    /// Development mode. Relaxes the secret requirements and allows plain
    /// http callback urls.
    #[serde(default)]
    pub development: bool,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct DatabaseSection {
    /// Database URL.
    pub connection: SecretString,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AccountSection {
    #[serde(default = "default_sql_driver")]
    pub driver: String,
}

impl Default for AccountSection {
    fn default() -> Self {
        Self {
            driver: default_sql_driver(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AuditSection {
    /// Audit backend driver. The built-in `tracing` driver emits structured
    /// records into the log stream; durable persistence belongs to the
    /// platform logging pipeline, not to this service.
    #[serde(default = "default_tracing_driver")]
    pub driver: String,
}

impl Default for AuditSection {
    fn default() -> Self {
        Self {
            driver: default_tracing_driver(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct FederationSection {
    #[serde(default = "default_sql_driver")]
    pub driver: String,

    /// Configured identity providers.
    #[serde(default)]
    pub providers: Vec<ProviderEntry>,

    /// Name of the provider used when a login request carries no explicit
    /// hint. Must match one of the configured providers.
    #[serde(default)]
    pub default_provider: Option<String>,

    /// How long the OIDC discovery result is memoized per issuer (seconds).
    #[serde(default = "default_discovery_cache_ttl")]
    pub discovery_cache_ttl: u64,

    /// Timeout applied to every outgoing discovery/token/userinfo call
    /// (seconds). A slow external identity provider must not be able to pin
    /// down request-handling capacity.
    #[serde(default = "default_http_timeout")]
    pub http_timeout: u64,

    /// Scheme used when deriving the per-host callback url.
    #[serde(default = "default_callback_scheme")]
    pub callback_scheme: String,

    /// Where the browser is sent when an external login is rejected. The
    /// page is generic on purpose: rejection reasons are logged server-side
    /// only.
    #[serde(default = "default_error_page")]
    pub error_page: String,

    /// Lifetime of the login state rows bridging the redirect round-trip
    /// (seconds).
    #[serde(default = "default_login_state_ttl")]
    pub login_state_ttl: i64,
}

impl Default for FederationSection {
    fn default() -> Self {
        Self {
            driver: default_sql_driver(),
            providers: Vec::new(),
            default_provider: None,
            discovery_cache_ttl: default_discovery_cache_ttl(),
            http_timeout: default_http_timeout(),
            callback_scheme: default_callback_scheme(),
            error_page: default_error_page(),
            login_state_ttl: default_login_state_ttl(),
        }
    }
}

/// A single configured identity provider.
#[derive(Clone, Debug, Deserialize)]
pub struct ProviderEntry {
    /// Provider type. This is the value recorded on every external identity
    /// linked through this provider and the key used by login/callback
    /// dispatch.
    pub name: String,

    /// Protocol family of the provider.
    pub kind: ProviderKind,

    /// OAuth2/OIDC client id.
    #[serde(default)]
    pub client_id: Option<String>,

    /// OAuth2/OIDC client secret.
    #[serde(default)]
    pub client_secret: Option<SecretString>,

    /// OIDC issuer url used for metadata discovery.
    #[serde(default)]
    pub issuer_url: Option<Url>,

    /// Authorization endpoint (plain OAuth2 providers without discovery).
    #[serde(default)]
    pub auth_url: Option<Url>,

    /// Token endpoint (plain OAuth2 providers without discovery).
    #[serde(default)]
    pub token_url: Option<Url>,

    /// Userinfo/profile endpoint queried after the code exchange (plain
    /// OAuth2 providers).
    #[serde(default)]
    pub userinfo_url: Option<Url>,

    /// Additional scopes requested at authorization time.
    #[serde(default)]
    pub scopes: Vec<String>,

    /// SAML IdP metadata document location on disk.
    #[serde(default)]
    pub idp_metadata_file: Option<PathBuf>,

    /// SAML IdP metadata document url, fetched once during setup.
    #[serde(default)]
    pub idp_metadata_url: Option<Url>,

    /// SAML service provider entity id.
    #[serde(default)]
    pub sp_entity_id: Option<String>,

    /// Centralized logout endpoint, when the provider has one.
    #[serde(default)]
    pub logout_url: Option<Url>,

    /// Whether a first login through this provider may create a fresh
    /// account instead of being rejected when no email match exists. This is
    /// a per-provider policy decision; the resolution engine default is to
    /// reject.
    #[serde(default)]
    pub auto_provision: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SessionSection {
    #[serde(default = "default_sql_driver")]
    pub driver: String,

    /// Name of the cookie carrying the opaque session id.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Whether the session cookie carries the `Secure` attribute.
    #[serde(default = "default_true")]
    pub cookie_secure: bool,

    /// Server-side session lifetime (seconds).
    #[serde(default = "default_session_ttl")]
    pub ttl: i64,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            driver: default_sql_driver(),
            cookie_name: default_cookie_name(),
            cookie_secure: true,
            ttl: default_session_ttl(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct WebserviceSection {
    #[serde(default = "default_sql_driver")]
    pub driver: String,

    /// bcrypt cost used when issuing new credential secrets.
    #[serde(default = "default_secret_hash_rounds")]
    pub secret_hash_rounds: u32,
}

impl Default for WebserviceSection {
    fn default() -> Self {
        Self {
            driver: default_sql_driver(),
            secret_hash_rounds: default_secret_hash_rounds(),
        }
    }
}

fn default_sql_driver() -> String {
    "sql".into()
}

fn default_tracing_driver() -> String {
    "tracing".into()
}

fn default_cookie_name() -> String {
    "gh_session".into()
}

fn default_discovery_cache_ttl() -> u64 {
    3600
}

fn default_http_timeout() -> u64 {
    10
}

fn default_callback_scheme() -> String {
    "https".into()
}

fn default_error_page() -> String {
    "/auth/error".into()
}

fn default_login_state_ttl() -> i64 {
    180
}

fn default_session_ttl() -> i64 {
    // 7 days
    7 * 24 * 3600
}

fn default_secret_hash_rounds() -> u32 {
    12
}

fn default_true() -> bool {
    true
}

impl Config {
    pub fn new(path: PathBuf) -> Result<Self, Report> {
        let mut builder = config::Config::builder();

        if std::path::Path::new(&path).is_file() {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        let cfg: Self = builder
            .build()
            .wrap_err("Failed to read configuration file")?
            .try_deserialize()
            .wrap_err("Failed to parse configuration file")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Configuration errors are fatal at startup and never user-visible.
    pub fn validate(&self) -> Result<(), Report> {
        for provider in &self.federation.providers {
            match provider.kind {
                ProviderKind::Oidc => {
                    if provider.issuer_url.is_none() {
                        return Err(eyre!(
                            "provider {} requires the issuer_url for the metadata discovery",
                            provider.name
                        ));
                    }
                    if provider.client_id.is_none() {
                        return Err(eyre!("provider {} requires the client_id", provider.name));
                    }
                    if provider.client_secret.is_none() && !self.default.development {
                        return Err(eyre!(
                            "provider {} requires the client_secret outside of development",
                            provider.name
                        ));
                    }
                }
                ProviderKind::Oauth2 => {
                    if provider.auth_url.is_none()
                        || provider.token_url.is_none()
                        || provider.userinfo_url.is_none()
                    {
                        return Err(eyre!(
                            "provider {} requires auth_url, token_url and userinfo_url",
                            provider.name
                        ));
                    }
                    if provider.client_id.is_none() {
                        return Err(eyre!("provider {} requires the client_id", provider.name));
                    }
                    if provider.client_secret.is_none() && !self.default.development {
                        return Err(eyre!(
                            "provider {} requires the client_secret outside of development",
                            provider.name
                        ));
                    }
                }
                ProviderKind::Saml => {
                    if provider.idp_metadata_file.is_none() && provider.idp_metadata_url.is_none() {
                        return Err(eyre!(
                            "provider {} requires idp_metadata_file or idp_metadata_url",
                            provider.name
                        ));
                    }
                    if provider.sp_entity_id.is_none() {
                        return Err(eyre!(
                            "provider {} requires the sp_entity_id",
                            provider.name
                        ));
                    }
                }
            }
        }
        if let Some(default) = &self.federation.default_provider
            && !self
                .federation
                .providers
                .iter()
                .any(|p| &p.name == default)
        {
            return Err(eyre!(
                "default provider {default} is not among the configured providers"
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oidc_entry(name: &str) -> ProviderEntry {
        ProviderEntry {
            name: name.into(),
            kind: ProviderKind::Oidc,
            client_id: Some("cid".into()),
            client_secret: Some("sec".into()),
            issuer_url: Some(Url::parse("https://idp.example.com").unwrap()),
            auth_url: None,
            token_url: None,
            userinfo_url: None,
            scopes: Vec::new(),
            idp_metadata_file: None,
            idp_metadata_url: None,
            sp_entity_id: None,
            logout_url: None,
            auto_provision: false,
        }
    }

    #[test]
    fn test_validate_oidc_secret_required() {
        let mut cfg = Config::default();
        let mut entry = oidc_entry("okta");
        entry.client_secret = None;
        cfg.federation.providers.push(entry);
        assert!(cfg.validate().is_err());

        cfg.default.development = true;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_unknown_default_provider() {
        let mut cfg = Config::default();
        cfg.federation.providers.push(oidc_entry("okta"));
        cfg.federation.default_provider = Some("google".into());
        assert!(cfg.validate().is_err());

        cfg.federation.default_provider = Some("okta".into());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_provider_kind_parsing() {
        let entry: ProviderEntry = serde_json::from_value(serde_json::json!({
            "name": "adfs",
            "kind": "saml",
            "sp_entity_id": "urn:gatehouse",
            "idp_metadata_file": "/etc/gatehouse/adfs.xml",
        }))
        .unwrap();
        assert_eq!(ProviderKind::Saml, entry.kind);

        // An unknown kind must fail deserialization: provider loading is
        // compile-time-known, never resolved from an arbitrary string.
        assert!(
            serde_json::from_value::<ProviderEntry>(serde_json::json!({
                "name": "x",
                "kind": "ldap",
            }))
            .is_err()
        );
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(7 * 24 * 3600, cfg.session.ttl);
        assert_eq!("gh_session", cfg.session.cookie_name);
        assert_eq!(3600, cfg.federation.discovery_cache_ttl);
        assert_eq!("sql", cfg.account.driver);
    }
}
