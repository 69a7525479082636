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

//! # Gatehouse
//!
//! Gatehouse is the identity and trust boundary of the workforce/benefits
//! administration platform. Every inbound call — whether it comes from a human
//! in a browser or from an external web-service integration — passes through
//! this service before any business logic runs. Gatehouse decides who the
//! caller is and whether to trust them; the rest of the platform consumes the
//! result through a request-scoped trust context.
//!
//! The service is organized around a small number of subsystems:
//!
//! - **Federation** — pluggable external identity-provider adapters (OIDC
//!   discovery-based, SAML assertion-based and plain OAuth2 authorization
//!   code) behind a common [`federation::adapter::IdentityAdapter`] contract,
//!   dispatched by the [`federation::registry::ProviderRegistry`].
//!
//! - **Account resolution** — the single canonical algorithm that maps an
//!   external identity assertion onto an internal account: link an existing
//!   identity, match by email, or (for providers configured to do so)
//!   provision a fresh account. See [`resolution`].
//!
//! - **Sessions** — cookie-backed, server-side sessions carrying the claim
//!   bundle and an opportunistic account snapshot, with a single transparent
//!   token refresh inside the authentication gate. See [`session`].
//!
//! - **Webservice credentials** — machine-to-machine authentication for
//!   external integration clients using the Bundle → Client → Credential →
//!   IpRule hierarchy. See [`webservice`].
//!
//! - **Request context** — task-local storage carrying the resolved caller
//!   identity and originating IP through async call chains without parameter
//!   threading. See [`context`].
//!
//! Worker, employer, benefit and wizard CRUD live in the neighbouring
//! business services; Gatehouse only guards the door.

pub mod account;
pub mod api;
pub mod audit;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod federation;
pub mod gatehouse;
pub mod plugin_manager;
pub mod provider;
pub mod resolution;
pub mod session;
pub mod webservice;

#[cfg(test)]
mod tests;
