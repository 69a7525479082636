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
//! # Request context
//!
//! One [`RequestContext`] exists per in-flight request, carried in a tokio
//! task-local so any code on the request path can read the request id, the
//! originating address and the resolved caller without threading them through
//! every signature. The context never crosses request boundaries: each
//! connection task gets its own scope and the value is dropped when the
//! response is written.
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, RwLock};

use axum::{
    extract::{ConnectInfo, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

tokio::task_local! {
    static REQUEST_CONTEXT: Arc<RequestContext>;
}

/// The party a request is executing on behalf of.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Caller {
    /// Not authenticated (or authentication not attempted yet).
    #[default]
    Anonymous,
    /// A human account authenticated through an identity provider session.
    Account {
        account_id: String,
        session_id: String,
    },
    /// A machine client authenticated with webservice credentials.
    Webservice {
        client_id: String,
        bundle_code: String,
    },
}

/// Per-request ambient data.
///
/// The caller slot starts [`Caller::Anonymous`] and is filled in exactly once
/// by the authentication extractors after the context scope is already
/// entered, hence the interior mutability.
#[derive(Debug)]
pub struct RequestContext {
    /// Request id (from the `x-request-id` header when present).
    pub request_id: String,

    /// Originating client address.
    pub client_ip: Option<IpAddr>,

    caller: RwLock<Caller>,
}

impl RequestContext {
    pub fn new<R: Into<String>>(request_id: R, client_ip: Option<IpAddr>) -> Self {
        Self {
            request_id: request_id.into(),
            client_ip,
            caller: RwLock::new(Caller::Anonymous),
        }
    }

    /// Run `fut` with this context installed as the task-local one.
    pub async fn scope<F>(self, fut: F) -> F::Output
    where
        F: Future,
    {
        REQUEST_CONTEXT.scope(Arc::new(self), fut).await
    }

    /// The context of the current task, if one is installed.
    pub fn try_current() -> Option<Arc<RequestContext>> {
        REQUEST_CONTEXT.try_with(Clone::clone).ok()
    }

    /// The resolved caller of the current request.
    pub fn caller(&self) -> Caller {
        self.caller
            .read()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone()
    }

    /// Record the resolved caller of the current request.
    pub fn set_caller(&self, caller: Caller) {
        *self
            .caller
            .write()
            .unwrap_or_else(|poison| poison.into_inner()) = caller;
    }
}

/// Resolve the originating client address of a request.
///
/// The first `x-forwarded-for` entry wins (the edge proxy appends, so the
/// left-most entry is the original client), then `x-real-ip`, then the peer
/// address of the connection.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<IpAddr> {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|val| val.to_str().ok())
        && let Some(first) = forwarded.split(',').next()
        && let Ok(addr) = first.trim().parse::<IpAddr>()
    {
        return Some(addr);
    }
    if let Some(real_ip) = headers
        .get("x-real-ip")
        .and_then(|val| val.to_str().ok())
        .and_then(|val| val.trim().parse::<IpAddr>().ok())
    {
        return Some(real_ip);
    }
    peer.map(|addr| addr.ip())
}

/// Axum middleware installing a fresh [`RequestContext`] around the rest of
/// the handler chain.
pub async fn middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .map(ToString::to_string)
        .unwrap_or_else(|| Uuid::new_v4().simple().to_string());
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let ip = client_ip(request.headers(), peer);

    RequestContext::new(request_id, ip)
        .scope(next.run(request))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scope_and_caller() {
        RequestContext::new("req-1", None)
            .scope(async {
                let ctx = RequestContext::try_current().unwrap();
                assert_eq!(ctx.request_id, "req-1");
                assert_eq!(ctx.caller(), Caller::Anonymous);

                ctx.set_caller(Caller::Account {
                    account_id: "acc".into(),
                    session_id: "sess".into(),
                });
                let again = RequestContext::try_current().unwrap();
                assert_eq!(
                    again.caller(),
                    Caller::Account {
                        account_id: "acc".into(),
                        session_id: "sess".into(),
                    }
                );
            })
            .await;
    }

    #[tokio::test]
    async fn test_no_context_outside_scope() {
        assert!(RequestContext::try_current().is_none());
    }

    #[tokio::test]
    async fn test_no_leak_across_tasks() {
        RequestContext::new("req-1", None)
            .scope(async {
                // A task spawned from within a scope does not inherit it.
                let handle = tokio::spawn(async { RequestContext::try_current().is_none() });
                assert!(handle.await.unwrap());
            })
            .await;
    }

    #[test]
    fn test_client_ip_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
        assert_eq!(
            client_ip(&headers, None),
            Some("203.0.113.7".parse().unwrap())
        );
    }

    #[test]
    fn test_client_ip_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "198.51.100.3".parse().unwrap());
        assert_eq!(
            client_ip(&headers, None),
            Some("198.51.100.3".parse().unwrap())
        );
    }

    #[test]
    fn test_client_ip_peer_fallback() {
        let headers = HeaderMap::new();
        let peer: SocketAddr = "192.0.2.1:443".parse().unwrap();
        assert_eq!(
            client_ip(&headers, Some(peer)),
            Some("192.0.2.1".parse().unwrap())
        );
    }

    #[test]
    fn test_client_ip_garbage_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "not-an-ip".parse().unwrap());
        assert_eq!(client_ip(&headers, None), None);
    }
}
