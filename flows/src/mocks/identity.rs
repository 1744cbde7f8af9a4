//! Mock identity provider for testing.

use crate::error::{Result, TransportError};
use crate::outcome::RemoteResponse;
use crate::providers::IdentityProvider;
use crate::state::AuthRequest;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use url::Url;

#[derive(Debug, Default)]
struct Inner {
    sign_in: VecDeque<Result<RemoteResponse>>,
    sign_up: VecDeque<Result<RemoteResponse>>,
    password_reset: VecDeque<Result<RemoteResponse>>,
    verification_email: VecDeque<Result<RemoteResponse>>,
    verify_email: VecDeque<Result<RemoteResponse>>,
    authorisation_url: VecDeque<Result<Url>>,
    authorisation_requests: Vec<(String, Url)>,
    session_exists: bool,
    calls: Vec<&'static str>,
}

/// Mock identity provider.
///
/// Responses are scripted per operation with `enqueue_*`; when a queue
/// is empty the operation answers with a plain `OK` response. Every call
/// is recorded by operation name.
#[derive(Debug, Clone, Default)]
pub struct MockIdentityProvider {
    inner: Arc<Mutex<Inner>>,
}

impl MockIdentityProvider {
    /// Create a new mock with no session and no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Script the next `sign_in` response.
    pub fn enqueue_sign_in(&self, response: Result<RemoteResponse>) {
        self.lock().sign_in.push_back(response);
    }

    /// Script the next `sign_up` response.
    pub fn enqueue_sign_up(&self, response: Result<RemoteResponse>) {
        self.lock().sign_up.push_back(response);
    }

    /// Script the next `send_password_reset_email` response.
    pub fn enqueue_password_reset(&self, response: Result<RemoteResponse>) {
        self.lock().password_reset.push_back(response);
    }

    /// Script the next `send_verification_email` response.
    pub fn enqueue_verification_email(&self, response: Result<RemoteResponse>) {
        self.lock().verification_email.push_back(response);
    }

    /// Script the next `verify_email` response.
    pub fn enqueue_verify_email(&self, response: Result<RemoteResponse>) {
        self.lock().verify_email.push_back(response);
    }

    /// Script the next `authorisation_url` response.
    pub fn enqueue_authorisation_url(&self, response: Result<Url>) {
        self.lock().authorisation_url.push_back(response);
    }

    /// Set the answer of the session existence check.
    pub fn set_session_exists(&self, exists: bool) {
        self.lock().session_exists = exists;
    }

    /// All recorded calls, in order, by operation name.
    #[must_use]
    pub fn calls(&self) -> Vec<&'static str> {
        self.lock().calls.clone()
    }

    /// Arguments of every `authorisation_url` call, in order:
    /// `(provider_id, redirect_uri)`.
    #[must_use]
    pub fn authorisation_requests(&self) -> Vec<(String, Url)> {
        self.lock().authorisation_requests.clone()
    }

    /// How many times the named operation was called.
    #[must_use]
    pub fn call_count(&self, operation: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|name| **name == operation)
            .count()
    }

    fn respond(&self, operation: &'static str) -> Result<RemoteResponse> {
        let mut inner = self.lock();
        inner.calls.push(operation);
        let queue = match operation {
            "sign_in" => &mut inner.sign_in,
            "sign_up" => &mut inner.sign_up,
            "send_password_reset_email" => &mut inner.password_reset,
            "send_verification_email" => &mut inner.verification_email,
            "verify_email" => &mut inner.verify_email,
            _ => return Err(TransportError::Network("unknown operation".to_string())),
        };
        queue
            .pop_front()
            .unwrap_or_else(|| Ok(RemoteResponse::with_status("OK")))
    }
}

impl IdentityProvider for MockIdentityProvider {
    fn sign_in(&self, _request: &AuthRequest) -> impl Future<Output = Result<RemoteResponse>> + Send {
        let response = self.respond("sign_in");
        async move { response }
    }

    fn sign_up(&self, _request: &AuthRequest) -> impl Future<Output = Result<RemoteResponse>> + Send {
        let response = self.respond("sign_up");
        async move { response }
    }

    fn send_password_reset_email(
        &self,
        _request: &AuthRequest,
    ) -> impl Future<Output = Result<RemoteResponse>> + Send {
        let response = self.respond("send_password_reset_email");
        async move { response }
    }

    fn send_verification_email(&self) -> impl Future<Output = Result<RemoteResponse>> + Send {
        let response = self.respond("send_verification_email");
        async move { response }
    }

    fn verify_email(&self, _token: &str) -> impl Future<Output = Result<RemoteResponse>> + Send {
        let response = self.respond("verify_email");
        async move { response }
    }

    fn does_session_exist(&self) -> impl Future<Output = Result<bool>> + Send {
        let exists = {
            let mut inner = self.lock();
            inner.calls.push("does_session_exist");
            inner.session_exists
        };
        async move { Ok(exists) }
    }

    fn authorisation_url(
        &self,
        provider_id: &str,
        redirect_uri: &Url,
    ) -> impl Future<Output = Result<Url>> + Send {
        let response = {
            let mut inner = self.lock();
            inner.calls.push("authorisation_url");
            inner
                .authorisation_requests
                .push((provider_id.to_string(), redirect_uri.clone()));
            inner.authorisation_url.pop_front().unwrap_or_else(|| {
                match Url::parse("https://provider.example/authorize") {
                    Ok(mut url) => {
                        url.query_pairs_mut()
                            .append_pair("client_id", provider_id)
                            .append_pair("redirect_uri", redirect_uri.as_str());
                        Ok(url)
                    }
                    Err(err) => Err(TransportError::MalformedResponse(err.to_string())),
                }
            })
        };
        async move { response }
    }
}
