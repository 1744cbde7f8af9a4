//! Identity provider interface.

use crate::error::Result;
use crate::outcome::RemoteResponse;
use crate::state::AuthRequest;
use std::future::Future;
use url::Url;

/// The remote identity provider.
///
/// Owns credential storage, password hashing, session cookies, and
/// network-level timeouts. The orchestrator drives it through this
/// narrow interface and classifies every [`RemoteResponse`] through the
/// outcome mapper.
pub trait IdentityProvider: Send + Sync {
    /// Sign in with email and password.
    fn sign_in(&self, request: &AuthRequest) -> impl Future<Output = Result<RemoteResponse>> + Send;

    /// Create an account.
    fn sign_up(&self, request: &AuthRequest) -> impl Future<Output = Result<RemoteResponse>> + Send;

    /// Request a password reset email.
    fn send_password_reset_email(
        &self,
        request: &AuthRequest,
    ) -> impl Future<Output = Result<RemoteResponse>> + Send;

    /// Send a verification email for the current session's address.
    fn send_verification_email(&self) -> impl Future<Output = Result<RemoteResponse>> + Send;

    /// Redeem an email verification token.
    fn verify_email(&self, token: &str) -> impl Future<Output = Result<RemoteResponse>> + Send;

    /// Whether a session exists for this browser context.
    fn does_session_exist(&self) -> impl Future<Output = Result<bool>> + Send;

    /// Build the authorisation URL for a full-page handoff to an
    /// OIDC/SSO provider.
    fn authorisation_url(
        &self,
        provider_id: &str,
        redirect_uri: &Url,
    ) -> impl Future<Output = Result<Url>> + Send;
}
