//! SSO handoff reducer.
//!
//! Builds the provider authorisation URL and performs the full-page
//! handoff for organization OIDC and third-party providers. The handoff
//! is a terminal action: once the navigator redirects, control does not
//! return to the orchestrator.

use crate::actions::{AuthAction, ThirdPartyProvider};
use crate::environment::AuthEnvironment;
use crate::providers::{IdentityProvider, Navigator, NotificationSink};
use crate::state::{AuthState, FlowKind, FlowPhase, FlowState, Notice};
use authflow_core::effect::Effect;
use authflow_core::environment::Clock;
use authflow_core::reducer::Reducer;
use authflow_core::{smallvec, SmallVec};

/// SSO handoff reducer.
///
/// Handles `StartOidcFlow`, `StartThirdPartyFlow`, `HandoffReady`, and
/// `HandoffFailed`.
#[derive(Debug, Clone, Default)]
pub struct SsoReducer<I, N, T, C> {
    /// Phantom data to hold type parameters.
    _phantom: std::marker::PhantomData<(I, N, T, C)>,
}

impl<I, N, T, C> SsoReducer<I, N, T, C> {
    /// Create a new SSO reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<I, N, T, C> Reducer for SsoReducer<I, N, T, C>
where
    I: IdentityProvider + Clone + Send + Sync + 'static,
    N: Navigator + Clone + Send + Sync + 'static,
    T: NotificationSink + Clone + Send + Sync + 'static,
    C: Clock + Clone + Send + Sync + 'static,
{
    type State = AuthState;
    type Action = AuthAction;
    type Environment = AuthEnvironment<I, N, T, C>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ═══════════════════════════════════════════════════════════════
            // StartOidcFlow: organization OIDC by provider id
            // ═══════════════════════════════════════════════════════════════
            AuthAction::StartOidcFlow { provider_id } => {
                if !env.config.providers.organization_oidc {
                    tracing::warn!("organization OIDC flow requested but not enabled");
                    return smallvec![Effect::None];
                }
                self.start_handoff(state, env, &provider_id, "oidc")
            }

            // ═══════════════════════════════════════════════════════════════
            // StartThirdPartyFlow: e.g. the Okta auto-trigger
            // ═══════════════════════════════════════════════════════════════
            AuthAction::StartThirdPartyFlow { provider } => {
                let enabled = match provider {
                    ThirdPartyProvider::Github => env.config.providers.github,
                    ThirdPartyProvider::Google => env.config.providers.google,
                    ThirdPartyProvider::Okta => env.config.providers.okta,
                };
                if !enabled {
                    tracing::warn!(
                        provider = provider.as_str(),
                        "third-party flow requested but provider not enabled"
                    );
                    return smallvec![Effect::None];
                }
                self.start_handoff(state, env, provider.as_str(), provider.as_str())
            }

            // ═══════════════════════════════════════════════════════════════
            // HandoffReady: full-page redirect to the provider
            // ═══════════════════════════════════════════════════════════════
            AuthAction::HandoffReady { instance, url } => {
                if instance != state.flow.instance {
                    tracing::debug!("discarding handoff for superseded flow instance");
                    return smallvec![Effect::None];
                }

                state.flow.phase = FlowPhase::RedirectingToProvider { url: url.clone() };
                let navigator = env.navigator.clone();
                smallvec![Effect::future(async move {
                    navigator.handoff(&url).await;
                    Ok(None)
                })]
            }

            // ═══════════════════════════════════════════════════════════════
            // HandoffFailed: recoverable, shown as a notice
            // ═══════════════════════════════════════════════════════════════
            AuthAction::HandoffFailed { instance, message } => {
                if instance != state.flow.instance {
                    return smallvec![Effect::None];
                }

                tracing::warn!(%message, "provider handoff failed");
                let notice = Notice::error("Could not start the SSO login flow", message);
                state.flow.phase = FlowPhase::GlobalErrorShown {
                    notice: notice.clone(),
                };

                let notifications = env.notifications.clone();
                smallvec![Effect::future(async move {
                    notifications.notify(notice).await;
                    Ok(None)
                })]
            }

            // Other actions are not handled by this reducer
            _ => smallvec![Effect::None],
        }
    }
}

impl<I, N, T, C> SsoReducer<I, N, T, C>
where
    I: IdentityProvider + Clone + Send + Sync + 'static,
    N: Navigator + Clone + Send + Sync + 'static,
    T: NotificationSink + Clone + Send + Sync + 'static,
    C: Clock + Clone + Send + Sync + 'static,
{
    /// Mount a fresh SSO flow instance and request the authorisation
    /// URL. The callback path segment matches the provider id the
    /// identity provider expects.
    fn start_handoff(
        &self,
        state: &mut AuthState,
        env: &AuthEnvironment<I, N, T, C>,
        provider_id: &str,
        callback_segment: &str,
    ) -> SmallVec<[Effect<AuthAction>; 4]> {
        state.flow = FlowState::new(FlowKind::Sso);
        state.flow.phase = FlowPhase::Submitting {
            started_at: env.clock.now(),
        };
        let instance = state.flow.instance;

        let redirect_uri = match env
            .config
            .app_base_url
            .join(&format!("/auth/callback/{callback_segment}"))
        {
            Ok(uri) => uri,
            Err(err) => {
                tracing::error!(error = %err, "could not build callback URI");
                return smallvec![Effect::future(async move {
                    Ok(Some(AuthAction::HandoffFailed {
                        instance,
                        message: "An unexpected error occurred.".to_string(),
                    }))
                })];
            }
        };

        let identity = env.identity.clone();
        let provider_id = provider_id.to_string();
        smallvec![Effect::future(async move {
            match identity.authorisation_url(&provider_id, &redirect_uri).await {
                Ok(url) => Ok(Some(AuthAction::HandoffReady { instance, url })),
                Err(err) => {
                    tracing::warn!(error = %err, provider = %provider_id, "authorisation URL lookup failed");
                    Ok(Some(AuthAction::HandoffFailed {
                        instance,
                        message: err.to_string(),
                    }))
                }
            }
        })]
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    #[test]
    fn callback_uri_joins_onto_base() {
        #[allow(clippy::unwrap_used)]
        let base = Url::parse("https://app.example.com").unwrap();
        #[allow(clippy::unwrap_used)]
        let joined = base.join("/auth/callback/okta").unwrap();
        assert_eq!(joined.as_str(), "https://app.example.com/auth/callback/okta");
    }
}
