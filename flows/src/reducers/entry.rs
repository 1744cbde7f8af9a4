//! Page entry reducer.
//!
//! Drives the work that happens before any flow runs: resolving the
//! navigation context, deciding which authentication path applies
//! (provider resolution), and gating on session existence. The session
//! check always resolves before the flow reducer issues its first remote
//! call, because submissions are rejected while the session state is
//! loading.

use crate::actions::{AuthAction, ThirdPartyProvider};
use crate::environment::AuthEnvironment;
use crate::providers::{IdentityProvider, Navigator, NotificationSink};
use crate::routes::{
    self, Location, OidcProviderSelection, NOT_FOUND_PATH, REDIRECT_QUERY_PARAM,
    RESET_PASSWORD_PATH, VERIFY_EMAIL_PATH,
};
use crate::state::{AuthState, FlowKind, FlowState, SessionState};
use authflow_core::effect::Effect;
use authflow_core::environment::Clock;
use authflow_core::reducer::Reducer;
use authflow_core::{smallvec, SmallVec};

/// Page entry reducer.
///
/// Handles `PageOpened`, `LocationResolved`, and `SessionChecked`.
#[derive(Debug, Clone, Default)]
pub struct EntryReducer<I, N, T, C> {
    /// Phantom data to hold type parameters.
    _phantom: std::marker::PhantomData<(I, N, T, C)>,
}

impl<I, N, T, C> EntryReducer<I, N, T, C> {
    /// Create a new entry reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<I, N, T, C> Reducer for EntryReducer<I, N, T, C>
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
            // PageOpened: resolve location and check session existence
            // ═══════════════════════════════════════════════════════════════
            AuthAction::PageOpened => {
                state.session = SessionState::default();
                state.location = None;

                let navigator = env.navigator.clone();
                let identity = env.identity.clone();

                smallvec![
                    Effect::future(async move {
                        match navigator.current_location() {
                            Some(location) => {
                                Ok(Some(AuthAction::LocationResolved { location }))
                            }
                            None => {
                                tracing::debug!("navigation context not available yet");
                                Ok(None)
                            }
                        }
                    }),
                    Effect::future(async move {
                        match identity.does_session_exist().await {
                            Ok(exists) => Ok(Some(AuthAction::SessionChecked { exists })),
                            Err(err) => {
                                tracing::warn!(error = %err, "session existence check failed");
                                Ok(Some(AuthAction::SessionChecked { exists: false }))
                            }
                        }
                    }),
                ]
            }

            // ═══════════════════════════════════════════════════════════════
            // LocationResolved: provider resolution for this page view
            // ═══════════════════════════════════════════════════════════════
            AuthAction::LocationResolved { location } => {
                state.redirect_to = location
                    .query_param(REDIRECT_QUERY_PARAM)
                    .map(ToString::to_string);

                let selection = routes::resolve(Some(&location), &env.config);
                let mut effects = self.entry_effects(state, &location, selection, env);
                state.location = Some(location);
                effects.extend(self.leave_if_authenticated(state, env));
                effects
            }

            // ═══════════════════════════════════════════════════════════════
            // SessionChecked: gate against already-authenticated state
            // ═══════════════════════════════════════════════════════════════
            AuthAction::SessionChecked { exists } => {
                state.session = SessionState {
                    loading: false,
                    exists,
                };
                self.leave_if_authenticated(state, env)
            }

            // Other actions are not handled by this reducer
            _ => smallvec![Effect::None],
        }
    }
}

impl<I, N, T, C> EntryReducer<I, N, T, C>
where
    I: IdentityProvider + Clone + Send + Sync + 'static,
    N: Navigator + Clone + Send + Sync + 'static,
    T: NotificationSink + Clone + Send + Sync + 'static,
    C: Clock + Clone + Send + Sync + 'static,
{
    /// Navigate away from the auth pages once both the session check and
    /// the navigation context have resolved and a session exists. The
    /// location and session effects complete in either order, so both
    /// handlers re-evaluate this. Verification pages are exempt: a fresh
    /// sign-up holds a session while the address is still unverified.
    fn leave_if_authenticated(
        &self,
        state: &AuthState,
        env: &AuthEnvironment<I, N, T, C>,
    ) -> SmallVec<[Effect<AuthAction>; 4]> {
        if state.session.loading || !state.session.exists {
            return smallvec![Effect::None];
        }
        match &state.location {
            None => smallvec![Effect::None],
            Some(location) if routes::is_verification_path(&location.path) => {
                smallvec![Effect::None]
            }
            Some(_) => {
                tracing::debug!("session exists, leaving auth pages");
                let navigator = env.navigator.clone();
                smallvec![Effect::future(async move {
                    navigator.navigate("/", &[]).await;
                    Ok(None)
                })]
            }
        }
    }

    /// Decide what a freshly resolved location leads to: not-found
    /// navigation, an auto-started SSO flow, or a plain form flow.
    fn entry_effects(
        &self,
        state: &mut AuthState,
        location: &Location,
        selection: OidcProviderSelection,
        env: &AuthEnvironment<I, N, T, C>,
    ) -> SmallVec<[Effect<AuthAction>; 4]> {
        match selection {
            OidcProviderSelection::Loading => smallvec![Effect::None],

            OidcProviderSelection::NotFound => {
                tracing::warn!(path = %location.path, "unrecognized auth path");
                let navigator = env.navigator.clone();
                smallvec![Effect::future(async move {
                    navigator.navigate(NOT_FOUND_PATH, &[]).await;
                    Ok(None)
                })]
            }

            // OIDC id takes precedence over the Okta auto-trigger.
            OidcProviderSelection::Resolved {
                provider_id: Some(provider_id),
            } => {
                smallvec![Effect::future(async move {
                    Ok(Some(AuthAction::StartOidcFlow { provider_id }))
                })]
            }

            OidcProviderSelection::Resolved { provider_id: None } => {
                if routes::okta_auto_trigger(location, &env.config) {
                    return smallvec![Effect::future(async move {
                        Ok(Some(AuthAction::StartThirdPartyFlow {
                            provider: ThirdPartyProvider::Okta,
                        }))
                    })];
                }

                // Mount the flow matching the page.
                match location.path.as_str() {
                    RESET_PASSWORD_PATH => {
                        state.flow = FlowState::new(FlowKind::ResetPassword);
                        smallvec![Effect::None]
                    }
                    VERIFY_EMAIL_PATH => {
                        state.flow = FlowState::new(FlowKind::VerifyEmail);
                        match location.query_param("token") {
                            Some(token) if !token.is_empty() => {
                                let token = token.to_string();
                                smallvec![Effect::future(async move {
                                    Ok(Some(AuthAction::VerifyEmail { token }))
                                })]
                            }
                            _ => smallvec![Effect::None],
                        }
                    }
                    _ => {
                        state.flow = FlowState::new(FlowKind::SignIn);
                        smallvec![Effect::None]
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::OIDC_ID_QUERY_PARAM;

    #[test]
    fn third_party_provider_names_match_callback_segments() {
        assert_eq!(ThirdPartyProvider::Okta.as_str(), "okta");
        assert_eq!(ThirdPartyProvider::Github.as_str(), "github");
        assert_eq!(ThirdPartyProvider::Google.as_str(), "google");
    }

    #[test]
    fn oidc_location_parses_id() {
        let location = Location::new("/auth/oidc").with_query(OIDC_ID_QUERY_PARAM, "acme");
        assert_eq!(location.query_param(OIDC_ID_QUERY_PARAM), Some("acme"));
    }
}
