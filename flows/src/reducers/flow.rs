//! Form flow reducer.
//!
//! Owns the per-flow state machine for sign-in, sign-up, reset-password,
//! and verify-email: local validation, submission, outcome handling, and
//! redirect planning.
//!
//! # State machine
//!
//! `Idle → Submitting → {Success, FieldErrorsShown, GlobalErrorShown}`.
//! Error states return to `Idle` on the next edit. One flow instance is
//! active per page; a completed response for a superseded instance is
//! discarded on arrival.

use crate::actions::AuthAction;
use crate::environment::AuthEnvironment;
use crate::outcome::{self, AuthOutcome};
use crate::providers::{IdentityProvider, Navigator, NotificationSink};
use crate::redirect;
use crate::routes::VERIFY_EMAIL_PATH;
use crate::state::{AuthRequest, AuthState, FlowKind, FlowPhase, FlowState, Notice};
use crate::validate;
use authflow_core::effect::Effect;
use authflow_core::environment::Clock;
use authflow_core::reducer::Reducer;
use authflow_core::{smallvec, SmallVec};
use authflow_runtime::retry::{retry_with_backoff, RetryPolicy};
use std::time::Duration;

/// Form flow reducer.
///
/// Handles field edits, flow switches, submissions, outcomes, and the
/// email verification actions.
#[derive(Debug, Clone, Default)]
pub struct FlowReducer<I, N, T, C> {
    /// Phantom data to hold type parameters.
    _phantom: std::marker::PhantomData<(I, N, T, C)>,
}

impl<I, N, T, C> FlowReducer<I, N, T, C> {
    /// Create a new flow reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// Verification emails are retried twice after the initial attempt
/// (three calls total) before the send is reported as failed.
fn verification_email_retry_policy() -> RetryPolicy {
    RetryPolicy::builder()
        .max_retries(2)
        .initial_delay(Duration::from_millis(200))
        .build()
}

impl<I, N, T, C> Reducer for FlowReducer<I, N, T, C>
where
    I: IdentityProvider + Clone + Send + Sync + 'static,
    N: Navigator + Clone + Send + Sync + 'static,
    T: NotificationSink + Clone + Send + Sync + 'static,
    C: Clock + Clone + Send + Sync + 'static,
{
    type State = AuthState;
    type Action = AuthAction;
    type Environment = AuthEnvironment<I, N, T, C>;

    #[allow(clippy::too_many_lines)]
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ═══════════════════════════════════════════════════════════════
            // FieldEdited: record input, clear any shown errors
            // ═══════════════════════════════════════════════════════════════
            AuthAction::FieldEdited { field, value } => {
                if state.flow.is_submitting() {
                    tracing::debug!(field = field.as_str(), "edit ignored while submitting");
                    return smallvec![Effect::None];
                }

                state.flow.values.insert(field, value);
                if matches!(
                    state.flow.phase,
                    FlowPhase::FieldErrorsShown { .. } | FlowPhase::GlobalErrorShown { .. }
                ) {
                    state.flow.phase = FlowPhase::Idle;
                }
                smallvec![Effect::None]
            }

            // ═══════════════════════════════════════════════════════════════
            // SwitchFlow: fresh instance, in-flight outcomes are discarded
            // ═══════════════════════════════════════════════════════════════
            AuthAction::SwitchFlow { kind } => {
                state.flow = FlowState::new(kind);
                smallvec![Effect::None]
            }

            // ═══════════════════════════════════════════════════════════════
            // Submit: validate locally, then call the identity provider
            // ═══════════════════════════════════════════════════════════════
            AuthAction::Submit => self.submit(state, env),

            // ═══════════════════════════════════════════════════════════════
            // OutcomeReceived: classify-driven transition
            // ═══════════════════════════════════════════════════════════════
            AuthAction::OutcomeReceived { instance, outcome } => {
                if instance != state.flow.instance {
                    tracing::debug!(?instance, "discarding outcome for superseded flow instance");
                    return smallvec![Effect::None];
                }
                self.apply_outcome(state, outcome, env)
            }

            // ═══════════════════════════════════════════════════════════════
            // VerifyEmail: redeem a token from the verification link
            // ═══════════════════════════════════════════════════════════════
            AuthAction::VerifyEmail { token } => {
                if state.flow.kind != FlowKind::VerifyEmail {
                    state.flow = FlowState::new(FlowKind::VerifyEmail);
                }
                if state.flow.is_submitting() {
                    tracing::warn!("token redemption already in flight");
                    return smallvec![Effect::None];
                }

                state.flow.phase = FlowPhase::Submitting {
                    started_at: env.clock.now(),
                };

                let identity = env.identity.clone();
                let instance = state.flow.instance;
                smallvec![Effect::future(async move {
                    let outcome = match identity.verify_email(&token).await {
                        Ok(response) => outcome::classify(FlowKind::VerifyEmail, response)?,
                        Err(err) => {
                            tracing::error!(error = %err, "email verification call failed");
                            AuthOutcome::UnexpectedError {
                                message: err.to_string(),
                            }
                        }
                    };
                    Ok(Some(AuthAction::OutcomeReceived { instance, outcome }))
                })]
            }

            // ═══════════════════════════════════════════════════════════════
            // ResendVerificationEmail: single attempt, toast either way
            // ═══════════════════════════════════════════════════════════════
            AuthAction::ResendVerificationEmail => {
                let identity = env.identity.clone();
                let notifications = env.notifications.clone();
                let instance = state.flow.instance;
                smallvec![Effect::future(async move {
                    let outcome = match identity.send_verification_email().await {
                        Ok(response) => outcome::classify(FlowKind::VerifyEmail, response)?,
                        Err(err) => {
                            tracing::warn!(error = %err, "verification email send failed");
                            notifications
                                .notify(Notice::error(
                                    "Could not send verification email",
                                    "Please try again later.",
                                ))
                                .await;
                            return Ok(Some(AuthAction::VerificationEmailSettled {
                                instance,
                                delivered: false,
                            }));
                        }
                    };

                    match outcome {
                        AuthOutcome::AlreadyVerified => {
                            notifications
                                .notify(Notice::info(
                                    "Email already verified",
                                    "Your email address has already been verified.",
                                ))
                                .await;
                            Ok(Some(AuthAction::VerificationEmailSettled {
                                instance,
                                delivered: false,
                            }))
                        }
                        _ => {
                            notifications
                                .notify(Notice::info(
                                    "Verification email sent",
                                    "Please check your email inbox.",
                                ))
                                .await;
                            Ok(Some(AuthAction::VerificationEmailSettled {
                                instance,
                                delivered: true,
                            }))
                        }
                    }
                })]
            }

            // ═══════════════════════════════════════════════════════════════
            // VerificationEmailSettled: bookkeeping only, never blocks
            // ═══════════════════════════════════════════════════════════════
            AuthAction::VerificationEmailSettled {
                instance,
                delivered,
            } => {
                if instance != state.flow.instance {
                    return smallvec![Effect::None];
                }
                if delivered {
                    tracing::info!("verification email delivered");
                } else {
                    tracing::warn!("verification email not delivered after retries");
                }
                smallvec![Effect::None]
            }

            // Other actions are not handled by this reducer
            _ => smallvec![Effect::None],
        }
    }
}

impl<I, N, T, C> FlowReducer<I, N, T, C>
where
    I: IdentityProvider + Clone + Send + Sync + 'static,
    N: Navigator + Clone + Send + Sync + 'static,
    T: NotificationSink + Clone + Send + Sync + 'static,
    C: Clock + Clone + Send + Sync + 'static,
{
    fn submit(
        &self,
        state: &mut AuthState,
        env: &AuthEnvironment<I, N, T, C>,
    ) -> SmallVec<[Effect<AuthAction>; 4]> {
        // The session gate must resolve before the first remote call.
        if state.session.loading {
            tracing::warn!("submission rejected while session state is loading");
            return smallvec![Effect::None];
        }
        if state.session.exists {
            tracing::warn!("submission rejected, a session already exists");
            return smallvec![Effect::None];
        }

        // Concurrency guard: one submission in flight per instance.
        if state.flow.is_submitting() {
            tracing::warn!(
                flow = state.flow.kind.as_str(),
                "resubmission while submitting ignored"
            );
            return smallvec![Effect::None];
        }

        let kind = state.flow.kind;
        if kind == FlowKind::VerifyEmail {
            tracing::warn!("the verify-email flow has no form submission");
            return smallvec![Effect::None];
        }

        let errors = validate::validate(kind, &state.flow.values);
        if !errors.is_empty() {
            state.flow.phase = FlowPhase::FieldErrorsShown { errors };
            return smallvec![Effect::None];
        }

        // A fresh request is built on every submission and consumed
        // exactly once by the remote call.
        let request = AuthRequest {
            kind,
            fields: validate::required_fields(kind)
                .iter()
                .filter_map(|&field| {
                    state
                        .flow
                        .values
                        .get(&field)
                        .map(|value| (field, value.clone()))
                })
                .collect(),
        };

        state.flow.phase = FlowPhase::Submitting {
            started_at: env.clock.now(),
        };

        let identity = env.identity.clone();
        let instance = state.flow.instance;
        smallvec![Effect::future(async move {
            let result = match kind {
                // SSO-by-domain submits against the sign-in endpoint.
                FlowKind::SignIn | FlowKind::Sso => identity.sign_in(&request).await,
                FlowKind::SignUp => identity.sign_up(&request).await,
                FlowKind::ResetPassword => identity.send_password_reset_email(&request).await,
                FlowKind::VerifyEmail => return Ok(None),
            };

            let outcome = match result {
                Ok(response) => outcome::classify(kind, response)?,
                Err(err) => {
                    tracing::error!(error = %err, flow = kind.as_str(), "identity call failed");
                    AuthOutcome::UnexpectedError {
                        message: err.to_string(),
                    }
                }
            };
            Ok(Some(AuthAction::OutcomeReceived { instance, outcome }))
        })]
    }

    #[allow(clippy::too_many_lines)]
    fn apply_outcome(
        &self,
        state: &mut AuthState,
        outcome: AuthOutcome,
        env: &AuthEnvironment<I, N, T, C>,
    ) -> SmallVec<[Effect<AuthAction>; 4]> {
        match outcome {
            AuthOutcome::Ok { redirect_hint } => self.apply_success(state, redirect_hint, env),

            AuthOutcome::FieldErrors(errors) => {
                // Field values are retained; the user corrects and
                // resubmits with a fresh request.
                state.flow.phase = FlowPhase::FieldErrorsShown { errors };
                smallvec![Effect::None]
            }

            AuthOutcome::InvalidCredentials => self.show_global_error(
                state,
                env,
                Notice::error(
                    "Invalid email or password",
                    "Please check your email and password and try again.",
                ),
            ),

            AuthOutcome::Disallowed { reason } => {
                let title = match state.flow.kind {
                    FlowKind::SignIn | FlowKind::Sso => "Sign in not allowed",
                    FlowKind::SignUp => "Sign up not allowed",
                    FlowKind::ResetPassword => "Password reset not allowed",
                    FlowKind::VerifyEmail => "Not allowed",
                };
                self.show_global_error(state, env, Notice::error(title, reason))
            }

            AuthOutcome::AlreadyVerified => {
                state.flow.phase = FlowPhase::Idle;
                let notifications = env.notifications.clone();
                smallvec![Effect::future(async move {
                    notifications
                        .notify(Notice::info(
                            "Email already verified",
                            "Your email address has already been verified.",
                        ))
                        .await;
                    Ok(None)
                })]
            }

            AuthOutcome::InvalidToken => {
                // Shown inline on the verification page; no toast.
                state.flow.phase = FlowPhase::GlobalErrorShown {
                    notice: Notice::error(
                        "Email verification",
                        "The email verification link has expired.",
                    ),
                };
                smallvec![Effect::None]
            }

            AuthOutcome::UnexpectedError { message } => {
                tracing::error!(flow = state.flow.kind.as_str(), %message, "unexpected error");
                self.show_global_error(state, env, Notice::error("An error occurred", message))
            }
        }
    }

    fn apply_success(
        &self,
        state: &mut AuthState,
        redirect_hint: Option<String>,
        env: &AuthEnvironment<I, N, T, C>,
    ) -> SmallVec<[Effect<AuthAction>; 4]> {
        match state.flow.kind {
            // Sign-up may chain a verification email; navigation to the
            // verification-pending page does not wait for it.
            FlowKind::SignUp if env.config.require_email_verification => {
                state.flow.phase = FlowPhase::Success {
                    redirect_to: VERIFY_EMAIL_PATH.to_string(),
                };

                let identity = env.identity.clone();
                let navigator = env.navigator.clone();
                let instance = state.flow.instance;
                smallvec![
                    Effect::future(async move {
                        navigator.navigate(VERIFY_EMAIL_PATH, &[]).await;
                        Ok(None)
                    }),
                    Effect::future(async move {
                        let delivered =
                            retry_with_backoff(verification_email_retry_policy(), move || {
                                let identity = identity.clone();
                                async move { identity.send_verification_email().await }
                            })
                            .await
                            .is_ok();
                        Ok(Some(AuthAction::VerificationEmailSettled {
                            instance,
                            delivered,
                        }))
                    }),
                ]
            }

            // The reset flow stays on the page; only a notice is shown.
            FlowKind::ResetPassword => {
                state.flow.phase = FlowPhase::Idle;
                let notifications = env.notifications.clone();
                smallvec![Effect::future(async move {
                    notifications
                        .notify(Notice::info(
                            "Email sent",
                            "Please check your email to reset your password.",
                        ))
                        .await;
                    Ok(None)
                })]
            }

            // Token redemption: the page renders the success state with
            // the planned target; no automatic navigation.
            FlowKind::VerifyEmail => {
                let target = redirect::plan(
                    redirect_hint.as_deref().or(state.redirect_to.as_deref()),
                );
                state.flow.phase = FlowPhase::Success {
                    redirect_to: target,
                };
                smallvec![Effect::None]
            }

            FlowKind::SignIn | FlowKind::Sso | FlowKind::SignUp => {
                let target = redirect::plan(
                    redirect_hint.as_deref().or(state.redirect_to.as_deref()),
                );
                state.flow.phase = FlowPhase::Success {
                    redirect_to: target.clone(),
                };

                let navigator = env.navigator.clone();
                smallvec![Effect::future(async move {
                    navigator.navigate(&target, &[]).await;
                    Ok(None)
                })]
            }
        }
    }

    fn show_global_error(
        &self,
        state: &mut AuthState,
        env: &AuthEnvironment<I, N, T, C>,
        notice: Notice,
    ) -> SmallVec<[Effect<AuthAction>; 4]> {
        state.flow.phase = FlowPhase::GlobalErrorShown {
            notice: notice.clone(),
        };

        let notifications = env.notifications.clone();
        smallvec![Effect::future(async move {
            notifications.notify(notice).await;
            Ok(None)
        })]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_retry_policy_allows_three_attempts() {
        let policy = verification_email_retry_policy();
        assert_eq!(policy.max_retries, 2);
    }
}
