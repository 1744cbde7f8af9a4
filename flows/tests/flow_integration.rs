//! Integration tests for the form flow state machine.
//!
//! These tests drive the reducer directly and assert on state and effect
//! shapes; store-driven end-to-end scenarios live in
//! `store_integration.rs`.

#![allow(clippy::panic)] // Test code can panic

use authflow::{
    actions::AuthAction,
    config::AuthConfig,
    environment::AuthEnvironment,
    mocks::{MockIdentityProvider, MockNavigator, MockNotificationSink},
    outcome::AuthOutcome,
    reducers::AuthFlowReducer,
    state::{
        AuthState, FieldError, FieldId, FlowInstanceId, FlowKind, FlowPhase, FlowState,
        SessionState,
    },
};
use authflow_core::reducer::Reducer;
use authflow_testing::{assertions, mocks::test_clock, FixedClock, ReducerTest};

type TestEnv =
    AuthEnvironment<MockIdentityProvider, MockNavigator, MockNotificationSink, FixedClock>;
type TestReducer =
    AuthFlowReducer<MockIdentityProvider, MockNavigator, MockNotificationSink, FixedClock>;

/// Create a test environment with mock providers.
fn create_test_env(config: AuthConfig) -> TestEnv {
    AuthEnvironment::new(
        MockIdentityProvider::new(),
        MockNavigator::new(),
        MockNotificationSink::new(),
        test_clock(),
        config,
    )
}

/// A state with the session gate already resolved and the given flow
/// mounted.
fn ready_state(kind: FlowKind) -> AuthState {
    let mut state = AuthState::default();
    state.session = SessionState {
        loading: false,
        exists: false,
    };
    state.flow = FlowState::new(kind);
    state
}

fn fill(state: &mut AuthState, pairs: &[(FieldId, &str)]) {
    for &(field, value) in pairs {
        state.flow.values.insert(field, value.to_string());
    }
}

const VALID_SIGN_IN: &[(FieldId, &str)] = &[
    (FieldId::Email, "user@example.com"),
    (FieldId::Password, "12345678"),
];

#[test]
fn submit_with_missing_fields_never_calls_remote() {
    let reducer = TestReducer::new();
    let env = create_test_env(AuthConfig::default());
    let mut state = ready_state(FlowKind::SignIn);
    fill(&mut state, &[(FieldId::Email, "user@example.com")]);

    let effects = reducer.reduce(&mut state, AuthAction::Submit, &env);

    // Local validation short-circuit: no effect reaches the provider.
    assertions::assert_no_effects(&effects);
    let FlowPhase::FieldErrorsShown { errors } = &state.flow.phase else {
        panic!("expected FieldErrorsShown, got {:?}", state.flow.phase);
    };
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, FieldId::Password);
}

#[test]
fn sign_up_validation_reports_all_missing_fields() {
    let reducer = TestReducer::new();
    let env = create_test_env(AuthConfig::default());
    let mut state = ready_state(FlowKind::SignUp);

    let effects = reducer.reduce(&mut state, AuthAction::Submit, &env);

    assertions::assert_no_effects(&effects);
    let FlowPhase::FieldErrorsShown { errors } = &state.flow.phase else {
        panic!("expected FieldErrorsShown");
    };
    let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
    assert_eq!(
        fields,
        vec![
            FieldId::FirstName,
            FieldId::LastName,
            FieldId::Email,
            FieldId::Password,
        ]
    );
}

#[test]
fn valid_submission_enters_submitting_with_one_remote_effect() {
    let reducer = TestReducer::new();
    let env = create_test_env(AuthConfig::default());
    let mut state = ready_state(FlowKind::SignIn);
    fill(&mut state, VALID_SIGN_IN);

    let effects = reducer.reduce(&mut state, AuthAction::Submit, &env);

    assertions::assert_effects_count(&effects, 1);
    assertions::assert_has_future_effect(&effects);
    assert!(state.flow.is_submitting());
}

#[test]
fn resubmission_while_submitting_is_ignored() {
    let reducer = TestReducer::new();
    let env = create_test_env(AuthConfig::default());
    let mut state = ready_state(FlowKind::SignIn);
    fill(&mut state, VALID_SIGN_IN);

    let first = reducer.reduce(&mut state, AuthAction::Submit, &env);
    assertions::assert_has_future_effect(&first);

    // Still submitting: the second submission must not be queued.
    let second = reducer.reduce(&mut state, AuthAction::Submit, &env);
    assertions::assert_no_effects(&second);
    assert!(state.flow.is_submitting());
}

#[test]
fn submission_is_rejected_while_session_gate_is_loading() {
    let reducer = TestReducer::new();
    let env = create_test_env(AuthConfig::default());
    let mut state = AuthState::default();
    fill(&mut state, VALID_SIGN_IN);
    assert!(state.session.loading);

    let effects = reducer.reduce(&mut state, AuthAction::Submit, &env);

    assertions::assert_no_effects(&effects);
    assert_eq!(state.flow.phase, FlowPhase::Idle);
}

#[test]
fn submission_is_rejected_when_a_session_already_exists() {
    let reducer = TestReducer::new();
    let env = create_test_env(AuthConfig::default());
    let mut state = ready_state(FlowKind::SignIn);
    state.session.exists = true;
    fill(&mut state, VALID_SIGN_IN);

    let effects = reducer.reduce(&mut state, AuthAction::Submit, &env);

    assertions::assert_no_effects(&effects);
    assert_eq!(state.flow.phase, FlowPhase::Idle);
}

#[test]
fn field_error_outcome_keeps_other_field_values() {
    let reducer = TestReducer::new();
    let env = create_test_env(AuthConfig::default());
    let mut state = ready_state(FlowKind::SignIn);
    fill(&mut state, VALID_SIGN_IN);
    let instance = state.flow.instance;

    reducer.reduce(
        &mut state,
        AuthAction::OutcomeReceived {
            instance,
            outcome: AuthOutcome::FieldErrors(vec![FieldError::new(
                FieldId::Email,
                "This email does not exist",
            )]),
        },
        &env,
    );

    let FlowPhase::FieldErrorsShown { errors } = &state.flow.phase else {
        panic!("expected FieldErrorsShown");
    };
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, FieldId::Email);
    // The password field is not cleared.
    assert_eq!(state.flow.value(FieldId::Password), Some("12345678"));
}

#[test]
fn outcome_for_superseded_instance_is_discarded() {
    let reducer = TestReducer::new();
    let env = create_test_env(AuthConfig::default());
    let mut state = ready_state(FlowKind::SignIn);
    fill(&mut state, VALID_SIGN_IN);
    reducer.reduce(&mut state, AuthAction::Submit, &env);

    let effects = reducer.reduce(
        &mut state,
        AuthAction::OutcomeReceived {
            instance: FlowInstanceId::new(),
            outcome: AuthOutcome::Ok { redirect_hint: None },
        },
        &env,
    );

    assertions::assert_no_effects(&effects);
    assert!(state.flow.is_submitting());
}

#[test]
fn editing_a_field_clears_shown_errors() {
    let mut state = ready_state(FlowKind::SignIn);
    state.flow.phase = FlowPhase::FieldErrorsShown {
        errors: vec![FieldError::new(FieldId::Email, "This email does not exist")],
    };

    ReducerTest::new(TestReducer::new())
        .with_env(create_test_env(AuthConfig::default()))
        .given_state(state)
        .when_action(AuthAction::FieldEdited {
            field: FieldId::Email,
            value: "other@example.com".to_string(),
        })
        .then_state(|state| {
            assert_eq!(state.flow.phase, FlowPhase::Idle);
            assert_eq!(state.flow.value(FieldId::Email), Some("other@example.com"));
        })
        .then_effects(|effects| assertions::assert_no_effects(effects))
        .run();
}

#[test]
fn switching_flows_resets_values_and_instance() {
    let mut state = ready_state(FlowKind::SignIn);
    fill(&mut state, VALID_SIGN_IN);
    let old_instance = state.flow.instance;

    ReducerTest::new(TestReducer::new())
        .with_env(create_test_env(AuthConfig::default()))
        .given_state(state)
        .when_action(AuthAction::SwitchFlow {
            kind: FlowKind::SignUp,
        })
        .then_state(move |state| {
            assert_eq!(state.flow.kind, FlowKind::SignUp);
            assert_ne!(state.flow.instance, old_instance);
            assert!(state.flow.values.is_empty());
        })
        .then_effects(|effects| assertions::assert_no_effects(effects))
        .run();
}

#[test]
fn success_outcome_honors_safe_redirect_and_rejects_unsafe() {
    let reducer = TestReducer::new();
    let env = create_test_env(AuthConfig::default());

    let mut state = ready_state(FlowKind::SignIn);
    state.redirect_to = Some("/org/acme".to_string());
    let instance = state.flow.instance;
    reducer.reduce(
        &mut state,
        AuthAction::OutcomeReceived {
            instance,
            outcome: AuthOutcome::Ok { redirect_hint: None },
        },
        &env,
    );
    assert_eq!(
        state.flow.phase,
        FlowPhase::Success {
            redirect_to: "/org/acme".to_string(),
        }
    );

    let mut state = ready_state(FlowKind::SignIn);
    state.redirect_to = Some("https://evil.com".to_string());
    let instance = state.flow.instance;
    reducer.reduce(
        &mut state,
        AuthAction::OutcomeReceived {
            instance,
            outcome: AuthOutcome::Ok { redirect_hint: None },
        },
        &env,
    );
    assert_eq!(
        state.flow.phase,
        FlowPhase::Success {
            redirect_to: "/".to_string(),
        }
    );
}

#[test]
fn sign_up_success_with_verification_chains_email_and_navigation() {
    let reducer = TestReducer::new();
    let env = create_test_env(AuthConfig::default().with_email_verification(true));
    let mut state = ready_state(FlowKind::SignUp);
    let instance = state.flow.instance;

    let effects = reducer.reduce(
        &mut state,
        AuthAction::OutcomeReceived {
            instance,
            outcome: AuthOutcome::Ok { redirect_hint: None },
        },
        &env,
    );

    // Navigation and the chained verification email run independently;
    // navigation never waits for the email to settle.
    assertions::assert_effects_count(&effects, 2);
    assert_eq!(
        state.flow.phase,
        FlowPhase::Success {
            redirect_to: "/auth/verify-email".to_string(),
        }
    );
}

#[test]
fn verification_email_settlement_never_changes_the_outcome() {
    let reducer = TestReducer::new();
    let env = create_test_env(AuthConfig::default().with_email_verification(true));
    let mut state = ready_state(FlowKind::SignUp);
    state.flow.phase = FlowPhase::Success {
        redirect_to: "/auth/verify-email".to_string(),
    };
    let instance = state.flow.instance;

    let effects = reducer.reduce(
        &mut state,
        AuthAction::VerificationEmailSettled {
            instance,
            delivered: false,
        },
        &env,
    );

    assertions::assert_no_effects(&effects);
    assert_eq!(
        state.flow.phase,
        FlowPhase::Success {
            redirect_to: "/auth/verify-email".to_string(),
        }
    );
}

#[test]
fn reset_password_success_stays_on_the_page() {
    let reducer = TestReducer::new();
    let env = create_test_env(AuthConfig::default());
    let mut state = ready_state(FlowKind::ResetPassword);
    fill(&mut state, &[(FieldId::Email, "user@example.com")]);
    let instance = state.flow.instance;

    let effects = reducer.reduce(
        &mut state,
        AuthAction::OutcomeReceived {
            instance,
            outcome: AuthOutcome::Ok { redirect_hint: None },
        },
        &env,
    );

    // Only the "Email sent" notice; no navigation.
    assertions::assert_effects_count(&effects, 1);
    assert_eq!(state.flow.phase, FlowPhase::Idle);
}

#[test]
fn invalid_credentials_shows_global_error_and_keeps_values() {
    let reducer = TestReducer::new();
    let env = create_test_env(AuthConfig::default());
    let mut state = ready_state(FlowKind::SignIn);
    fill(&mut state, VALID_SIGN_IN);
    let instance = state.flow.instance;

    reducer.reduce(
        &mut state,
        AuthAction::OutcomeReceived {
            instance,
            outcome: AuthOutcome::InvalidCredentials,
        },
        &env,
    );

    let FlowPhase::GlobalErrorShown { notice } = &state.flow.phase else {
        panic!("expected GlobalErrorShown");
    };
    assert_eq!(notice.title, "Invalid email or password");
    assert_eq!(state.flow.value(FieldId::Password), Some("12345678"));
}

#[test]
fn expired_token_outcome_is_shown_inline() {
    let reducer = TestReducer::new();
    let env = create_test_env(AuthConfig::default());
    let mut state = ready_state(FlowKind::VerifyEmail);
    let instance = state.flow.instance;

    let effects = reducer.reduce(
        &mut state,
        AuthAction::OutcomeReceived {
            instance,
            outcome: AuthOutcome::InvalidToken,
        },
        &env,
    );

    assertions::assert_no_effects(&effects);
    let FlowPhase::GlobalErrorShown { notice } = &state.flow.phase else {
        panic!("expected GlobalErrorShown");
    };
    assert_eq!(notice.description, "The email verification link has expired.");
}
