//! Flow actions.
//!
//! All inputs to the orchestrator: user intents (submit, edit, switch
//! flow) and events fed back by executed effects (session checked,
//! outcome received, handoff ready).

use crate::outcome::AuthOutcome;
use crate::state::{FieldId, FlowInstanceId, FlowKind};
use crate::routes::Location;
use serde::{Deserialize, Serialize};
use url::Url;

/// A third-party provider reachable by full-page handoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThirdPartyProvider {
    /// GitHub OAuth.
    Github,
    /// Google OAuth.
    Google,
    /// Okta.
    Okta,
}

impl ThirdPartyProvider {
    /// Wire identifier, also the callback path segment.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Google => "google",
            Self::Okta => "okta",
        }
    }
}

/// All possible inputs to the flow reducers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AuthAction {
    // ═══════════════════════════════════════════════════════════════
    // Page entry
    // ═══════════════════════════════════════════════════════════════
    /// The host mounted an auth page. Triggers location resolution and
    /// the session existence check.
    PageOpened,

    /// The navigation service reported the current location.
    LocationResolved {
        /// The resolved navigation context.
        location: Location,
    },

    /// The session existence check resolved.
    SessionChecked {
        /// Whether a session exists.
        exists: bool,
    },

    // ═══════════════════════════════════════════════════════════════
    // Form interaction
    // ═══════════════════════════════════════════════════════════════
    /// The user edited a form field.
    FieldEdited {
        /// The field that changed.
        field: FieldId,
        /// The new value.
        value: String,
    },

    /// The user switched between flows (e.g. login ↔ register).
    /// Discards the current instance and any in-flight outcome.
    SwitchFlow {
        /// The flow to present next.
        kind: FlowKind,
    },

    /// The user submitted the current form.
    Submit,

    /// A remote outcome arrived for a flow instance.
    OutcomeReceived {
        /// The instance that issued the call. Outcomes for superseded
        /// instances are discarded.
        instance: FlowInstanceId,
        /// The classified outcome.
        outcome: AuthOutcome,
    },

    // ═══════════════════════════════════════════════════════════════
    // Email verification
    // ═══════════════════════════════════════════════════════════════
    /// Redeem a verification token from the verification link.
    VerifyEmail {
        /// The token from the link.
        token: String,
    },

    /// The user asked for the verification email to be sent again.
    ResendVerificationEmail,

    /// The chained verification-email send settled (after retries).
    VerificationEmailSettled {
        /// The instance that chained the send.
        instance: FlowInstanceId,
        /// Whether the email was delivered.
        delivered: bool,
    },

    // ═══════════════════════════════════════════════════════════════
    // SSO handoff
    // ═══════════════════════════════════════════════════════════════
    /// Start the organization OIDC flow for a provider id.
    StartOidcFlow {
        /// The organization's OIDC provider id.
        provider_id: String,
    },

    /// Start a third-party provider flow (e.g. the Okta auto-trigger).
    StartThirdPartyFlow {
        /// The provider to hand off to.
        provider: ThirdPartyProvider,
    },

    /// The authorisation URL for a handoff is ready.
    HandoffReady {
        /// The instance that requested the handoff.
        instance: FlowInstanceId,
        /// The provider's authorisation URL.
        url: Url,
    },

    /// Building the authorisation URL failed.
    HandoffFailed {
        /// The instance that requested the handoff.
        instance: FlowInstanceId,
        /// Failure description shown to the user.
        message: String,
    },
}
