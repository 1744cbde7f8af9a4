//! Authentication flow state types.
//!
//! This module defines the core state types for the flow orchestrator.
//! All types are `Clone` to support the functional architecture pattern.
//! The rendering layer is expected to project this state; nothing here
//! performs I/O.

use crate::routes::Location;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

// ═══════════════════════════════════════════════════════════════════════
// Flow Identity
// ═══════════════════════════════════════════════════════════════════════

/// The authentication use-case currently presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowKind {
    /// Email/password sign-in.
    SignIn,
    /// Account creation.
    SignUp,
    /// Password reset email request.
    ResetPassword,
    /// Email verification (token redemption and resend).
    VerifyEmail,
    /// SSO-by-domain: credentials submitted against the sign-in endpoint,
    /// presented as a separate flow.
    Sso,
}

impl FlowKind {
    /// Stable name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SignIn => "sign-in",
            Self::SignUp => "sign-up",
            Self::ResetPassword => "reset-password",
            Self::VerifyEmail => "verify-email",
            Self::Sso => "sso",
        }
    }
}

/// Unique identifier for one mounted flow instance.
///
/// Remote outcomes are correlated to the instance that issued them. When
/// the user switches flows (or navigates away), a fresh instance is
/// created and any outcome still in flight for the old instance is
/// discarded on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowInstanceId(pub uuid::Uuid);

impl FlowInstanceId {
    /// Generate a new random `FlowInstanceId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for FlowInstanceId {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Form Fields
// ═══════════════════════════════════════════════════════════════════════

/// A form field the orchestrator knows about.
///
/// The serialized names match the identity provider's wire format.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum FieldId {
    /// Email address.
    #[serde(rename = "email")]
    Email,
    /// Password.
    #[serde(rename = "password")]
    Password,
    /// First name (sign-up only).
    #[serde(rename = "firstName")]
    FirstName,
    /// Last name (sign-up only).
    #[serde(rename = "lastName")]
    LastName,
}

impl FieldId {
    /// Wire identifier for this field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Password => "password",
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
        }
    }

    /// Parse a wire identifier back into a `FieldId`.
    ///
    /// Returns `None` for identifiers outside the known vocabulary; the
    /// caller decides whether that is recoverable.
    #[must_use]
    pub fn parse(id: &str) -> Option<Self> {
        match id {
            "email" => Some(Self::Email),
            "password" => Some(Self::Password),
            "firstName" => Some(Self::FirstName),
            "lastName" => Some(Self::LastName),
            _ => None,
        }
    }
}

/// A field-level error attached to a named form field.
///
/// Produced from remote outcomes and from local schema validation;
/// never invented anywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// The field the error belongs to.
    pub field: FieldId,
    /// Human-readable message shown next to the field.
    pub message: String,
}

impl FieldError {
    /// Create a new field error.
    pub fn new(field: FieldId, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Notices
// ═══════════════════════════════════════════════════════════════════════

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeSeverity {
    /// Informational (e.g. "Email sent").
    Info,
    /// Error (e.g. "Invalid credentials").
    Error,
}

/// A toast-style notice delivered to the notification sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Short title.
    pub title: String,
    /// Longer description.
    pub description: String,
    /// Severity, used by the sink for presentation.
    pub severity: NoticeSeverity,
}

impl Notice {
    /// Create an error notice.
    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: NoticeSeverity::Error,
        }
    }

    /// Create an informational notice.
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: NoticeSeverity::Info,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Flow State Machine
// ═══════════════════════════════════════════════════════════════════════

/// Phase of the active flow instance.
///
/// `Idle → Submitting → {Success, FieldErrorsShown, GlobalErrorShown}`.
/// `Success` and `RedirectingToProvider` are terminal; the error phases
/// return to `Idle` on the next edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FlowPhase {
    /// Waiting for user input.
    Idle,

    /// A submission is in flight. Resubmission is rejected until the
    /// outcome for this instance arrives.
    Submitting {
        /// When the submission was issued.
        started_at: DateTime<Utc>,
    },

    /// Terminal success; navigation to `redirect_to` has been issued.
    Success {
        /// The planned same-origin relative path.
        redirect_to: String,
    },

    /// Remote or local field-level errors are displayed.
    FieldErrorsShown {
        /// One error per named field.
        errors: Vec<FieldError>,
    },

    /// A global notice is displayed; field values are retained.
    GlobalErrorShown {
        /// The notice that was delivered to the sink.
        notice: Notice,
    },

    /// Terminal: a full-page handoff to an external provider is underway.
    RedirectingToProvider {
        /// The provider's authorisation URL.
        url: Url,
    },
}

/// State of the currently mounted flow instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowState {
    /// Which authentication use-case this instance presents.
    pub kind: FlowKind,

    /// Correlation identity for in-flight remote calls.
    pub instance: FlowInstanceId,

    /// Current phase of the state machine.
    pub phase: FlowPhase,

    /// Current form field values. Preserved across error outcomes so the
    /// user never loses input (the password field is not cleared).
    pub values: BTreeMap<FieldId, String>,
}

impl FlowState {
    /// Create a fresh flow instance of the given kind.
    #[must_use]
    pub fn new(kind: FlowKind) -> Self {
        Self {
            kind,
            instance: FlowInstanceId::new(),
            phase: FlowPhase::Idle,
            values: BTreeMap::new(),
        }
    }

    /// Current value of a field, if any.
    #[must_use]
    pub fn value(&self, field: FieldId) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Whether a submission is currently in flight.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        matches!(self.phase, FlowPhase::Submitting { .. })
    }
}

impl Default for FlowState {
    fn default() -> Self {
        Self::new(FlowKind::SignIn)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Session & Root State
// ═══════════════════════════════════════════════════════════════════════

/// Session existence as reported by the identity provider.
///
/// Owned by the collaborator; the orchestrator only reads it. While
/// `loading` is true no flow may issue a remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// The session check has not resolved yet.
    pub loading: bool,
    /// A session exists for this browser context.
    pub exists: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            loading: true,
            exists: false,
        }
    }
}

/// Root orchestrator state.
///
/// # Examples
///
/// ```
/// # use authflow::state::AuthState;
/// let state = AuthState::default();
/// assert!(state.session.loading);
/// assert!(state.location.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AuthState {
    /// Session existence/loading, refreshed on page open.
    pub session: SessionState,

    /// The currently mounted flow instance.
    pub flow: FlowState,

    /// Navigation context, captured once per page view. `None` until the
    /// navigation service has reported it.
    pub location: Option<Location>,

    /// Requested post-success redirect path, captured from the
    /// `redirectToPath` query parameter. Validated by the redirect
    /// planner before use.
    pub redirect_to: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════
// Requests
// ═══════════════════════════════════════════════════════════════════════

/// A submission request, built on form submit and consumed exactly once
/// by the remote call. A fresh request is built on every resubmission.
///
/// Invariant: `fields` holds exactly the schema required for `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRequest {
    /// The flow kind this request belongs to.
    pub kind: FlowKind,
    /// Field values, keyed by wire field identifier.
    pub fields: BTreeMap<FieldId, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_id_round_trips_through_wire_names() {
        for field in [
            FieldId::Email,
            FieldId::Password,
            FieldId::FirstName,
            FieldId::LastName,
        ] {
            assert_eq!(FieldId::parse(field.as_str()), Some(field));
        }
        assert_eq!(FieldId::parse("phoneNumber"), None);
    }

    #[test]
    fn fresh_flow_instances_are_distinct() {
        let a = FlowState::new(FlowKind::SignIn);
        let b = FlowState::new(FlowKind::SignIn);
        assert_ne!(a.instance, b.instance);
        assert_eq!(a.phase, FlowPhase::Idle);
    }

    #[test]
    fn default_session_is_loading() {
        let session = SessionState::default();
        assert!(session.loading);
        assert!(!session.exists);
    }
}
