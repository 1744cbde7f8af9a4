//! Outcome classification.
//!
//! Translates a raw identity provider response into exactly one
//! [`AuthOutcome`]. The status vocabulary differs per flow kind and is
//! matched exhaustively: a status outside the declared vocabulary is a
//! programming invariant violation, never silently treated as success.

use crate::state::{FieldError, FieldId, FlowKind};
use authflow_core::invariant::InvariantViolation;
use serde::{Deserialize, Serialize};

/// A per-field error as reported on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFieldError {
    /// Wire field identifier (e.g. `email`).
    pub id: String,
    /// Message for that field.
    pub error: String,
}

/// A raw response from the identity provider, before classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteResponse {
    /// Status code (e.g. `OK`, `FIELD_ERROR`).
    pub status: String,

    /// Optional human-readable reason accompanying a disallowed status.
    #[serde(default)]
    pub reason: Option<String>,

    /// Field errors accompanying a `FIELD_ERROR` status.
    #[serde(default, rename = "formFields")]
    pub field_errors: Vec<RemoteFieldError>,
}

impl RemoteResponse {
    /// A response carrying only a status code.
    pub fn with_status(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            reason: None,
            field_errors: Vec::new(),
        }
    }

    /// A `FIELD_ERROR` response with the given field errors.
    pub fn field_error(errors: Vec<(impl Into<String>, impl Into<String>)>) -> Self {
        Self {
            status: "FIELD_ERROR".to_string(),
            reason: None,
            field_errors: errors
                .into_iter()
                .map(|(id, error)| RemoteFieldError {
                    id: id.into(),
                    error: error.into(),
                })
                .collect(),
        }
    }
}

/// The classified result of a remote authentication call.
///
/// Exactly one variant holds per response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthOutcome {
    /// The call succeeded; navigation follows.
    Ok {
        /// Optional redirect hint, validated by the redirect planner
        /// before use and taking precedence over the stored
        /// `redirectToPath`. The identity provider's wire format carries
        /// no such hint, so [`classify`] always leaves this `None`; it is
        /// an input channel for hosts that dispatch outcomes directly.
        redirect_hint: Option<String>,
    },
    /// Per-field errors; the user corrects and resubmits.
    FieldErrors(Vec<FieldError>),
    /// The operation is not allowed for this account.
    Disallowed {
        /// Reason shown in the notice.
        reason: String,
    },
    /// Wrong email/password combination.
    InvalidCredentials,
    /// The email address was already verified.
    AlreadyVerified,
    /// The verification token is invalid or expired.
    InvalidToken,
    /// A transport or parse failure; shown as a generic notice.
    UnexpectedError {
        /// Message describing the failure.
        message: String,
    },
}

/// Classify a remote response for the given flow kind.
///
/// # Errors
///
/// Returns an [`InvariantViolation`] when the status code is outside the
/// declared vocabulary for `kind`, or when a field error names an
/// unknown field. These must surface loudly; they are never mapped to a
/// recoverable outcome.
pub fn classify(kind: FlowKind, response: RemoteResponse) -> Result<AuthOutcome, InvariantViolation> {
    match (kind, response.status.as_str()) {
        (_, "OK") => Ok(AuthOutcome::Ok { redirect_hint: None }),

        (FlowKind::SignIn | FlowKind::Sso, "WRONG_CREDENTIALS_ERROR") => {
            Ok(AuthOutcome::InvalidCredentials)
        }
        (FlowKind::SignIn | FlowKind::Sso, "SIGN_IN_NOT_ALLOWED") => Ok(AuthOutcome::Disallowed {
            reason: response
                .reason
                .unwrap_or_else(|| "Please contact support for assistance.".to_string()),
        }),

        (FlowKind::SignUp, "SIGN_UP_NOT_ALLOWED") => Ok(AuthOutcome::Disallowed {
            reason: response
                .reason
                .unwrap_or_else(|| "Please contact support for assistance.".to_string()),
        }),

        (FlowKind::ResetPassword, "PASSWORD_RESET_NOT_ALLOWED") => Ok(AuthOutcome::Disallowed {
            reason: response
                .reason
                .unwrap_or_else(|| "Please contact support for assistance.".to_string()),
        }),

        (
            FlowKind::SignIn | FlowKind::Sso | FlowKind::SignUp | FlowKind::ResetPassword,
            "FIELD_ERROR",
        ) => Ok(AuthOutcome::FieldErrors(classify_field_errors(
            response.field_errors,
        )?)),

        (FlowKind::VerifyEmail, "EMAIL_ALREADY_VERIFIED_ERROR") => Ok(AuthOutcome::AlreadyVerified),
        (FlowKind::VerifyEmail, "EMAIL_VERIFICATION_INVALID_TOKEN_ERROR") => {
            Ok(AuthOutcome::InvalidToken)
        }

        (kind, status) => Err(InvariantViolation::new(format!(
            "unhandled status code `{status}` for {} flow",
            kind.as_str()
        ))),
    }
}

fn classify_field_errors(
    raw: Vec<RemoteFieldError>,
) -> Result<Vec<FieldError>, InvariantViolation> {
    raw.into_iter()
        .map(|entry| {
            FieldId::parse(&entry.id)
                .map(|field| FieldError::new(field, entry.error))
                .ok_or_else(|| {
                    InvariantViolation::new(format!("unknown field id `{}` in field error", entry.id))
                })
        })
        .collect()
}
