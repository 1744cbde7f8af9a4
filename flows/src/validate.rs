//! Local schema validation.
//!
//! Runs before any remote call. A failed validation transitions the flow
//! to `FieldErrorsShown` without touching the network; remote field
//! errors use the same [`FieldError`] shape.

use crate::state::{FieldError, FieldId, FlowKind};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

#[allow(clippy::expect_used)]
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("hardcoded email regex should always compile")
});

/// The exact field schema required for a flow kind.
#[must_use]
pub const fn required_fields(kind: FlowKind) -> &'static [FieldId] {
    match kind {
        FlowKind::SignIn | FlowKind::Sso => &[FieldId::Email, FieldId::Password],
        FlowKind::SignUp => &[
            FieldId::FirstName,
            FieldId::LastName,
            FieldId::Email,
            FieldId::Password,
        ],
        FlowKind::ResetPassword => &[FieldId::Email],
        // Token redemption has no form schema.
        FlowKind::VerifyEmail => &[],
    }
}

/// Validate form values against the schema for `kind`.
///
/// Returns one error per failing field, in schema order. An empty result
/// means the submission may proceed to the remote call.
#[must_use]
pub fn validate(kind: FlowKind, values: &BTreeMap<FieldId, String>) -> Vec<FieldError> {
    required_fields(kind)
        .iter()
        .filter_map(|&field| {
            let value = values.get(&field).map(String::as_str).unwrap_or_default();
            validate_field(field, value).map(|message| FieldError::new(field, message))
        })
        .collect()
}

fn validate_field(field: FieldId, value: &str) -> Option<&'static str> {
    match field {
        FieldId::Email => {
            if value.is_empty() {
                Some("Email is required")
            } else if !is_valid_email(value) {
                Some("Invalid email address")
            } else {
                None
            }
        }
        FieldId::Password => {
            if value.len() < MIN_PASSWORD_LENGTH {
                Some("Password must be at least 8 characters long")
            } else {
                None
            }
        }
        FieldId::FirstName => value.is_empty().then_some("First name is required"),
        FieldId::LastName => value.is_empty().then_some("Last name is required"),
    }
}

fn is_valid_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(FieldId, &str)]) -> BTreeMap<FieldId, String> {
        pairs
            .iter()
            .map(|&(field, value)| (field, value.to_string()))
            .collect()
    }

    #[test]
    fn sign_in_requires_email_and_password() {
        let errors = validate(FlowKind::SignIn, &BTreeMap::new());
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, FieldId::Email);
        assert_eq!(errors[1].field, FieldId::Password);
    }

    #[test]
    fn sign_up_requires_names() {
        let errors = validate(
            FlowKind::SignUp,
            &values(&[
                (FieldId::Email, "a@b.com"),
                (FieldId::Password, "12345678"),
            ]),
        );
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, FieldId::FirstName);
        assert_eq!(errors[1].field, FieldId::LastName);
    }

    #[test]
    fn rejects_malformed_email() {
        let errors = validate(FlowKind::ResetPassword, &values(&[(FieldId::Email, "not-an-email")]));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Invalid email address");
    }

    #[test]
    fn rejects_short_password() {
        let errors = validate(
            FlowKind::SignIn,
            &values(&[(FieldId::Email, "a@b.com"), (FieldId::Password, "1234567")]),
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, FieldId::Password);
    }

    #[test]
    fn accepts_complete_valid_values() {
        let errors = validate(
            FlowKind::SignUp,
            &values(&[
                (FieldId::FirstName, "Max"),
                (FieldId::LastName, "R"),
                (FieldId::Email, "a@b.com"),
                (FieldId::Password, "12345678"),
            ]),
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn verify_email_has_no_schema() {
        assert!(validate(FlowKind::VerifyEmail, &BTreeMap::new()).is_empty());
    }

    #[test]
    fn sso_shares_the_sign_in_schema() {
        assert_eq!(
            required_fields(FlowKind::Sso),
            required_fields(FlowKind::SignIn)
        );
    }
}
