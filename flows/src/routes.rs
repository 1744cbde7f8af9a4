//! Route recognition and provider resolution.
//!
//! Decides which authentication path applies to the current location:
//! plain auth page, OIDC-by-id auto-start, Okta auto-trigger, or a
//! provider callback route. Everything here is a pure function of the
//! location and the static configuration; no route set is built up at
//! runtime.

use crate::config::AuthConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

/// Entry path for the auth page.
pub const AUTH_PATH: &str = "/auth";
/// Alias for the auth page kept for old bookmarks.
pub const LOGIN_PATH: &str = "/auth/login";
/// Verification-pending page, also the token redemption target.
pub const VERIFY_EMAIL_PATH: &str = "/auth/verify-email";
/// Password reset request page.
pub const RESET_PASSWORD_PATH: &str = "/auth/reset-password";
/// Organization OIDC entry path (requires an `id` query parameter).
pub const OIDC_PATH: &str = "/auth/oidc";
/// Not-found page, navigated to for unrecognized auth paths.
pub const NOT_FOUND_PATH: &str = "/404";

/// Query parameter carrying the requested post-success redirect.
pub const REDIRECT_QUERY_PARAM: &str = "redirectToPath";
/// Query parameter carrying the organization OIDC provider id.
pub const OIDC_ID_QUERY_PARAM: &str = "id";
/// Query parameter that auto-triggers the Okta flow.
pub const PROVIDER_QUERY_PARAM: &str = "provider";

/// A navigation context: path plus parsed query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Location {
    /// URL path component (e.g. `/auth/oidc`).
    pub path: String,
    /// Query parameters. Later duplicates overwrite earlier ones.
    pub query: BTreeMap<String, String>,
}

impl Location {
    /// Create a location with no query parameters.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: BTreeMap::new(),
        }
    }

    /// Parse a full href into a location.
    ///
    /// # Errors
    ///
    /// Returns a parse error if `href` is not an absolute URL.
    pub fn from_href(href: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(href)?;
        let query = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Ok(Self {
            path: url.path().to_string(),
            query,
        })
    }

    /// Add a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Look up a query parameter.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }
}

/// The resolved authentication path for a page view.
///
/// Derived once per navigation and immutable for the lifetime of the
/// page view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OidcProviderSelection {
    /// The navigation context is not available yet.
    Loading,
    /// The path is not a recognized auth route (or the OIDC entry path
    /// is missing its `id`); the caller must redirect to not-found.
    NotFound,
    /// A recognized auth route. `provider_id` is `Some` only when the
    /// organization OIDC flow must auto-start.
    Resolved {
        /// Organization OIDC provider id, if the flow must auto-start.
        provider_id: Option<String>,
    },
}

/// Whether `path` is a recognized auth route under `config`.
///
/// Provider callback paths are recognized only for enabled providers.
#[must_use]
pub fn is_recognized(path: &str, config: &AuthConfig) -> bool {
    match path {
        AUTH_PATH | LOGIN_PATH | VERIFY_EMAIL_PATH | RESET_PASSWORD_PATH => true,
        "/auth/callback/github" => config.providers.github,
        "/auth/callback/google" => config.providers.google,
        "/auth/callback/okta" => config.providers.okta,
        OIDC_PATH | "/auth/callback/oidc" => config.providers.organization_oidc,
        _ => false,
    }
}

/// Resolve the authentication path for the given location.
///
/// Returns `Loading` until the navigation context is available. On the
/// OIDC entry path a missing `id` parameter resolves to `NotFound` even
/// when organization OIDC is enabled.
#[must_use]
pub fn resolve(location: Option<&Location>, config: &AuthConfig) -> OidcProviderSelection {
    let Some(location) = location else {
        return OidcProviderSelection::Loading;
    };

    if !is_recognized(&location.path, config) {
        return OidcProviderSelection::NotFound;
    }

    if config.providers.organization_oidc && location.path == OIDC_PATH {
        return match location.query_param(OIDC_ID_QUERY_PARAM) {
            None | Some("") => OidcProviderSelection::NotFound,
            Some(id) => OidcProviderSelection::Resolved {
                provider_id: Some(id.to_string()),
            },
        };
    }

    OidcProviderSelection::Resolved { provider_id: None }
}

/// Whether the Okta flow should auto-start for this location.
///
/// Triggered by `provider=okta` in the query when Okta is enabled.
/// A resolved OIDC provider id takes precedence over this trigger.
#[must_use]
pub fn okta_auto_trigger(location: &Location, config: &AuthConfig) -> bool {
    config.providers.okta && location.query_param(PROVIDER_QUERY_PARAM) == Some("okta")
}

/// Whether `path` is a verification target the session gate must not
/// navigate away from.
#[must_use]
pub fn is_verification_path(path: &str) -> bool {
    path == VERIFY_EMAIL_PATH
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oidc_config() -> AuthConfig {
        AuthConfig::default().with_organization_oidc(true)
    }

    #[test]
    fn resolves_loading_before_navigation_context() {
        assert_eq!(
            resolve(None, &AuthConfig::default()),
            OidcProviderSelection::Loading
        );
    }

    #[test]
    fn unrecognized_path_is_not_found() {
        let location = Location::new("/auth/unknown");
        assert_eq!(
            resolve(Some(&location), &AuthConfig::default()),
            OidcProviderSelection::NotFound
        );
    }

    #[test]
    fn callback_paths_require_enabled_provider() {
        let location = Location::new("/auth/callback/github");
        assert_eq!(
            resolve(Some(&location), &AuthConfig::default()),
            OidcProviderSelection::NotFound
        );
        assert_eq!(
            resolve(Some(&location), &AuthConfig::default().with_github(true)),
            OidcProviderSelection::Resolved { provider_id: None }
        );
    }

    #[test]
    fn oidc_path_without_id_is_not_found_even_when_enabled() {
        let location = Location::new(OIDC_PATH);
        assert_eq!(
            resolve(Some(&location), &oidc_config()),
            OidcProviderSelection::NotFound
        );

        let location = Location::new(OIDC_PATH).with_query(OIDC_ID_QUERY_PARAM, "");
        assert_eq!(
            resolve(Some(&location), &oidc_config()),
            OidcProviderSelection::NotFound
        );
    }

    #[test]
    fn oidc_path_with_id_resolves_provider() {
        let location = Location::new(OIDC_PATH).with_query(OIDC_ID_QUERY_PARAM, "acme-corp");
        assert_eq!(
            resolve(Some(&location), &oidc_config()),
            OidcProviderSelection::Resolved {
                provider_id: Some("acme-corp".to_string()),
            }
        );
    }

    #[test]
    fn oidc_path_is_not_found_when_oidc_disabled() {
        let location = Location::new(OIDC_PATH).with_query(OIDC_ID_QUERY_PARAM, "acme-corp");
        assert_eq!(
            resolve(Some(&location), &AuthConfig::default()),
            OidcProviderSelection::NotFound
        );
    }

    #[test]
    fn okta_trigger_requires_enabled_okta() {
        let location = Location::new(AUTH_PATH).with_query(PROVIDER_QUERY_PARAM, "okta");
        assert!(!okta_auto_trigger(&location, &AuthConfig::default()));
        assert!(okta_auto_trigger(
            &location,
            &AuthConfig::default().with_okta(true)
        ));
    }

    #[test]
    fn location_parses_href_with_query() {
        #[allow(clippy::unwrap_used)]
        let location =
            Location::from_href("http://localhost:3000/auth/oidc?id=acme&redirectToPath=%2Forg")
                .unwrap();
        assert_eq!(location.path, "/auth/oidc");
        assert_eq!(location.query_param("id"), Some("acme"));
        assert_eq!(location.query_param(REDIRECT_QUERY_PARAM), Some("/org"));
    }
}
