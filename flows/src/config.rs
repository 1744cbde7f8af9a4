//! Static configuration for the flow orchestrator.

use serde::{Deserialize, Serialize};
use url::Url;

/// Which external identity providers are enabled for this deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnabledProviders {
    /// GitHub OAuth.
    pub github: bool,
    /// Google OAuth.
    pub google: bool,
    /// Okta (also reachable via the `provider=okta` auto-trigger).
    pub okta: bool,
    /// Organization-scoped OIDC (SSO by provider id).
    pub organization_oidc: bool,
}

/// Static orchestrator configuration.
///
/// Route recognition and provider handoff are pure functions of this
/// value; nothing is registered at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Base URL of the application, used to build provider callback URIs.
    pub app_base_url: Url,

    /// Enabled external providers.
    pub providers: EnabledProviders,

    /// Whether a successful sign-up must be followed by email
    /// verification before the user may proceed.
    pub require_email_verification: bool,
}

impl AuthConfig {
    /// Enable or disable GitHub.
    #[must_use]
    pub const fn with_github(mut self, enabled: bool) -> Self {
        self.providers.github = enabled;
        self
    }

    /// Enable or disable Google.
    #[must_use]
    pub const fn with_google(mut self, enabled: bool) -> Self {
        self.providers.google = enabled;
        self
    }

    /// Enable or disable Okta.
    #[must_use]
    pub const fn with_okta(mut self, enabled: bool) -> Self {
        self.providers.okta = enabled;
        self
    }

    /// Enable or disable organization OIDC.
    #[must_use]
    pub const fn with_organization_oidc(mut self, enabled: bool) -> Self {
        self.providers.organization_oidc = enabled;
        self
    }

    /// Require (or not) email verification after sign-up.
    #[must_use]
    pub const fn with_email_verification(mut self, required: bool) -> Self {
        self.require_email_verification = required;
        self
    }
}

impl Default for AuthConfig {
    /// Local development defaults: all providers disabled, no forced
    /// email verification.
    ///
    /// # Panics
    ///
    /// Never panics; the hardcoded URL is valid.
    #[allow(clippy::expect_used)]
    fn default() -> Self {
        Self {
            app_base_url: Url::parse("http://localhost:3000")
                .expect("hardcoded base URL should always parse"),
            providers: EnabledProviders::default(),
            require_email_verification: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_toggle_providers() {
        let config = AuthConfig::default().with_okta(true).with_github(true);
        assert!(config.providers.okta);
        assert!(config.providers.github);
        assert!(!config.providers.google);
    }
}
