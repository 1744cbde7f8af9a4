//! # Authflow
//!
//! Client-side authentication flow orchestration built on the authflow
//! architecture: the logic that decides which authentication mode to
//! present (password sign-in/up, SSO via OIDC, Okta auto-trigger, email
//! verification, password reset), drives a multi-step protocol against a
//! remote identity provider, and reconciles server-reported outcomes
//! into local state.
//!
//! ## Architecture
//!
//! Flows are implemented as reducers and effects:
//!
//! ```text
//! Action → Reducer → (State, Effects) → Effect Execution → More Actions
//! ```
//!
//! The rendering layer is a pure projection of [`state::AuthState`]; it
//! is not part of this crate. A host sends actions into a store, which
//! runs [`reducers::AuthFlowReducer`] and executes the returned effects.
//!
//! ## Example: password sign-in
//!
//! ```rust,ignore
//! use authflow::*;
//!
//! // 1. Page mounts: resolve location, check session existence
//! store.send(AuthAction::PageOpened).await?;
//!
//! // 2. User fills the form and submits
//! store.send(AuthAction::FieldEdited {
//!     field: FieldId::Email,
//!     value: "user@example.com".into(),
//! }).await?;
//! store.send(AuthAction::Submit).await?;
//!
//! // 3. The outcome is classified and applied; on success the
//! //    navigator is told where to go next.
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod actions;
pub mod config;
pub mod environment;
pub mod error;
pub mod outcome;
pub mod providers;
pub mod redirect;
pub mod reducers;
pub mod routes;
pub mod state;
pub mod validate;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use actions::{AuthAction, ThirdPartyProvider};
pub use config::AuthConfig;
pub use environment::AuthEnvironment;
pub use error::TransportError;
pub use outcome::{AuthOutcome, RemoteResponse};
pub use reducers::AuthFlowReducer;
pub use routes::{Location, OidcProviderSelection};
pub use state::{AuthState, FieldError, FieldId, FlowInstanceId, FlowKind, FlowPhase, FlowState};
