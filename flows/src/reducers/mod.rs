//! Flow reducers.
//!
//! The orchestrator is split into three reducers, each owning one slice
//! of the action space, composed by [`AuthFlowReducer`]:
//!
//! - [`EntryReducer`]: page entry, provider resolution, session gate
//! - [`FlowReducer`]: the form flow state machine
//! - [`SsoReducer`]: provider handoff

pub mod entry;
pub mod flow;
pub mod sso;

pub use entry::EntryReducer;
pub use flow::FlowReducer;
pub use sso::SsoReducer;

use crate::actions::AuthAction;
use crate::environment::AuthEnvironment;
use crate::providers::{IdentityProvider, Navigator, NotificationSink};
use crate::state::AuthState;
use authflow_core::effect::Effect;
use authflow_core::environment::Clock;
use authflow_core::reducer::Reducer;
use authflow_core::SmallVec;

/// Composite reducer driving the whole authentication flow.
///
/// Routes each action to the reducer that owns it.
#[derive(Debug, Clone, Default)]
pub struct AuthFlowReducer<I, N, T, C> {
    entry: EntryReducer<I, N, T, C>,
    flow: FlowReducer<I, N, T, C>,
    sso: SsoReducer<I, N, T, C>,
}

impl<I, N, T, C> AuthFlowReducer<I, N, T, C> {
    /// Create a new composite reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entry: EntryReducer::new(),
            flow: FlowReducer::new(),
            sso: SsoReducer::new(),
        }
    }
}

impl<I, N, T, C> Reducer for AuthFlowReducer<I, N, T, C>
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
            AuthAction::PageOpened
            | AuthAction::LocationResolved { .. }
            | AuthAction::SessionChecked { .. } => self.entry.reduce(state, action, env),

            AuthAction::StartOidcFlow { .. }
            | AuthAction::StartThirdPartyFlow { .. }
            | AuthAction::HandoffReady { .. }
            | AuthAction::HandoffFailed { .. } => self.sso.reduce(state, action, env),

            AuthAction::FieldEdited { .. }
            | AuthAction::SwitchFlow { .. }
            | AuthAction::Submit
            | AuthAction::OutcomeReceived { .. }
            | AuthAction::VerifyEmail { .. }
            | AuthAction::ResendVerificationEmail
            | AuthAction::VerificationEmailSettled { .. } => self.flow.reduce(state, action, env),
        }
    }
}
