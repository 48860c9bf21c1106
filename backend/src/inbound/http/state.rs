//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see the driving
//! ports, so they can be tested without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    FixtureInvitationsQuery, FixtureRegistrationCommand, FixtureSubstitutionCommand,
    InvitationsQuery, RegistrationCommand, SubstitutionCommand,
};

/// Use cases exposed over HTTP.
#[derive(Clone)]
pub struct HttpState {
    pub invitations: Arc<dyn InvitationsQuery>,
    pub registrations: Arc<dyn RegistrationCommand>,
    pub substitutions: Arc<dyn SubstitutionCommand>,
}

impl HttpState {
    pub fn new(
        invitations: Arc<dyn InvitationsQuery>,
        registrations: Arc<dyn RegistrationCommand>,
        substitutions: Arc<dyn SubstitutionCommand>,
    ) -> Self {
        Self {
            invitations,
            registrations,
            substitutions,
        }
    }

    /// Replace the invitations query.
    #[must_use]
    pub fn with_invitations(mut self, invitations: Arc<dyn InvitationsQuery>) -> Self {
        self.invitations = invitations;
        self
    }

    /// Replace the registration command.
    #[must_use]
    pub fn with_registrations(mut self, registrations: Arc<dyn RegistrationCommand>) -> Self {
        self.registrations = registrations;
        self
    }

    /// Replace the substitution command.
    #[must_use]
    pub fn with_substitutions(mut self, substitutions: Arc<dyn SubstitutionCommand>) -> Self {
        self.substitutions = substitutions;
        self
    }
}

impl Default for HttpState {
    /// State backed by fixture use cases that find nothing.
    fn default() -> Self {
        Self::new(
            Arc::new(FixtureInvitationsQuery),
            Arc::new(FixtureRegistrationCommand),
            Arc::new(FixtureSubstitutionCommand),
        )
    }
}
