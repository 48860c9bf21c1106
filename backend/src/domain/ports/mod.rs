//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod confirmation_mailer;
mod event_catalogue;
mod guest_repository;
mod invitations_query;
mod registration_command;
mod registration_repository;
mod substitution_command;
mod substitution_repository;
mod webinar_gateway;

#[cfg(test)]
pub use confirmation_mailer::MockConfirmationMailer;
pub use confirmation_mailer::{ConfirmationMailer, ConfirmationMailerError};
#[cfg(test)]
pub use event_catalogue::MockEventCatalogue;
pub use event_catalogue::{
    EventCatalogue, EventCatalogueError, FixtureEventCatalogue, InvitedEvent,
};
#[cfg(test)]
pub use guest_repository::MockGuestRepository;
pub use guest_repository::{FixtureGuestRepository, GuestRepository, GuestRepositoryError};
#[cfg(test)]
pub use invitations_query::MockInvitationsQuery;
pub use invitations_query::{
    FixtureInvitationsQuery, InvitationsQuery, InvitationsRequest, InvitationsView,
};
#[cfg(test)]
pub use registration_command::MockRegistrationCommand;
pub use registration_command::{FixtureRegistrationCommand, RegistrationCommand};
#[cfg(test)]
pub use registration_repository::MockRegistrationRepository;
pub use registration_repository::{
    FixtureRegistrationRepository, RegistrationRepository, RegistrationRepositoryError,
};
#[cfg(test)]
pub use substitution_command::MockSubstitutionCommand;
pub use substitution_command::{FixtureSubstitutionCommand, SubstitutionCommand};
#[cfg(test)]
pub use substitution_repository::MockSubstitutionRepository;
pub use substitution_repository::{
    FixtureSubstitutionRepository, SubstitutionRepository, SubstitutionRepositoryError,
};
#[cfg(test)]
pub use webinar_gateway::MockWebinarGateway;
pub use webinar_gateway::{
    WebinarGateway, WebinarGatewayError, WebinarRegistrant, WebinarToken,
};
