//! Domain primitives, ports, and services.
//!
//! Purpose: Define strongly typed entities for guests, events,
//! registrations, and substitutions, plus the services that reconcile them
//! into request-scoped view models. Nothing here depends on actix, Diesel,
//! or reqwest; adapters reach the domain only through [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - EmailAddress, Guest, Event, Registration, Substitution: entities.
//! - GuestResolver, SubstitutionTracker, EventAggregator: read path.
//! - RegistrationService, SubstitutionService: write path.
//! - NotificationDispatcher: confirmation emails.

pub mod email;
pub mod error;
pub mod event;
mod event_aggregator;
pub mod guest;
mod guest_resolver;
mod invitations_service;
pub mod notification;
pub mod ports;
pub mod registration;
mod registration_service;
pub mod substitution;
mod substitution_service;
pub mod trace_id;

pub use self::email::{EmailAddress, EmailValidationError};
pub use self::error::{Error, ErrorCode};
pub use self::event::{Event, EventId, EventView, Modality, ModalityParseError, SanitizedHtml};
pub use self::event_aggregator::{
    AggregatedEvents, ClosedEventPolicy, ClosedEventPolicyParseError, EventAggregator,
};
pub use self::guest::{
    EventGroupId, Executive, ExecutiveId, Guest, GuestId, GuestKind, ListId, NewGuest,
    ResolvedGuest,
};
pub use self::guest_resolver::GuestResolver;
pub use self::invitations_service::{InvitationsService, InvitationsSettings};
pub use self::notification::{
    ConfirmationEmail, ConfirmationFields, ConfirmationTemplate, NotificationDispatcher,
    format_event_date,
};
pub use self::registration::{
    Registration, RegistrationOutcome, RegistrationPlan, RegistrationRequest, RegistrationStatus,
    RegistrationStep, RegistrationWarning, WebinarSeat,
};
pub use self::registration_service::{RegistrationDependencies, RegistrationService};
pub use self::substitution::{
    ActiveIdentity, NewSubstitution, Substitution, SubstitutionOutcome, SubstitutionRequest,
};
pub use self::substitution_service::{SubstitutionService, SubstitutionTracker};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
