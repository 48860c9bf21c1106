//! Driving port for the invitations page.
//!
//! Inbound adapters call this port with a validated email and receive a
//! request-scoped view model. Read-path failures never surface as errors
//! here; they degrade the view instead.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{EmailAddress, Error, EventGroupId, EventView};

/// Request for the events an email is invited to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitationsRequest {
    pub email: EmailAddress,
    /// Event group scope. Falls back to the configured current group.
    pub event_group_id: Option<EventGroupId>,
}

/// View model rendered by the invitations page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvitationsView {
    /// Email from the entry path.
    pub email: EmailAddress,
    /// Email used for every lookup after substitution.
    pub effective_email: EmailAddress,
    /// Display name of the first resolved guest record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_name: Option<String>,
    pub replaced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement_name: Option<String>,
    /// Events open for registration, ordered by date.
    pub events: Vec<EventView>,
    /// Events with registration closed, ordered by date.
    pub closed_events: Vec<EventView>,
    /// Contact notice shown when closed events exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_notice: Option<String>,
    /// Some lookups failed and the listing is partial.
    pub degraded: bool,
}

impl InvitationsView {
    /// View with no guest and no events.
    pub fn empty(email: EmailAddress) -> Self {
        Self {
            effective_email: email.clone(),
            email,
            guest_name: None,
            replaced: false,
            replacement_name: None,
            events: Vec::new(),
            closed_events: Vec::new(),
            help_notice: None,
            degraded: false,
        }
    }
}

/// Driving port for invitation reads.
///
/// # Examples
///
/// ```rust,no_run
/// # async fn example() -> Result<(), registration_backend::domain::Error> {
/// use registration_backend::domain::EmailAddress;
/// use registration_backend::domain::ports::{
///     FixtureInvitationsQuery, InvitationsQuery, InvitationsRequest,
/// };
///
/// let request = InvitationsRequest {
///     email: EmailAddress::parse("a@x.com").expect("email"),
///     event_group_id: None,
/// };
/// let view = FixtureInvitationsQuery.invitations(request).await?;
/// assert!(view.events.is_empty());
/// # Ok(())
/// # }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvitationsQuery: Send + Sync {
    /// Build the invitations view for one email.
    async fn invitations(&self, request: InvitationsRequest) -> Result<InvitationsView, Error>;
}

/// Fixture query returning an empty view.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureInvitationsQuery;

#[async_trait]
impl InvitationsQuery for FixtureInvitationsQuery {
    async fn invitations(&self, request: InvitationsRequest) -> Result<InvitationsView, Error> {
        Ok(InvitationsView::empty(request.email))
    }
}
