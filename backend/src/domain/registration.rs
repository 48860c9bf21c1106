//! Registration records, the per-attempt step plan, and outcomes.
//!
//! A registration attempt walks an ordered plan of steps. Virtual events add
//! the two webinar steps in front of persistence; pairs that are already
//! registered only re-run the idempotent upsert.

use std::fmt;

use serde::Serialize;
use utoipa::ToSchema;

use super::{EmailAddress, EventId, GuestId, Modality};

/// The `event_guest` relation for one (guest, event) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub guest_id: GuestId,
    pub event_id: EventId,
    pub registered: bool,
    /// Override address used for the webinar join.
    pub webinar_email: Option<EmailAddress>,
}

/// Command accepted by the registration use case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub guest_id: GuestId,
    pub event_id: EventId,
    /// Explicit acknowledgement from the guest. Nothing runs unless `true`.
    pub confirmed: bool,
    /// Alternate address to register with the webinar provider.
    pub webinar_email: Option<EmailAddress>,
    /// Store [`RegistrationRequest::webinar_email`] on the guest record.
    pub persist_webinar_email: bool,
}

/// Step of a single registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationStep {
    Pending,
    AwaitingWebinarToken,
    AwaitingWebinarRegistration,
    Persisting,
    Notifying,
    Done,
    Failed,
}

impl RegistrationStep {
    /// Stable name used in logs and error details.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::AwaitingWebinarToken => "awaiting_webinar_token",
            Self::AwaitingWebinarRegistration => "awaiting_webinar_registration",
            Self::Persisting => "persisting",
            Self::Notifying => "notifying",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RegistrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered steps for one registration attempt and the position reached.
///
/// # Examples
/// ```
/// use registration_backend::domain::{Modality, RegistrationPlan, RegistrationStep};
///
/// let plan = RegistrationPlan::new(Modality::Virtual, false);
/// assert_eq!(
///     plan.steps(),
///     &[
///         RegistrationStep::Pending,
///         RegistrationStep::AwaitingWebinarToken,
///         RegistrationStep::AwaitingWebinarRegistration,
///         RegistrationStep::Persisting,
///         RegistrationStep::Notifying,
///         RegistrationStep::Done,
///     ]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationPlan {
    steps: Vec<RegistrationStep>,
    position: usize,
    failed_at: Option<RegistrationStep>,
}

impl RegistrationPlan {
    /// Build the plan for an event modality and the pair's current state.
    pub fn new(modality: Modality, already_registered: bool) -> Self {
        let mut steps = vec![RegistrationStep::Pending];
        if already_registered {
            steps.push(RegistrationStep::Persisting);
        } else {
            if modality.is_virtual() {
                steps.push(RegistrationStep::AwaitingWebinarToken);
                steps.push(RegistrationStep::AwaitingWebinarRegistration);
            }
            steps.push(RegistrationStep::Persisting);
            steps.push(RegistrationStep::Notifying);
        }
        steps.push(RegistrationStep::Done);
        Self {
            steps,
            position: 0,
            failed_at: None,
        }
    }

    /// Every step in execution order.
    pub fn steps(&self) -> &[RegistrationStep] {
        &self.steps
    }

    /// Whether `step` is part of this attempt.
    pub fn includes(&self, step: RegistrationStep) -> bool {
        self.steps.contains(&step)
    }

    /// Current step, or [`RegistrationStep::Failed`] once halted.
    pub fn current(&self) -> RegistrationStep {
        if self.failed_at.is_some() {
            return RegistrationStep::Failed;
        }
        self.steps
            .get(self.position)
            .copied()
            .unwrap_or(RegistrationStep::Done)
    }

    /// Step that was running when the attempt halted.
    pub fn failed_at(&self) -> Option<RegistrationStep> {
        self.failed_at
    }

    /// Move to the next step and return it. Halted plans stay halted.
    pub fn advance(&mut self) -> RegistrationStep {
        if self.failed_at.is_none() && self.position + 1 < self.steps.len() {
            let from = self.current();
            self.position += 1;
            tracing::debug!(from = %from, to = %self.current(), "registration step");
        }
        self.current()
    }

    /// Halt the attempt at the current step.
    pub fn fail(&mut self) -> RegistrationStep {
        if self.failed_at.is_none() {
            let at = self.current();
            self.failed_at = Some(at);
            tracing::debug!(at = %at, "registration halted");
        }
        RegistrationStep::Failed
    }
}

/// Whether the attempt created a new registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Registered,
    AlreadyRegistered,
}

/// Seat reserved with the webinar provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebinarSeat {
    pub registrant_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_url: Option<String>,
}

/// Non-fatal problem reported alongside a confirmed registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum RegistrationWarning {
    /// The confirmation email could not be sent.
    NotificationFailed { message: String },
    /// The override webinar address was not stored on the guest.
    WebinarEmailNotPersisted { message: String },
}

/// Result of a successful registration attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationOutcome {
    pub status: RegistrationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webinar: Option<WebinarSeat>,
    pub warnings: Vec<RegistrationWarning>,
}
