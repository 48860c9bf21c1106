//! Event aggregation across every guest record of one email.
//!
//! Per-guest lookups run concurrently. A failing lookup is logged and
//! skipped so the listing degrades instead of failing outright.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use futures_util::future::join_all;
use tracing::warn;

use crate::domain::ports::{EventCatalogue, InvitedEvent};
use crate::domain::{EventId, EventView, GuestId, ResolvedGuest};

/// How events with registration closed are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClosedEventPolicy {
    /// Listed separately without a register action.
    #[default]
    ReadOnly,
    /// Left out of the listing entirely.
    Omit,
}

/// Raised for an unrecognised closed-event policy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown closed event policy `{0}` (expected `read_only` or `omit`)")]
pub struct ClosedEventPolicyParseError(pub String);

impl FromStr for ClosedEventPolicy {
    type Err = ClosedEventPolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read_only" | "read-only" => Ok(Self::ReadOnly),
            "omit" => Ok(Self::Omit),
            other => Err(ClosedEventPolicyParseError(other.to_owned())),
        }
    }
}

/// Deduplicated, date-ordered events for one identity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AggregatedEvents {
    /// Events open for registration.
    pub events: Vec<EventView>,
    /// Events with registration closed. Empty under [`ClosedEventPolicy::Omit`].
    pub closed_events: Vec<EventView>,
    /// Contact notice, present when any closed events exist.
    pub help_notice: Option<String>,
    /// Number of guest records whose lookup failed.
    pub failed_guests: usize,
}

impl AggregatedEvents {
    /// Whether any per-guest lookup failed.
    pub fn degraded(&self) -> bool {
        self.failed_guests > 0
    }
}

/// Merge per-guest event batches into one ordered listing.
///
/// Events are deduplicated by id only. The first occurrence is kept unless
/// a later one is already registered. Ordering is by scheduled time with
/// ties in input order.
pub(crate) fn merge_event_batches(
    batches: impl IntoIterator<Item = (GuestId, Vec<InvitedEvent>)>,
) -> Vec<EventView> {
    let mut merged: Vec<EventView> = Vec::new();
    let mut positions: HashMap<EventId, usize> = HashMap::new();

    for (guest_id, entries) in batches {
        for entry in entries {
            let view = EventView::new(entry.event, guest_id, entry.registered);
            match positions.get(&view.id) {
                Some(&index) => {
                    if let Some(kept) = merged.get_mut(index) {
                        if !kept.registered && view.registered {
                            *kept = view;
                        }
                    }
                }
                None => {
                    positions.insert(view.id, merged.len());
                    merged.push(view);
                }
            }
        }
    }

    merged.sort_by_key(|view| view.scheduled_at);
    merged
}

/// Collects the events visible to a set of guest records.
#[derive(Clone)]
pub struct EventAggregator<C: ?Sized> {
    catalogue: Arc<C>,
    closed_events: ClosedEventPolicy,
    help_contact: String,
}

impl<C: ?Sized> EventAggregator<C> {
    /// Create an aggregator over an event catalogue.
    pub fn new(
        catalogue: Arc<C>,
        closed_events: ClosedEventPolicy,
        help_contact: impl Into<String>,
    ) -> Self {
        Self {
            catalogue,
            closed_events,
            help_contact: help_contact.into(),
        }
    }

    fn help_notice(&self) -> String {
        format!(
            "Las inscripciones para algunos eventos están cerradas. \
             Si necesitas ayuda, escríbenos a {}.",
            self.help_contact
        )
    }
}

impl<C> EventAggregator<C>
where
    C: EventCatalogue + ?Sized,
{
    /// List events for every guest record, merged and ordered.
    pub async fn list_events(&self, guests: &[ResolvedGuest]) -> AggregatedEvents {
        let lookups = guests.iter().map(|resolved| async move {
            let guest = &resolved.guest;
            let result = self.catalogue.events_for_guest(guest).await;
            (guest.id, result)
        });

        let mut failed_guests = 0;
        let mut batches = Vec::with_capacity(guests.len());
        for (guest_id, result) in join_all(lookups).await {
            match result {
                Ok(entries) => batches.push((guest_id, entries)),
                Err(error) => {
                    failed_guests += 1;
                    warn!(guest_id = %guest_id, error = %error, "event lookup failed for guest");
                }
            }
        }

        let (events, closed): (Vec<_>, Vec<_>) = merge_event_batches(batches)
            .into_iter()
            .partition(|view| view.register_open);

        let help_notice = (!closed.is_empty()).then(|| self.help_notice());
        let closed_events = match self.closed_events {
            ClosedEventPolicy::ReadOnly => closed,
            ClosedEventPolicy::Omit => Vec::new(),
        };

        AggregatedEvents {
            events,
            closed_events,
            help_notice,
            failed_guests,
        }
    }
}
