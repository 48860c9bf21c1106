//! PostgreSQL-backed `RegistrationRepository` over `event_guest`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RegistrationRepository, RegistrationRepositoryError};
use crate::domain::{EmailAddress, EventId, GuestId, Registration};

use super::error_mapping::basic_diesel_error_mapper;
use super::models::{EventGuestRow, EventGuestUpdate, NewEventGuestRow};
use super::pool::DbPool;
use super::schema::event_guest;

basic_diesel_error_mapper!(RegistrationRepositoryError);

/// Diesel implementation of [`RegistrationRepository`].
#[derive(Clone)]
pub struct DieselRegistrationRepository {
    pool: DbPool,
}

impl DieselRegistrationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegistrationRepository for DieselRegistrationRepository {
    async fn find(
        &self,
        guest_id: GuestId,
        event_id: EventId,
    ) -> Result<Option<Registration>, RegistrationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<EventGuestRow> = event_guest::table
            .find((guest_id.get(), event_id.get()))
            .select(EventGuestRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(|row| Registration {
            guest_id: GuestId::new(row.guest_id),
            event_id: EventId::new(row.event_id),
            registered: row.registered,
            webinar_email: row.zoom_email.and_then(|raw| EmailAddress::parse(raw).ok()),
        }))
    }

    async fn upsert(&self, registration: &Registration) -> Result<(), RegistrationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let zoom_email = registration.webinar_email.as_ref().map(EmailAddress::as_str);

        diesel::insert_into(event_guest::table)
            .values(NewEventGuestRow {
                guest_id: registration.guest_id.get(),
                event_id: registration.event_id.get(),
                registered: registration.registered,
                zoom_email,
            })
            .on_conflict((event_guest::guest_id, event_guest::event_id))
            .do_update()
            .set(EventGuestUpdate {
                registered: registration.registered,
                zoom_email,
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}
