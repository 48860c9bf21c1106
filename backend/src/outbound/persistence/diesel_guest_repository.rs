//! PostgreSQL-backed `GuestRepository`.
//!
//! Guests are always read joined to their invitation list (for the event
//! group) and left-joined to their sponsoring executive.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{GuestRepository, GuestRepositoryError};
use crate::domain::{EmailAddress, EventGroupId, Guest, GuestId, NewGuest};

use super::error_mapping::basic_diesel_error_mapper;
use super::models::{ExecutiveRow, GuestRow, NewGuestRow, RowConversionError};
use super::pool::DbPool;
use super::schema::{executive, guest, invitation_list};

basic_diesel_error_mapper!(GuestRepositoryError);

fn map_conversion_error(error: RowConversionError) -> GuestRepositoryError {
    GuestRepositoryError::query(error.to_string())
}

type GuestJoinRow = (GuestRow, i64, Option<ExecutiveRow>);

/// Diesel implementation of [`GuestRepository`].
#[derive(Clone)]
pub struct DieselGuestRepository {
    pool: DbPool,
}

impl DieselGuestRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GuestRepository for DieselGuestRepository {
    async fn find_by_email(
        &self,
        email: &EmailAddress,
        event_group_id: Option<EventGroupId>,
    ) -> Result<Vec<Guest>, GuestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = guest::table
            .inner_join(invitation_list::table)
            .left_join(executive::table)
            .filter(guest::email.eq(email.as_str()))
            .select((
                GuestRow::as_select(),
                invitation_list::event_group_id,
                Option::<ExecutiveRow>::as_select(),
            ))
            .order(guest::id.asc())
            .into_boxed();
        if let Some(group) = event_group_id {
            query = query.filter(invitation_list::event_group_id.eq(group.get()));
        }

        let rows: Vec<GuestJoinRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|(row, group, executive)| row.into_guest(group, executive))
            .collect::<Result<_, _>>()
            .map_err(map_conversion_error)
    }

    async fn find_by_id(&self, guest_id: GuestId) -> Result<Option<Guest>, GuestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<GuestJoinRow> = guest::table
            .inner_join(invitation_list::table)
            .left_join(executive::table)
            .filter(guest::id.eq(guest_id.get()))
            .select((
                GuestRow::as_select(),
                invitation_list::event_group_id,
                Option::<ExecutiveRow>::as_select(),
            ))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|(row, group, executive)| row.into_guest(group, executive))
            .transpose()
            .map_err(map_conversion_error)
    }

    async fn insert(&self, new_guest: &NewGuest) -> Result<Guest, GuestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: GuestRow = diesel::insert_into(guest::table)
            .values(NewGuestRow::from(new_guest))
            .returning(GuestRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let group: i64 = invitation_list::table
            .find(row.list_id)
            .select(invitation_list::event_group_id)
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row.into_guest(group, None).map_err(map_conversion_error)
    }

    async fn update_webinar_email(
        &self,
        guest_id: GuestId,
        email: &EmailAddress,
    ) -> Result<(), GuestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(guest::table.find(guest_id.get()))
            .set(guest::zoom_email.eq(Some(email.as_str())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(GuestRepositoryError::query(format!(
                "guest {guest_id} not found"
            )));
        }
        Ok(())
    }
}
