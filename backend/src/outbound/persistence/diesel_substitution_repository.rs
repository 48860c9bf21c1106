//! PostgreSQL-backed `SubstitutionRepository`.
//!
//! The `(event_group_id, original_email)` unique constraint is the only
//! guard against racing submissions; a violation surfaces as
//! [`SubstitutionRepositoryError::Duplicate`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{SubstitutionRepository, SubstitutionRepositoryError};
use crate::domain::{EmailAddress, EventGroupId, NewSubstitution, Substitution};

use super::error_mapping::{DieselFailure, classify_diesel_error};
use super::models::{NewSubstitutionRow, SubstitutionRow};
use super::pool::{DbPool, PoolError};
use super::schema::substitution;

fn map_pool_error(error: PoolError) -> SubstitutionRepositoryError {
    SubstitutionRepositoryError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> SubstitutionRepositoryError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => SubstitutionRepositoryError::connection(message),
        DieselFailure::Query(message) => SubstitutionRepositoryError::query(message),
        DieselFailure::UniqueViolation => SubstitutionRepositoryError::duplicate(),
    }
}

fn into_domain(row: Option<SubstitutionRow>) -> Result<Option<Substitution>, SubstitutionRepositoryError> {
    row.map(Substitution::try_from)
        .transpose()
        .map_err(|error| SubstitutionRepositoryError::query(error.to_string()))
}

/// Diesel implementation of [`SubstitutionRepository`].
#[derive(Clone)]
pub struct DieselSubstitutionRepository {
    pool: DbPool,
}

impl DieselSubstitutionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubstitutionRepository for DieselSubstitutionRepository {
    async fn find_by_original(
        &self,
        event_group_id: EventGroupId,
        original_email: &EmailAddress,
    ) -> Result<Option<Substitution>, SubstitutionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = substitution::table
            .filter(substitution::event_group_id.eq(event_group_id.get()))
            .filter(substitution::original_email.eq(original_email.as_str()))
            .select(SubstitutionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        into_domain(row)
    }

    async fn find_by_replacement(
        &self,
        event_group_id: EventGroupId,
        new_email: &EmailAddress,
    ) -> Result<Option<Substitution>, SubstitutionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = substitution::table
            .filter(substitution::event_group_id.eq(event_group_id.get()))
            .filter(substitution::new_email.eq(new_email.as_str()))
            .order(substitution::created_at.asc())
            .select(SubstitutionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        into_domain(row)
    }

    async fn record(
        &self,
        new_substitution: &NewSubstitution,
    ) -> Result<Substitution, SubstitutionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: SubstitutionRow = diesel::insert_into(substitution::table)
            .values(NewSubstitutionRow {
                event_group_id: new_substitution.event_group_id.get(),
                original_email: new_substitution.original_email.as_str(),
                new_email: new_substitution.new_email.as_str(),
                new_name: &new_substitution.new_name,
            })
            .returning(SubstitutionRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Substitution::try_from(row)
            .map_err(|error| SubstitutionRepositoryError::query(error.to_string()))
    }
}
