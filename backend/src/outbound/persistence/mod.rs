//! PostgreSQL persistence adapters.
//!
//! Repositories translate between Diesel rows (`models`, `schema`) and
//! domain values; neither module is visible outside this one. Connections
//! come from a `bb8` pool driven by `diesel-async`.
//!
//! ```ignore
//! use registration_backend::outbound::persistence::{DbPool, DieselGuestRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/eventos")).await?;
//! let guests = DieselGuestRepository::new(pool);
//! ```

mod diesel_event_catalogue;
mod diesel_guest_repository;
mod diesel_registration_repository;
mod diesel_substitution_repository;
mod error_mapping;
mod models;
mod pool;
mod schema;

pub use diesel_event_catalogue::{DieselEventCatalogue, EventSource, EventSourceParseError};
pub use diesel_guest_repository::DieselGuestRepository;
pub use diesel_registration_repository::DieselRegistrationRepository;
pub use diesel_substitution_repository::DieselSubstitutionRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
