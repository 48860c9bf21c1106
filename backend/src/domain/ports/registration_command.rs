//! Driving port for registering a guest for an event.

use async_trait::async_trait;

use crate::domain::{Error, RegistrationOutcome, RegistrationRequest};

/// Driving port for the register action.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationCommand: Send + Sync {
    /// Register one `(guest, event)` pair.
    async fn register(&self, request: RegistrationRequest) -> Result<RegistrationOutcome, Error>;
}

/// Fixture command that knows no guests.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRegistrationCommand;

#[async_trait]
impl RegistrationCommand for FixtureRegistrationCommand {
    async fn register(&self, request: RegistrationRequest) -> Result<RegistrationOutcome, Error> {
        Err(Error::not_found(format!(
            "guest {} not found",
            request.guest_id
        )))
    }
}
