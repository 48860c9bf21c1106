//! Driving port for registering a replacement guest.

use async_trait::async_trait;

use crate::domain::{Error, SubstitutionOutcome, SubstitutionRequest};

/// Driving port for the substitution action.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubstitutionCommand: Send + Sync {
    /// Replace the original guest with a new one in an event group.
    async fn substitute(&self, request: SubstitutionRequest)
    -> Result<SubstitutionOutcome, Error>;
}

/// Fixture command that knows no guests.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSubstitutionCommand;

#[async_trait]
impl SubstitutionCommand for FixtureSubstitutionCommand {
    async fn substitute(
        &self,
        request: SubstitutionRequest,
    ) -> Result<SubstitutionOutcome, Error> {
        Err(Error::not_found(format!(
            "no guest found for {}",
            request.original_email
        )))
    }
}
