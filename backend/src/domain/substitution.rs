//! Substitutions redirect an invited guest's attendance to a replacement.

use serde::Serialize;
use utoipa::ToSchema;

use super::{EmailAddress, EventGroupId, GuestId};

/// Stored mapping from an original email to its replacement in one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Substitution {
    pub event_group_id: EventGroupId,
    pub original_email: EmailAddress,
    pub new_email: EmailAddress,
    pub new_name: String,
}

/// Substitution row to record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubstitution {
    pub event_group_id: EventGroupId,
    pub original_email: EmailAddress,
    pub new_email: EmailAddress,
    pub new_name: String,
}

impl From<NewSubstitution> for Substitution {
    fn from(value: NewSubstitution) -> Self {
        Self {
            event_group_id: value.event_group_id,
            original_email: value.original_email,
            new_email: value.new_email,
            new_name: value.new_name,
        }
    }
}

/// Command accepted by the substitution use case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionRequest {
    /// Defaults to the configured current event group.
    pub event_group_id: Option<EventGroupId>,
    pub original_email: EmailAddress,
    pub new_email: EmailAddress,
    pub new_name: String,
}

/// Identity that downstream reads should use for an email.
///
/// # Examples
/// ```
/// use registration_backend::domain::{ActiveIdentity, EmailAddress};
///
/// let email = EmailAddress::parse("a@x.com").expect("email");
/// let identity = ActiveIdentity::original(email.clone());
/// assert!(!identity.replaced);
/// assert_eq!(identity.effective_email, email);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveIdentity {
    pub replaced: bool,
    pub effective_email: EmailAddress,
    pub replacement_name: Option<String>,
}

impl ActiveIdentity {
    /// No substitution applies.
    pub fn original(email: EmailAddress) -> Self {
        Self {
            replaced: false,
            effective_email: email,
            replacement_name: None,
        }
    }

    /// Redirect to the replacement named by `substitution`.
    pub fn replaced_by(substitution: &Substitution) -> Self {
        let name = substitution.new_name.trim();
        Self {
            replaced: true,
            effective_email: substitution.new_email.clone(),
            replacement_name: (!name.is_empty()).then(|| name.to_owned()),
        }
    }
}

/// Result of a substitution request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubstitutionOutcome {
    /// `false` when an existing mapping was returned unchanged.
    pub created: bool,
    pub substitution: Substitution,
    pub replacement_guest_ids: Vec<GuestId>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn substitution(new_name: &str) -> Substitution {
        Substitution {
            event_group_id: EventGroupId::new(4),
            original_email: EmailAddress::parse("a@x.com").expect("email"),
            new_email: EmailAddress::parse("b@x.com").expect("email"),
            new_name: new_name.to_owned(),
        }
    }

    #[rstest]
    fn replaced_identity_uses_new_email_and_name() {
        let identity = ActiveIdentity::replaced_by(&substitution(" Beto Ruiz "));
        assert!(identity.replaced);
        assert_eq!(identity.effective_email.as_str(), "b@x.com");
        assert_eq!(identity.replacement_name.as_deref(), Some("Beto Ruiz"));
    }

    #[rstest]
    fn blank_replacement_name_is_dropped() {
        let identity = ActiveIdentity::replaced_by(&substitution("  "));
        assert_eq!(identity.replacement_name, None);
    }
}
