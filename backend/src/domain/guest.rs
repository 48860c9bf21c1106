//! Guest identity records and their sponsors.
//!
//! A guest row belongs to exactly one invitation list; the same email may
//! appear on several lists, producing several independent guest records.

use super::EmailAddress;

/// Declares a store-assigned numeric identifier newtype.
macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize,
            ::utoipa::ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw identifier.
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Raw identifier value.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

pub(crate) use numeric_id;

numeric_id!(
    /// Guest record identifier.
    GuestId
);
numeric_id!(
    /// Invitation list identifier.
    ListId
);
numeric_id!(
    /// Event group (distribution) identifier shared by related lists.
    EventGroupId
);
numeric_id!(
    /// Sponsoring executive identifier.
    ExecutiveId
);

/// `guest_type` tag stored on guests created by a substitution.
pub const REPLACEMENT_GUEST_TYPE: &str = "Reemplazo";

/// Generic salutation used when no sponsor supplies one.
pub const GENERIC_SALUTATION: &str = "Estimado(a)";

/// Sponsor whose name and salutation override a guest's own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Executive {
    pub id: ExecutiveId,
    pub name: String,
    pub last_name: String,
    pub nickname: Option<String>,
    pub salutation: Option<String>,
}

impl Executive {
    /// `"{name} {last_name}"`, trimmed when either part is blank.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name.trim(), self.last_name.trim())
            .trim()
            .to_owned()
    }
}

/// Which of the three guest-record shapes a row has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuestKind {
    /// The invitee registers for themself.
    Direct,
    /// An attendee whose identity is delegated to a sponsoring executive.
    Sponsored,
    /// A replacement created by a substitution.
    Replacement,
}

/// Guest identity record scoped to one invitation list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guest {
    pub id: GuestId,
    pub email: EmailAddress,
    pub name: String,
    /// Whether the display identity is delegated to [`Guest::executive`].
    pub sponsored: bool,
    pub executive: Option<Executive>,
    pub list_id: ListId,
    pub event_group_id: EventGroupId,
    pub company: Option<String>,
    pub guest_type: Option<String>,
    /// Alternate address used to join webinars.
    pub webinar_email: Option<EmailAddress>,
}

impl Guest {
    /// Classify the record.
    ///
    /// A sponsored flag without a loaded executive degrades to
    /// [`GuestKind::Direct`] so the guest's own name is still shown.
    pub fn kind(&self) -> GuestKind {
        if self.guest_type.as_deref() == Some(REPLACEMENT_GUEST_TYPE) {
            GuestKind::Replacement
        } else if self.sponsored && self.executive.is_some() {
            GuestKind::Sponsored
        } else {
            GuestKind::Direct
        }
    }

    /// Name shown to the guest and sent to the webinar provider.
    ///
    /// # Examples
    /// ```
    /// use registration_backend::domain::{
    ///     EmailAddress, EventGroupId, Executive, ExecutiveId, Guest, GuestId, ListId,
    /// };
    ///
    /// let guest = Guest {
    ///     id: GuestId::new(1),
    ///     email: EmailAddress::parse("asistente@x.com").expect("email"),
    ///     name: "Asistente".to_owned(),
    ///     sponsored: true,
    ///     executive: Some(Executive {
    ///         id: ExecutiveId::new(9),
    ///         name: "Rosa".to_owned(),
    ///         last_name: "Quispe".to_owned(),
    ///         nickname: None,
    ///         salutation: None,
    ///     }),
    ///     list_id: ListId::new(3),
    ///     event_group_id: EventGroupId::new(7),
    ///     company: None,
    ///     guest_type: None,
    ///     webinar_email: None,
    /// };
    /// assert_eq!(guest.display_name(), "Rosa Quispe");
    /// ```
    pub fn display_name(&self) -> String {
        match (self.kind(), self.executive.as_ref()) {
            (GuestKind::Sponsored, Some(executive)) => executive.full_name(),
            _ => self.name.trim().to_owned(),
        }
    }

    /// Salutation and nickname used in confirmation emails.
    pub fn salutation(&self) -> (String, String) {
        match (self.kind(), self.executive.as_ref()) {
            (GuestKind::Sponsored, Some(executive)) => (
                executive
                    .salutation
                    .clone()
                    .unwrap_or_else(|| GENERIC_SALUTATION.to_owned()),
                executive
                    .nickname
                    .clone()
                    .unwrap_or_else(|| executive.name.clone()),
            ),
            _ => (GENERIC_SALUTATION.to_owned(), self.display_name()),
        }
    }
}

/// Guest record paired with its resolved display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGuest {
    pub guest: Guest,
    pub display_name: String,
}

impl From<Guest> for ResolvedGuest {
    fn from(guest: Guest) -> Self {
        let display_name = guest.display_name();
        Self {
            guest,
            display_name,
        }
    }
}

/// Guest row to insert when registering a replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGuest {
    pub email: EmailAddress,
    pub name: String,
    pub list_id: ListId,
    pub company: Option<String>,
    pub guest_type: String,
}

impl NewGuest {
    /// Replacement record mirroring one membership of the original guest.
    pub fn replacement_for(original: &Guest, email: EmailAddress, name: impl Into<String>) -> Self {
        Self {
            email,
            name: name.into(),
            list_id: original.list_id,
            company: original.company.clone(),
            guest_type: REPLACEMENT_GUEST_TYPE.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn guest() -> Guest {
        Guest {
            id: GuestId::new(1),
            email: EmailAddress::parse("a@x.com").expect("email"),
            name: " Ana Torres ".to_owned(),
            sponsored: false,
            executive: None,
            list_id: ListId::new(10),
            event_group_id: EventGroupId::new(100),
            company: Some("Apoyo".to_owned()),
            guest_type: None,
            webinar_email: None,
        }
    }

    fn executive() -> Executive {
        Executive {
            id: ExecutiveId::new(5),
            name: "Luis".to_owned(),
            last_name: "Paredes".to_owned(),
            nickname: Some("Lucho".to_owned()),
            salutation: Some("Estimado".to_owned()),
        }
    }

    #[rstest]
    fn direct_guest_uses_own_name(guest: Guest) {
        assert_eq!(guest.kind(), GuestKind::Direct);
        assert_eq!(guest.display_name(), "Ana Torres");
        assert_eq!(
            guest.salutation(),
            (GENERIC_SALUTATION.to_owned(), "Ana Torres".to_owned())
        );
    }

    #[rstest]
    fn sponsored_guest_uses_executive_identity(mut guest: Guest) {
        guest.sponsored = true;
        guest.executive = Some(executive());

        assert_eq!(guest.kind(), GuestKind::Sponsored);
        assert_eq!(guest.display_name(), "Luis Paredes");
        assert_eq!(
            guest.salutation(),
            ("Estimado".to_owned(), "Lucho".to_owned())
        );
    }

    #[rstest]
    fn sponsored_flag_without_executive_falls_back(mut guest: Guest) {
        guest.sponsored = true;
        assert_eq!(guest.kind(), GuestKind::Direct);
        assert_eq!(guest.display_name(), "Ana Torres");
    }

    #[rstest]
    fn replacement_copies_membership(guest: Guest) {
        let email = EmailAddress::parse("b@x.com").expect("email");
        let replacement = NewGuest::replacement_for(&guest, email.clone(), "Beto");

        assert_eq!(replacement.list_id, guest.list_id);
        assert_eq!(replacement.company, guest.company);
        assert_eq!(replacement.guest_type, REPLACEMENT_GUEST_TYPE);
        assert_eq!(replacement.email, email);
    }

    #[rstest]
    fn replacement_kind_wins_over_sponsorship(mut guest: Guest) {
        guest.sponsored = true;
        guest.executive = Some(executive());
        guest.guest_type = Some(REPLACEMENT_GUEST_TYPE.to_owned());
        assert_eq!(guest.kind(), GuestKind::Replacement);
        assert_eq!(guest.display_name(), "Ana Torres");
    }
}
