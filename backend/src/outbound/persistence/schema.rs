//! Diesel table definitions.
//!
//! Must match `backend/migrations`. Regenerate with `diesel print-schema`
//! after changing a migration, then restore the hand-written view below.

diesel::table! {
    /// Sponsoring executives referenced by sponsored guests.
    executive (id) {
        id -> Int8,
        name -> Varchar,
        last_name -> Varchar,
        nickname -> Nullable<Varchar>,
        /// Salutation used in confirmation emails ("Estimado", "Estimada").
        salutation -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Invitation lists; every list belongs to one event group.
    invitation_list (id) {
        id -> Int8,
        event_group_id -> Int8,
        name -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// One row per (email, invitation list) membership.
    guest (id) {
        id -> Int8,
        email -> Varchar,
        name -> Varchar,
        /// Set when the guest was invited on behalf of an executive.
        is_user -> Bool,
        executive_id -> Nullable<Int8>,
        list_id -> Int8,
        company -> Nullable<Varchar>,
        guest_type -> Nullable<Varchar>,
        zoom_email -> Nullable<Varchar>,
    }
}

diesel::table! {
    event (id) {
        id -> Int8,
        name -> Varchar,
        /// `Presencial` or `Virtual`.
        event_type -> Varchar,
        date_hour -> Timestamptz,
        place -> Varchar,
        register_open -> Bool,
        /// Backslash-escaped, unsanitised HTML.
        html_description -> Nullable<Text>,
        zoom_webinar -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Events visible to the members of an invitation list.
    event_list (list_id, event_id) {
        list_id -> Int8,
        event_id -> Int8,
    }
}

diesel::table! {
    /// Registration state per guest and event.
    event_guest (guest_id, event_id) {
        guest_id -> Int8,
        event_id -> Int8,
        registered -> Bool,
        zoom_email -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Attendance delegations, unique per (event_group_id, original_email).
    substitution (id) {
        id -> Int8,
        event_group_id -> Int8,
        original_email -> Varchar,
        new_email -> Varchar,
        new_name -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Consolidated read view joining list membership, events and
    /// registration state. `diesel print-schema` does not emit views.
    guest_event_view (guest_id, event_id) {
        guest_id -> Int8,
        event_id -> Int8,
        list_id -> Int8,
        event_group_id -> Int8,
        name -> Varchar,
        event_type -> Varchar,
        date_hour -> Timestamptz,
        place -> Varchar,
        register_open -> Bool,
        html_description -> Nullable<Text>,
        zoom_webinar -> Nullable<Varchar>,
        registered -> Bool,
    }
}

diesel::joinable!(guest -> executive (executive_id));
diesel::joinable!(guest -> invitation_list (list_id));
diesel::joinable!(event_list -> event (event_id));
diesel::joinable!(event_list -> invitation_list (list_id));
diesel::joinable!(event_guest -> event (event_id));
diesel::joinable!(event_guest -> guest (guest_id));

diesel::allow_tables_to_appear_in_same_query!(
    executive,
    invitation_list,
    guest,
    event,
    event_list,
    event_guest,
    substitution,
    guest_event_view,
);
