//! Outbound adapters implementing the driven ports.
//!
//! - **persistence**: PostgreSQL repositories on Diesel
//! - **webinar**: webinar provider client (Zoom API)
//! - **mail**: transactional mail client (SendGrid API)
//!
//! Adapters translate between wire or row shapes and domain values. They
//! hold no business rules.

pub mod mail;
pub mod persistence;
pub mod webinar;
