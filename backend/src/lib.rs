//! Event registration backend.
//!
//! Guests identified by email look up the events they are invited to,
//! register (optionally through a webinar provider), delegate attendance to
//! a replacement, and receive confirmation emails.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
